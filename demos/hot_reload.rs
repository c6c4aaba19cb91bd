// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hot reload example.
//!
//! This example demonstrates:
//! - Declaring typed entries and listening for changes
//! - Loading a YAML file into the registry
//! - Watching the file and reapplying it when it changes
//! - Reconfiguring loggers from the `logs` entry
//!
//! To run this example:
//! ```bash
//! cargo run --example hot_reload --features yaml,reload
//! ```

use cfgvar::logging::LoggerManager;
use cfgvar::prelude::*;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const INITIAL: &str = r#"
server:
  port: 8080
  hosts: [alpha, beta]
logs:
  - name: root
    level: info
    appenders:
      - type: StdoutAppender
"#;

const UPDATED: &str = r#"
server:
  port: 9000
  hosts: [alpha, beta, gamma]
logs:
  - name: root
    level: warn
    appenders:
      - type: StdoutAppender
  - name: http
    level: debug
    appenders:
      - type: FileLogAppender
        file: /tmp/http.log
"#;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    println!("=== cfgvar: Hot Reload Example ===\n");

    let dir = tempfile::TempDir::new()?;
    let path = dir.path().join("app.yaml");
    std::fs::write(&path, INITIAL)?;
    println!("Created config file at: {}", path.display());

    let registry = Arc::new(ConfigRegistry::new());
    let port = registry
        .lookup_or_create("server.port", 80u16, "listen port")?
        .ok_or("server.port declared with another type")?;
    let hosts = registry
        .lookup_or_create("server.hosts", Vec::<String>::new(), "upstream hosts")?
        .ok_or("server.hosts declared with another type")?;

    port.add_listener(listener_key("demo.port"), |old, new| {
        println!("server.port: {} -> {}", old, new);
    });
    hosts.add_listener(listener_key("demo.hosts"), |old, new| {
        println!("server.hosts: {:?} -> {:?}", old, new);
    });

    let loggers = Arc::new(LoggerManager::new());
    loggers.install(&registry)?;

    let mut loader = ConfigLoader::builder()
        .with_registry(Arc::clone(&registry))
        .with_yaml_file(&path)?
        .build()?;
    loader.reload();
    loader.watch_file(&path, Some(Duration::from_millis(200)))?;

    println!("\n=== Current configuration ===\n{}", registry.to_document().render());

    println!("Rewriting the config file...");
    std::fs::write(&path, UPDATED)?;
    thread::sleep(Duration::from_secs(2));

    println!("\n=== Configuration after reload ===\n{}", registry.to_document().render());
    println!("=== Loggers ===\n{}", loggers.to_document().render());

    loader.stop_watchers()?;
    Ok(())
}
