// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed entries example.
//!
//! This example demonstrates:
//! - Writing a codec for a user record type
//! - Containers of records decoded from a document
//! - Type mismatches and malformed values being reported, not fatal
//!
//! To run this example:
//! ```bash
//! cargo run --example typed_entries
//! ```

use cfgvar::domain::codec::{optional_field, required_field};
use cfgvar::prelude::*;
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, PartialEq)]
struct Upstream {
    host: String,
    port: u16,
    weight: Option<u32>,
}

impl Codec for Upstream {
    fn decode_node(node: &DocumentNode) -> Result<Self> {
        Ok(Upstream {
            host: required_field(node, "host")?,
            port: required_field(node, "port")?,
            weight: optional_field(node, "weight")?,
        })
    }

    fn encode_node(&self) -> DocumentNode {
        let mut fields = vec![
            ("host", self.host.encode_node()),
            ("port", self.port.encode_node()),
        ];
        if let Some(weight) = self.weight {
            fields.push(("weight", weight.encode_node()));
        }
        DocumentNode::mapping(fields)
    }
}

const DOCUMENT: &str = r#"
proxy:
  timeout_ms: fast
  upstreams:
    api:
      - host: 10.0.0.1
        port: 8080
        weight: 3
      - host: 10.0.0.2
        port: 8080
    static:
      - host: cdn.local
        port: 80
"#;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let registry = ConfigRegistry::global();
    let timeout = registry
        .lookup_or_create("proxy.timeout_ms", 500u64, "request timeout")?
        .expect("first declaration");
    let upstreams = registry
        .lookup_or_create(
            "proxy.upstreams",
            BTreeMap::<String, Vec<Upstream>>::new(),
            "upstream pools",
        )?
        .expect("first declaration");

    // Same name, different type: reported and refused.
    assert!(registry.lookup_or_create("proxy.timeout_ms", 0.5f64, "")?.is_none());

    let report = registry.apply_yaml(DOCUMENT)?;
    println!("applied: {:?}", report.applied);
    println!("failed:  {:?}", report.failed);

    println!("proxy.timeout_ms = {}", timeout.value());
    for (pool, members) in upstreams.value() {
        for member in members {
            println!("{}: {}:{} (weight {:?})", pool, member.host, member.port, member.weight);
        }
    }

    println!("\n{}", registry.to_document().render());
    Ok(())
}
