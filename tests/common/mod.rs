// SPDX-License-Identifier: MIT OR Apache-2.0

//! Helpers shared by the integration tests.

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// A YAML file in its own temporary directory; both are removed on drop.
#[allow(dead_code)]
pub struct TempYaml {
    pub dir: TempDir,
    pub path: PathBuf,
}

#[allow(dead_code)]
impl TempYaml {
    pub fn new(content: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, content).unwrap();
        Self { dir, path }
    }

    pub fn write(&self, content: &str) {
        fs::write(&self.path, content).unwrap();
    }
}

/// The document used across the registry tests.
#[allow(dead_code)]
pub const SYSTEM_DOCUMENT: &str = r#"
system:
  port: 9900
  value: 15
  int_vec:
    - 10
    - 30
  int_list: [20, 40, 50]
  int_set: [30, 20, 60, 20]
  int_uset: [30, 20, 60, 20]
  str_int_map:
    k: 30
    k2: 20
    k3: 10
  str_int_umap:
    k: 130
    k2: 120
    k3: 110
class:
  person:
    name: sylar
    age: 31
    sex: true
  map:
    sylar01:
      name: sylar01
      age: 18
      sex: false
    sylar02:
      name: sylar02
      age: 40
      sex: true
  vec_map:
    k1:
      - name: m1
        age: 33
        sex: true
      - name: m2
        age: 44
        sex: false
"#;
