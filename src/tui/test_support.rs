//! Fixtures for view unit tests

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::catalog::Catalog;
use crate::config::AppConfig;
use crate::logstore::MemoryLogStore;

use super::context::SharedContext;

pub const CATALOG: &str = r#"
schema: hostpilot/catalog@1
services:
  - id: web
    name: Web
    category: webserver
    detect: "true"
    actions:
      - id: install
        name: Install
        marks_installed: true
        fields:
          - name: port
            label: Port
            required: true
            default: "80"
            pattern: "^[0-9]+$"
        steps:
          - run: echo listen {{port}}
            description: Configure
          - run: "true"
            description: Reload
  - id: tidy
    name: Tidy
    category: maintenance
    actions:
      - id: clean
        name: Clean
        mode: batch
        steps:
          - run: echo a
          - run: echo b
"#;

static NEXT_DIR: AtomicUsize = AtomicUsize::new(0);

fn scratch_dir() -> PathBuf {
    std::env::temp_dir().join(format!(
        "hostpilot-test-{}-{}",
        std::process::id(),
        NEXT_DIR.fetch_add(1, Ordering::Relaxed)
    ))
}

/// Context over the fixture catalog, an in-memory log and a scratch config path
pub fn context() -> SharedContext {
    let catalog = Catalog::from_yaml(CATALOG).unwrap();
    SharedContext::new(
        Arc::new(catalog),
        AppConfig::default(),
        Arc::new(MemoryLogStore::new()),
    )
    .with_config_path(scratch_dir().join("config.toml"))
}
