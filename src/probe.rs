//! Installed-service detection
//!
//! Each service with a `detect` command is checked through the same
//! [`CommandRunner`] the queue uses; exit 0 means installed. Probes run
//! concurrently and the flags come back as one report.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use tracing::debug;

use crate::catalog::Catalog;
use crate::exec::{Command, CommandRunner};

/// Service id → installed
pub type InstalledFlags = BTreeMap<String, bool>;

#[derive(Debug, Clone, Default)]
pub struct ProbeReport {
    pub installed: InstalledFlags,
}

/// `(service id, detect command)` pairs from a catalog
pub fn targets(catalog: &Catalog) -> Vec<(String, String)> {
    catalog
        .detectable()
        .map(|(id, detect)| (id.to_string(), detect.to_string()))
        .collect()
}

pub async fn probe(runner: Arc<dyn CommandRunner>, targets: Vec<(String, String)>) -> ProbeReport {
    let checks = targets.into_iter().map(|(id, detect)| {
        let runner = Arc::clone(&runner);
        async move {
            let result = runner
                .run(&Command::new(detect, format!("detect {}", id)))
                .await;
            debug!(service = %id, code = result.exit_code, "probe");
            (id, result.is_success())
        }
    });

    ProbeReport {
        installed: join_all(checks).await.into_iter().collect(),
    }
}
