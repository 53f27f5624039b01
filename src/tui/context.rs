//! State shared by every view
//!
//! Built once at startup and handed to views by reference. Only the
//! controller's update step holds it mutably.

use std::path::PathBuf;
use std::sync::Arc;

use crate::catalog::{Catalog, InstallMark};
use crate::config::AppConfig;
use crate::exec::{ExecutionQueue, ExecutionResult};
use crate::logstore::LogStore;
use crate::probe::InstalledFlags;

pub struct SharedContext {
    pub catalog: Arc<Catalog>,
    pub config: AppConfig,
    /// Where the settings screen saves
    pub config_path: PathBuf,
    pub log: Arc<dyn LogStore>,

    /// Service id → installed
    pub installed: InstalledFlags,
    /// A probe is in flight
    pub probing: bool,

    /// The one queue; a new plan resets it
    pub queue: ExecutionQueue,
    /// Transient headline for the processing screen
    pub processing_message: String,
    /// Failed command of the last run, for its output
    pub last_failure: Option<ExecutionResult>,
    /// Applied once the running plan succeeds
    pub pending_install: Option<InstallMark>,
    /// Masked in logs and on screen while the plan is current
    pub secrets: Vec<String>,

    pub width: u16,
    pub height: u16,
    /// Spinner frame, bumped on every tick
    pub frame: u8,
    pub clear_requested: bool,
}

impl SharedContext {
    pub fn new(catalog: Arc<Catalog>, config: AppConfig, log: Arc<dyn LogStore>) -> Self {
        Self {
            catalog,
            config,
            config_path: AppConfig::config_path(),
            log,
            installed: InstalledFlags::new(),
            probing: false,
            queue: ExecutionQueue::new(),
            processing_message: String::new(),
            last_failure: None,
            pending_install: None,
            secrets: Vec::new(),
            width: 0,
            height: 0,
            frame: 0,
            clear_requested: false,
        }
    }

    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = path.into();
        self
    }

    /// `None` until a probe or a completed plan has said otherwise
    pub fn is_installed(&self, service: &str) -> Option<bool> {
        self.installed.get(service).copied()
    }

    /// Mask the current plan's secrets
    pub fn redact(&self, text: &str) -> String {
        crate::catalog::redact(text, &self.secrets)
    }

    /// Take and clear a pending screen-clear request
    pub fn take_clear_request(&mut self) -> bool {
        std::mem::take(&mut self.clear_requested)
    }
}
