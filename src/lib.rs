//! Hostpilot - interactive terminal console for server software
//!
//! ## Module Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        DOMAIN MODEL                          │
//! │  catalog/   YAML → services, actions, fields, plans          │
//! └──────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      APPLICATION LAYER                       │
//! │  exec/      ExecutionQueue, Bridge, CommandRunner, batches   │
//! │  tui/       App controller, Navigator, views, widgets        │
//! └──────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    INFRASTRUCTURE LAYER                      │
//! │  logstore   Command history (file or memory)                 │
//! │  monitor    Monitoring API client with synthetic fallback    │
//! │  probe      Installed-flag detection                         │
//! │  config     ~/.config/hostpilot/config.toml + env overrides  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`catalog`] | Service catalog, field validation, placeholder rendering |
//! | [`exec`] | Sequential command execution on background tasks |
//! | [`tui`] | Single-writer console loop and screens |
//! | [`logstore`] | Append-only command log |
//! | [`monitor`] | Metrics, events and entities for the monitoring screen |
//! | [`probe`] | Runs `detect` commands to fill the installed flags |
//! | [`error`] | Error types with fix suggestions |

// ═══════════════════════════════════════════════════════════════
// DOMAIN MODEL
// ═══════════════════════════════════════════════════════════════
pub mod catalog;

// ═══════════════════════════════════════════════════════════════
// APPLICATION LAYER
// ═══════════════════════════════════════════════════════════════
pub mod exec;
pub mod tui;

// ═══════════════════════════════════════════════════════════════
// INFRASTRUCTURE LAYER
// ═══════════════════════════════════════════════════════════════
pub mod config;
pub mod error;
pub mod logstore;
pub mod monitor;
pub mod probe;

pub use catalog::{ActionProvider, Catalog, ExecutionMode, FieldValues, Plan};
pub use config::AppConfig;
pub use error::{FixSuggestion, HostpilotError, Result};
pub use exec::{
    run_batch, Advance, BatchReport, Bridge, Command, CommandRunner, ExecutionQueue,
    ExecutionResult, ShellRunner,
};
pub use logstore::{FileLogStore, LogStore, MemoryLogStore};
pub use monitor::{FallbackMetricsSource, MetricsSource, MonitorSnapshot};
