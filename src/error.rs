//! Hostpilot Error Types with Error Codes
//!
//! Error code ranges:
//! - HP-001-009: Configuration errors
//! - HP-010-019: Catalog errors
//! - HP-020-029: Validation errors (form fields, templates)
//! - HP-030-039: Execution errors
//! - HP-040-049: Log store errors
//! - HP-050-059: Monitoring errors
//! - HP-060-069: Terminal/TUI errors
//! - HP-090-099: Wrapped IO/YAML/HTTP errors
//!
//! A failing shell command is *not* an error of this type: it is recorded as
//! data in [`crate::exec::ExecutionResult`] and rendered by the console.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, HostpilotError>;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

#[derive(Error, Debug)]
pub enum HostpilotError {
    // ═══════════════════════════════════════════
    // CONFIG ERRORS (001-009)
    // ═══════════════════════════════════════════
    #[error("[HP-001] Configuration error: {reason}")]
    ConfigError { reason: String },

    // ═══════════════════════════════════════════
    // CATALOG ERRORS (010-019)
    // ═══════════════════════════════════════════
    #[error("[HP-010] Catalog file not found: {path}")]
    CatalogNotFound { path: String },

    #[error("[HP-011] Failed to parse catalog: {details}")]
    CatalogParse { details: String },

    #[error("[HP-012] Invalid catalog schema: expected '{expected}', got '{actual}'")]
    CatalogSchema { expected: String, actual: String },

    #[error("[HP-013] Unknown service '{service}'")]
    UnknownService { service: String },

    #[error("[HP-014] Service '{service}' has no action '{action}'")]
    UnknownAction { service: String, action: String },

    #[error("[HP-015] Duplicate id '{id}' in catalog")]
    DuplicateId { id: String },

    // ═══════════════════════════════════════════
    // VALIDATION ERRORS (020-029)
    // ═══════════════════════════════════════════
    #[error("[HP-020] '{field}' is required")]
    MissingField { field: String },

    #[error("[HP-021] '{field}' does not match the expected format ({pattern})")]
    InvalidField { field: String, pattern: String },

    #[error("[HP-022] Template references unknown placeholder '{placeholder}'")]
    UnknownPlaceholder { placeholder: String },

    #[error("[HP-023] Invalid field pattern '{pattern}': {details}")]
    InvalidPattern { pattern: String, details: String },

    #[error("[HP-024] Invalid value '{value}': {reason}")]
    InvalidValue { value: String, reason: String },

    // ═══════════════════════════════════════════
    // EXECUTION ERRORS (030-039)
    // ═══════════════════════════════════════════
    #[error("[HP-030] Command '{command}' failed with exit code {exit_code}")]
    CommandFailed { command: String, exit_code: i32 },

    #[error("[HP-031] Execution worker stopped before reporting: {reason}")]
    WorkerLost { reason: String },

    // ═══════════════════════════════════════════
    // LOG STORE ERRORS (040-049)
    // ═══════════════════════════════════════════
    #[error("[HP-040] Failed to write command log: {reason}")]
    LogWrite { reason: String },

    #[error("[HP-041] Failed to read command log: {reason}")]
    LogRead { reason: String },

    // ═══════════════════════════════════════════
    // MONITORING ERRORS (050-059)
    // ═══════════════════════════════════════════
    #[error("[HP-050] Monitoring API unavailable: {reason}")]
    MonitoringUnavailable { reason: String },

    #[error("[HP-051] Invalid monitoring URL '{url}': {reason}")]
    InvalidMonitoringUrl { url: String, reason: String },

    // ═══════════════════════════════════════════
    // TUI ERRORS (060-069)
    // ═══════════════════════════════════════════
    #[error("[HP-060] TUI error: {reason}")]
    TuiError { reason: String },

    // ═══════════════════════════════════════════
    // WRAPPED ERRORS (090-099)
    // ═══════════════════════════════════════════
    #[error("[HP-090] IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("[HP-092] YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("[HP-093] HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl HostpilotError {
    /// Get the error code (e.g., "HP-001")
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError { .. } => "HP-001",
            Self::CatalogNotFound { .. } => "HP-010",
            Self::CatalogParse { .. } => "HP-011",
            Self::CatalogSchema { .. } => "HP-012",
            Self::UnknownService { .. } => "HP-013",
            Self::UnknownAction { .. } => "HP-014",
            Self::DuplicateId { .. } => "HP-015",
            Self::MissingField { .. } => "HP-020",
            Self::InvalidField { .. } => "HP-021",
            Self::UnknownPlaceholder { .. } => "HP-022",
            Self::InvalidPattern { .. } => "HP-023",
            Self::InvalidValue { .. } => "HP-024",
            Self::CommandFailed { .. } => "HP-030",
            Self::WorkerLost { .. } => "HP-031",
            Self::LogWrite { .. } => "HP-040",
            Self::LogRead { .. } => "HP-041",
            Self::MonitoringUnavailable { .. } => "HP-050",
            Self::InvalidMonitoringUrl { .. } => "HP-051",
            Self::TuiError { .. } => "HP-060",
            Self::IoError(_) => "HP-090",
            Self::YamlError(_) => "HP-092",
            Self::HttpError(_) => "HP-093",
        }
    }

    /// Validation errors are fixed by the operator at the point of entry;
    /// nothing has been queued when one is raised.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::MissingField { .. }
                | Self::InvalidField { .. }
                | Self::InvalidValue { .. }
                | Self::MonitoringUnavailable { .. }
        )
    }
}

impl FixSuggestion for HostpilotError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            HostpilotError::ConfigError { .. } => {
                Some("Check ~/.config/hostpilot/config.toml for TOML syntax errors")
            }
            HostpilotError::CatalogNotFound { .. } => {
                Some("Check the catalog path in config.toml or HOSTPILOT_CATALOG")
            }
            HostpilotError::CatalogParse { .. } => {
                Some("Check catalog YAML syntax: indentation and quoting")
            }
            HostpilotError::CatalogSchema { .. } => {
                Some("Use 'hostpilot/catalog@1' as the catalog schema")
            }
            HostpilotError::UnknownService { .. } => {
                Some("Run 'hostpilot catalog' to list available services")
            }
            HostpilotError::UnknownAction { .. } => {
                Some("Run 'hostpilot catalog' to list the actions of each service")
            }
            HostpilotError::DuplicateId { .. } => Some("Use unique ids for services and actions"),
            HostpilotError::MissingField { .. } => Some("Fill in the field and submit again"),
            HostpilotError::InvalidField { .. } => Some("Correct the value to match the format"),
            HostpilotError::UnknownPlaceholder { .. } => {
                Some("Declare the placeholder as a field of the action")
            }
            HostpilotError::InvalidPattern { .. } => Some("Fix the regex in the catalog field"),
            HostpilotError::InvalidValue { .. } => Some("Use key=value syntax"),
            HostpilotError::CommandFailed { .. } => {
                Some("Inspect the command output in the log viewer")
            }
            HostpilotError::WorkerLost { .. } => None,
            HostpilotError::LogWrite { .. } | HostpilotError::LogRead { .. } => {
                Some("Check the log_file path and its permissions")
            }
            HostpilotError::MonitoringUnavailable { .. } => {
                Some("Start the monitoring agent or fix monitoring.url")
            }
            HostpilotError::InvalidMonitoringUrl { .. } => {
                Some("Use an absolute http:// or https:// URL")
            }
            HostpilotError::TuiError { .. } => Some("Check terminal compatibility and size"),
            HostpilotError::IoError(_) => Some("Check file path and permissions"),
            HostpilotError::YamlError(_) => {
                Some("Check YAML syntax: indentation and quoting")
            }
            HostpilotError::HttpError(_) => Some("Check the endpoint is reachable"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_in_messages() {
        let err = HostpilotError::MissingField {
            field: "port".to_string(),
        };
        assert_eq!(err.code(), "HP-020");
        let msg = err.to_string();
        assert!(msg.contains("[HP-020]"));
        assert!(msg.contains("port"));
    }

    #[test]
    fn test_tui_error() {
        let err = HostpilotError::TuiError {
            reason: "terminal size too small".to_string(),
        };
        assert_eq!(err.code(), "HP-060");
        assert!(err.to_string().contains("[HP-060]"));
    }

    #[test]
    fn test_validation_errors_are_recoverable() {
        assert!(HostpilotError::MissingField {
            field: "x".to_string()
        }
        .is_recoverable());
        assert!(!HostpilotError::CatalogNotFound {
            path: "x".to_string()
        }
        .is_recoverable());
    }

    #[test]
    fn test_io_error_wraps() {
        let err: HostpilotError = std::io::Error::other("boom").into();
        assert_eq!(err.code(), "HP-090");
        assert_eq!(err.fix_suggestion(), Some("Check file path and permissions"));
    }
}
