//! Service catalog - the action/service provider
//!
//! A YAML document lists installable services and the maintenance actions
//! each one offers. Given the operator's field values, an action expands to
//! an ordered list of [`Command`]s. The engine never looks inside them.
//!
//! ```yaml
//! schema: hostpilot/catalog@1
//! services:
//!   - id: nginx
//!     name: Nginx
//!     category: webserver
//!     detect: command -v nginx
//!     actions:
//!       - id: install
//!         name: Install
//!         marks_installed: true
//!         steps:
//!           - run: apt-get install -y nginx
//!             description: Install nginx
//! ```

mod template;

pub use template::{placeholders, redact, render};

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;

use crate::error::{HostpilotError, Result};
use crate::exec::Command;

pub const CATALOG_SCHEMA: &str = "hostpilot/catalog@1";

const BUILTIN_CATALOG: &str = include_str!("../../catalog/default.yaml");

/// Field name → value as entered by the operator
pub type FieldValues = BTreeMap<String, String>;

/// Turns a configured action into commands
pub trait ActionProvider: Send + Sync {
    fn plan(&self, service: &str, action: &str, values: &FieldValues) -> Result<Plan>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Runtime,
    Database,
    Webserver,
    Stack,
    Maintenance,
}

impl Category {
    pub fn all() -> &'static [Category] {
        &[
            Category::Runtime,
            Category::Database,
            Category::Webserver,
            Category::Stack,
            Category::Maintenance,
        ]
    }

    pub fn title(&self) -> &'static str {
        match self {
            Category::Runtime => "Language runtimes",
            Category::Database => "Databases",
            Category::Webserver => "Web servers",
            Category::Stack => "Site stacks",
            Category::Maintenance => "Maintenance",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// How a plan is executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// One command per dispatch, live progress
    #[default]
    Stepped,
    /// Whole list on one background worker, one aggregated report
    Batch,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    pub schema: String,
    #[serde(default)]
    pub services: Vec<Service>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub category: Category,
    #[serde(default)]
    pub description: String,
    /// Exit 0 means installed
    #[serde(default)]
    pub detect: Option<String>,
    #[serde(default)]
    pub actions: Vec<ActionSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActionSpec {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub mode: ExecutionMode,
    /// Installed flag to set once every step succeeded
    #[serde(default)]
    pub marks_installed: Option<bool>,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
    pub steps: Vec<StepSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub secret: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StepSpec {
    pub run: String,
    #[serde(default)]
    pub description: String,
}

/// Installed-flag change applied when a plan completes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallMark {
    pub service: String,
    pub installed: bool,
}

/// A fully expanded action, ready to queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    /// `service/action`, also the queue label
    pub label: String,
    /// Operator-facing title
    pub title: String,
    pub commands: Vec<Command>,
    pub mode: ExecutionMode,
    pub installs: Option<InstallMark>,
    /// Values to mask in previews and logs
    pub secrets: Vec<String>,
}

impl Plan {
    pub fn redacted(&self, text: &str) -> String {
        redact(text, &self.secrets)
    }
}

impl FieldSpec {
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    /// Check one value; an empty optional value always passes
    pub fn validate(&self, value: &str) -> Result<()> {
        if value.trim().is_empty() {
            if self.required {
                return Err(HostpilotError::MissingField {
                    field: self.label().to_string(),
                });
            }
            return Ok(());
        }

        if let Some(pattern) = &self.pattern {
            let re = compile(pattern)?;
            if !re.is_match(value) {
                return Err(HostpilotError::InvalidField {
                    field: self.label().to_string(),
                    pattern: pattern.clone(),
                });
            }
        }

        Ok(())
    }
}

impl Service {
    pub fn action(&self, id: &str) -> Option<&ActionSpec> {
        self.actions.iter().find(|a| a.id == id)
    }
}

impl Catalog {
    /// The catalog compiled into the binary
    pub fn builtin() -> Result<Self> {
        Self::from_yaml(BUILTIN_CATALOG)
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(HostpilotError::CatalogNotFound {
                path: path.display().to_string(),
            });
        }
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Configured catalog, or the built-in one
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Self::builtin(),
        }
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let catalog: Catalog =
            serde_yaml::from_str(content).map_err(|e| HostpilotError::CatalogParse {
                details: match e.location() {
                    Some(loc) => format!("{} (line {})", e, loc.line()),
                    None => e.to_string(),
                },
            })?;
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<()> {
        if self.schema != CATALOG_SCHEMA {
            return Err(HostpilotError::CatalogSchema {
                expected: CATALOG_SCHEMA.to_string(),
                actual: self.schema.clone(),
            });
        }

        let mut service_ids = HashSet::new();
        for service in &self.services {
            if !service_ids.insert(service.id.as_str()) {
                return Err(HostpilotError::DuplicateId {
                    id: service.id.clone(),
                });
            }

            let mut action_ids = HashSet::new();
            for action in &service.actions {
                if !action_ids.insert(action.id.as_str()) {
                    return Err(HostpilotError::DuplicateId {
                        id: format!("{}/{}", service.id, action.id),
                    });
                }

                let declared: HashSet<&str> =
                    action.fields.iter().map(|f| f.name.as_str()).collect();
                for field in &action.fields {
                    if let Some(pattern) = &field.pattern {
                        compile(pattern)?;
                    }
                }
                for step in &action.steps {
                    if let Some(unknown) = placeholders(&step.run)
                        .into_iter()
                        .find(|name| !declared.contains(name))
                    {
                        return Err(HostpilotError::UnknownPlaceholder {
                            placeholder: format!("{}/{}: {}", service.id, action.id, unknown),
                        });
                    }
                }
            }
        }

        Ok(())
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn service(&self, id: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.id == id)
    }

    /// Categories that have at least one service, in display order
    pub fn categories(&self) -> Vec<Category> {
        Category::all()
            .iter()
            .copied()
            .filter(|c| self.services.iter().any(|s| s.category == *c))
            .collect()
    }

    pub fn services_in(&self, category: Category) -> impl Iterator<Item = &Service> {
        self.services.iter().filter(move |s| s.category == category)
    }

    /// Services that can be probed for an installed flag
    pub fn detectable(&self) -> impl Iterator<Item = (&str, &str)> {
        self.services
            .iter()
            .filter_map(|s| s.detect.as_deref().map(|d| (s.id.as_str(), d)))
    }

    fn lookup(&self, service: &str, action: &str) -> Result<(&Service, &ActionSpec)> {
        let svc = self
            .service(service)
            .ok_or_else(|| HostpilotError::UnknownService {
                service: service.to_string(),
            })?;
        let act = svc
            .action(action)
            .ok_or_else(|| HostpilotError::UnknownAction {
                service: service.to_string(),
                action: action.to_string(),
            })?;
        Ok((svc, act))
    }
}

impl ActionProvider for Catalog {
    fn plan(&self, service: &str, action: &str, values: &FieldValues) -> Result<Plan> {
        let (svc, act) = self.lookup(service, action)?;

        let mut resolved = FieldValues::new();
        let mut secrets = Vec::new();
        for field in &act.fields {
            let value = values
                .get(&field.name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .or_else(|| field.default.clone())
                .unwrap_or_default();
            field.validate(&value)?;
            if field.secret && !value.is_empty() {
                secrets.push(value.clone());
            }
            resolved.insert(field.name.clone(), value);
        }

        let commands = act
            .steps
            .iter()
            .map(|step| {
                let invocation = render(&step.run, &resolved)?;
                let description = if step.description.is_empty() {
                    redact(&invocation, &secrets)
                } else {
                    step.description.clone()
                };
                Ok(Command::new(invocation, description))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Plan {
            label: format!("{}/{}", svc.id, act.id),
            title: format!("{} · {}", svc.name, act.name),
            commands,
            mode: act.mode,
            installs: act.marks_installed.map(|installed| InstallMark {
                service: svc.id.clone(),
                installed,
            }),
            secrets,
        })
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| HostpilotError::InvalidPattern {
        pattern: pattern.to_string(),
        details: e.to_string(),
    })
}
