//! `{{name}}` placeholder substitution for command templates

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{HostpilotError, Result};

/// Pattern for {{field}} references
static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").unwrap());

const MASK: &str = "••••••";

/// Names referenced by a template, in order of appearance (duplicates kept)
pub fn placeholders(template: &str) -> Vec<&str> {
    PLACEHOLDER
        .captures_iter(template)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect()
}

/// Substitute every placeholder; an undeclared name is an error
pub fn render(template: &str, values: &BTreeMap<String, String>) -> Result<String> {
    if let Some(missing) = placeholders(template)
        .into_iter()
        .find(|name| !values.contains_key(*name))
    {
        return Err(HostpilotError::UnknownPlaceholder {
            placeholder: missing.to_string(),
        });
    }

    Ok(PLACEHOLDER
        .replace_all(template, |caps: &regex::Captures| {
            values
                .get(&caps[1])
                .cloned()
                .unwrap_or_default()
        })
        .into_owned())
}

/// Mask secret values wherever they appear
pub fn redact(text: &str, secrets: &[String]) -> String {
    secrets
        .iter()
        .filter(|s| !s.is_empty())
        .fold(text.to_string(), |acc, secret| acc.replace(secret.as_str(), MASK))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_render_substitutes_all() {
        let out = render(
            "ufw allow {{ port }}/tcp && echo {{port}} {{name}}",
            &values(&[("port", "22"), ("name", "ssh")]),
        )
        .unwrap();
        assert_eq!(out, "ufw allow 22/tcp && echo 22 ssh");
    }

    #[test]
    fn test_single_braces_untouched() {
        let out = render("server { listen {{port}}; }", &values(&[("port", "80")])).unwrap();
        assert_eq!(out, "server { listen 80; }");
    }

    #[test]
    fn test_unknown_placeholder_errors() {
        let err = render("echo {{nope}}", &values(&[])).unwrap_err();
        assert_eq!(err.code(), "HP-022");
    }

    #[test]
    fn test_placeholders_listed_in_order() {
        assert_eq!(placeholders("{{a}} {{b}} {{a}}"), vec!["a", "b", "a"]);
    }

    #[test]
    fn test_redact_masks_secrets() {
        let out = redact("PASSWORD 'hunter2'", &["hunter2".to_string(), String::new()]);
        assert!(!out.contains("hunter2"));
        assert!(out.contains(MASK));
    }
}
