//! Key file validation.
//!
//! Checks every record the way the vault loader would, but collects all
//! problems instead of stopping at the first one.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use {secrecy::ExposeSecret, strongbox_vault::CipherSuite};

use crate::{
    env_subst::substitute_env,
    loader::{find_key_file, parse_key_file},
    schema::{KeyEntry, KeyFile},
};

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Category: "syntax", "cipher", "encoding", "key-length", "duplicate",
    /// "sealed", "file-ref"
    pub category: &'static str,
    /// Record locator, e.g. `keys[2] (payments)`
    pub path: String,
    pub message: String,
}

/// Result of validating a key file.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
    pub config_path: Option<PathBuf>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

/// Validate the key file at `path`, or the discovered one.
pub fn validate(path: Option<&Path>) -> ValidationResult {
    let config_path = path.map(Path::to_path_buf).or_else(find_key_file);

    let Some(ref actual_path) = config_path else {
        return ValidationResult {
            diagnostics: vec![Diagnostic {
                severity: Severity::Info,
                category: "file-ref",
                path: String::new(),
                message: "no key file found".into(),
            }],
            config_path: None,
        };
    };

    let diagnostics = match std::fs::read_to_string(actual_path) {
        Ok(raw) => validate_str(&substitute_env(&raw), actual_path),
        Err(e) => vec![Diagnostic {
            severity: Severity::Error,
            category: "file-ref",
            path: String::new(),
            message: format!("failed to read key file: {e}"),
        }],
    };

    ValidationResult {
        diagnostics,
        config_path,
    }
}

/// Validate key file contents; the path only selects the format.
#[must_use]
pub fn validate_str(raw: &str, path: &Path) -> Vec<Diagnostic> {
    let file: KeyFile = match parse_key_file(raw, path) {
        Ok(file) => file,
        Err(e) => {
            return vec![Diagnostic {
                severity: Severity::Error,
                category: "syntax",
                path: String::new(),
                message: e.to_string(),
            }];
        },
    };

    let mut diagnostics = Vec::new();
    if file.keys.is_empty() {
        diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            category: "file-ref",
            path: String::new(),
            message: "key file defines no keys".into(),
        });
    }

    let mut seen = HashSet::new();
    for (index, entry) in file.keys.iter().enumerate() {
        let locator = format!("keys[{index}] ({})", entry.identifier);
        check_entry(entry, &locator, &mut diagnostics);

        if !seen.insert((entry.identifier.as_str(), entry.timestamp)) {
            diagnostics.push(Diagnostic {
                severity: Severity::Warning,
                category: "duplicate",
                path: locator,
                message: format!(
                    "another key for {} has timestamp {}; priority between them follows file order",
                    entry.identifier, entry.timestamp
                ),
            });
        }
    }

    diagnostics
}

fn check_entry(entry: &KeyEntry, locator: &str, diagnostics: &mut Vec<Diagnostic>) {
    let mut push = |severity, category, message: String| {
        diagnostics.push(Diagnostic {
            severity,
            category,
            path: locator.to_string(),
            message,
        });
    };

    if entry.identifier.trim().is_empty() {
        push(Severity::Error, "syntax", "empty identifier".into());
    }

    let suite = match entry.cipher.parse::<CipherSuite>() {
        Ok(suite) => Some(suite),
        Err(_) => {
            let known: Vec<_> = CipherSuite::ALL.iter().map(|s| s.name()).collect();
            push(
                Severity::Error,
                "cipher",
                format!(
                    "unknown cipher \"{}\" (expected one of: {})",
                    entry.cipher,
                    known.join(", ")
                ),
            );
            None
        },
    };

    let secret = match strongbox_vault::decode_secret(entry.key.expose_secret()) {
        Ok(secret) => secret,
        Err(e) => {
            push(Severity::Error, "encoding", e.to_string());
            return;
        },
    };

    if entry.sealed {
        // Sealed material has its own length; it is checked after unsealing.
        push(
            Severity::Info,
            "sealed",
            "key is sealed and needs an unsealer at load time".into(),
        );
    } else if let Some(suite) = suite
        && let Err(e) = suite.check_key(&secret)
    {
        push(Severity::Error, "key-length", e.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diags(json: &str) -> Vec<Diagnostic> {
        validate_str(json, Path::new("keys.json"))
    }

    #[test]
    fn valid_file_has_no_diagnostics() {
        let d = diags(&format!(
            r#"{{"keys":[{{"identifier":"a","cipher":"aes-gcm","timestamp":1,"key":"{}"}}]}}"#,
            "11".repeat(32)
        ));
        assert!(d.is_empty(), "{d:?}");
    }

    #[test]
    fn reports_every_problem() {
        let d = diags(
            r#"{"keys":[
                {"identifier":"a","cipher":"rot13","timestamp":1,"key":"00"},
                {"identifier":"b","cipher":"aes-gcm","timestamp":1,"key":"!!"},
                {"identifier":"c","cipher":"aes-pmac-siv","timestamp":1,"key":"0011"},
                {"identifier":"c","cipher":"aes-gcm","timestamp":1,"key":"0011"}
            ]}"#,
        );
        let categories: Vec<_> = d.iter().map(|d| d.category).collect();
        assert!(categories.contains(&"cipher"));
        assert!(categories.contains(&"encoding"));
        assert!(categories.contains(&"key-length"));
        assert!(categories.contains(&"duplicate"));
    }

    #[test]
    fn sealed_keys_are_informational() {
        let d = diags(
            r#"{"keys":[{"identifier":"s","cipher":"aes-gcm","timestamp":1,"key":"0011","sealed":true}]}"#,
        );
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].severity, Severity::Info);
    }

    #[test]
    fn syntax_error() {
        let d = validate_str("[[keys]\n", Path::new("keys.toml"));
        assert_eq!(d[0].category, "syntax");
        assert_eq!(d[0].severity, Severity::Error);
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = validate(Some(Path::new("/nonexistent/strongbox.toml")));
        assert!(result.has_errors());
        assert_eq!(result.count(Severity::Error), 1);
    }
}
