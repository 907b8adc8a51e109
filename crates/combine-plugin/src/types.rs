//! Plugin interface types.
//!
//! These are the records exchanged with the host ledger processor: the
//! directives and configuration going in, the rewritten directives and the
//! error list coming out.

use combine_core::{Directive, SourceLocation};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ConfigError;

/// Input passed to a plugin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginInput {
    /// All directives to process, in file order.
    pub directives: Vec<Directive>,
    /// Ledger options.
    pub options: PluginOptions,
    /// Configuration string from the `plugin` directive.
    pub config: Option<String>,
}

/// Ledger options visible to plugins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginOptions {
    /// Operating currencies.
    pub operating_currencies: Vec<String>,
    /// Ledger title.
    pub title: Option<String>,
}

/// Output returned by a plugin.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginOutput {
    /// Directives after processing.
    pub directives: Vec<Directive>,
    /// Errors and warnings for the host to report.
    pub errors: Vec<PluginError>,
}

/// Severity of a plugin error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PluginErrorSeverity {
    /// Processing could not be carried out.
    Error,
    /// A record was skipped; processing continued.
    Warning,
}

/// What a plugin error is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PluginErrorKind {
    /// The configuration string was absent or invalid.
    Configuration,
    /// A selected posting has no usable super-meta value.
    MissingMetadata,
    /// A super-meta value matched no rewrite rule.
    UnmatchedRule,
}

impl fmt::Display for PluginErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Configuration => "configuration",
            Self::MissingMetadata => "missing-metadata",
            Self::UnmatchedRule => "unmatched-rule",
        };
        write!(f, "{name}")
    }
}

/// An error or warning reported by a plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginError {
    /// What the problem is about.
    pub kind: PluginErrorKind,
    /// Human-readable message.
    pub message: String,
    /// Severity.
    pub severity: PluginErrorSeverity,
    /// Source file of the offending record, if known.
    pub source_file: Option<String>,
    /// Line of the offending record, if known.
    pub line_number: Option<u32>,
}

impl PluginError {
    /// Create an error.
    pub fn error(kind: PluginErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            severity: PluginErrorSeverity::Error,
            source_file: None,
            line_number: None,
        }
    }

    /// Create a warning.
    pub fn warning(kind: PluginErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            severity: PluginErrorSeverity::Warning,
            source_file: None,
            line_number: None,
        }
    }

    /// Attach a source location.
    #[must_use]
    pub fn at(mut self, location: Option<&SourceLocation>) -> Self {
        if let Some(location) = location {
            self.source_file = Some(location.filename.clone());
            self.line_number = Some(location.lineno);
        }
        self
    }
}

impl fmt::Display for PluginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.source_file, self.line_number) {
            (Some(file), Some(line)) => write!(f, "{file}:{line}: ")?,
            (Some(file), None) => write!(f, "{file}: ")?,
            _ => {}
        }
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl From<ConfigError> for PluginError {
    fn from(err: ConfigError) -> Self {
        Self::error(PluginErrorKind::Configuration, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_with_location_display() {
        let warning = PluginError::warning(PluginErrorKind::UnmatchedRule, "no rule for 'x'")
            .at(Some(&SourceLocation::new("agent.bean", 17)));

        assert_eq!(warning.severity, PluginErrorSeverity::Warning);
        assert_eq!(warning.source_file.as_deref(), Some("agent.bean"));
        assert_eq!(warning.line_number, Some(17));
        assert_eq!(
            warning.to_string(),
            "agent.bean:17: [unmatched-rule] no rule for 'x'"
        );
    }

    #[test]
    fn test_config_error_conversion() {
        let err = PluginError::from(ConfigError::MissingKey("our_tag"));
        assert_eq!(err.kind, PluginErrorKind::Configuration);
        assert_eq!(err.severity, PluginErrorSeverity::Error);
        assert!(err.message.contains("our_tag"));
        assert_eq!(err.to_string(), format!("[configuration] {}", err.message));
    }
}
