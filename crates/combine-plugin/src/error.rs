//! Configuration error type.

use thiserror::Error;

/// A fatal problem with the plugin configuration string.
///
/// Any of these aborts the plugin before a single directive is looked at.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No configuration string was supplied.
    #[error("plugin configuration is missing")]
    Missing,

    /// The configuration text could not be tokenized or parsed.
    #[error("syntax error in plugin configuration at offset {offset}: {message}")]
    Syntax {
        /// Byte offset of the offending token.
        offset: usize,
        /// What went wrong.
        message: String,
    },

    /// The configuration parsed, but is not a mapping.
    #[error("plugin configuration must be a single mapping, found {found}")]
    NotAMapping {
        /// Kind of value found instead.
        found: &'static str,
    },

    /// A key appears twice in the same mapping.
    #[error("duplicate configuration key '{0}'")]
    DuplicateKey(String),

    /// A key not understood by the plugin.
    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),

    /// A required key is absent.
    #[error("missing required configuration key '{0}'")]
    MissingKey(&'static str),

    /// A key holds a value of the wrong kind.
    #[error("configuration key '{key}' expects {expected}, found {found}")]
    WrongType {
        /// The key.
        key: String,
        /// Kind of value expected.
        expected: &'static str,
        /// Kind of value found.
        found: &'static str,
    },

    /// A key holds a value of the right kind but an unusable content.
    #[error("invalid value for configuration key '{key}': {message}")]
    InvalidValue {
        /// The key.
        key: String,
        /// What is wrong with it.
        message: String,
    },

    /// A rewrite rule definition is malformed.
    #[error("invalid rewrite rule '{name}': {message}")]
    InvalidRule {
        /// Rule name (the part after `sm_`).
        name: String,
        /// What is wrong with it.
        message: String,
    },

    /// A rule name or tag could not be compiled as a pattern.
    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The pattern as written in the configuration.
        pattern: String,
        /// The regex compiler's message.
        message: String,
    },

    /// No rewrite rules were configured.
    #[error("no rewrite rules configured (expected at least one 'sm_<name>' key)")]
    NoRules,
}
