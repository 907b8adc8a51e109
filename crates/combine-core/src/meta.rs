//! Metadata values and source provenance.
//!
//! Directives and postings carry a key-value [`Metadata`] map. The parser
//! records where each record came from under the [`FILENAME_KEY`] and
//! [`LINENO_KEY`] entries; [`SourceLocation`] reads and writes that pair.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::Amount;

/// Metadata key holding the source file of a record.
pub const FILENAME_KEY: &str = "filename";

/// Metadata key holding the 1-based source line of a record.
pub const LINENO_KEY: &str = "lineno";

/// Metadata value types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetaValue {
    /// String value
    String(String),
    /// Account reference
    Account(String),
    /// Currency code
    Currency(String),
    /// Tag reference
    Tag(String),
    /// Date value
    Date(NaiveDate),
    /// Numeric value
    Number(Decimal),
    /// Boolean value
    Bool(bool),
    /// Amount value
    Amount(Amount),
    /// Null/None value
    None,
}

impl MetaValue {
    /// Create a string value.
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// Get the textual payload of string-like values.
    ///
    /// Returns `None` for numbers, dates, booleans, amounts and `None`.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Account(s) | Self::Currency(s) | Self::Tag(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "\"{s}\""),
            Self::Account(a) => write!(f, "{a}"),
            Self::Currency(c) => write!(f, "{c}"),
            Self::Tag(t) => write!(f, "#{t}"),
            Self::Date(d) => write!(f, "{d}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Amount(a) => write!(f, "{a}"),
            Self::None => write!(f, "None"),
        }
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// Metadata is a key-value map attached to directives and postings.
pub type Metadata = HashMap<String, MetaValue>;

/// Where a record was read from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Source file path as recorded by the parser
    pub filename: String,
    /// 1-based line number
    pub lineno: u32,
}

impl SourceLocation {
    /// Create a new source location.
    #[must_use]
    pub fn new(filename: impl Into<String>, lineno: u32) -> Self {
        Self {
            filename: filename.into(),
            lineno,
        }
    }

    /// Read the location recorded in a metadata map.
    ///
    /// A map with a filename but no usable line number yields line 0.
    #[must_use]
    pub fn from_meta(meta: &Metadata) -> Option<Self> {
        let filename = meta.get(FILENAME_KEY)?.as_str()?;
        let lineno = match meta.get(LINENO_KEY) {
            Some(MetaValue::Number(n)) => n.to_u32().unwrap_or(0),
            Some(MetaValue::String(s)) => s.parse().unwrap_or(0),
            _ => 0,
        };
        Some(Self::new(filename, lineno))
    }

    /// Record this location in a metadata map, replacing any previous one.
    pub fn write_meta(&self, meta: &mut Metadata) {
        meta.insert(
            FILENAME_KEY.to_string(),
            MetaValue::String(self.filename.clone()),
        );
        meta.insert(
            LINENO_KEY.to_string(),
            MetaValue::Number(Decimal::from(self.lineno)),
        );
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.filename, self.lineno)
    }
}
