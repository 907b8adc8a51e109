//! Plugin configuration.
//!
//! The host hands the plugin a single configuration string taken from the
//! ledger's `plugin` directive, for example:
//!
//! ```text
//! plugin "combine_entities" "{
//!     'filter_account' : 'Liabilities:Principal',
//!     'our_tag'        : 'oi-master',
//!     'filter_amount'  : 'dt',
//!     'our_account'    : 'Assets:Agent',
//!     'super_meta'     : 'sub',
//!     'sm_sales'       : 'Expenses:Agency;sub:sales expenses;com:advance',
//!     'sm_cash*'       : 'Liabilities:Intra-group;sub:*',
//! }"
//! ```
//!
//! The text is tokenized and parsed as a declarative mapping literal
//! ([`parser`]) and then validated against a fixed schema into a
//! [`CombineConfig`]. Validation fails closed: unknown keys, wrong value
//! kinds and malformed rules are all [`ConfigError`]s.

pub mod lexer;
pub mod parser;

use combine_core::Amount;
use regex::Regex;

use crate::error::ConfigError;
use crate::rules::{upsert, RuleSyntax, RuleTable, RuleTemplate};
use parser::{ConfigValue, Mapping};

/// `filter_amount` sentinel selecting postings with a positive amount.
pub const FILTER_DEBIT: &str = "dt";

/// `filter_amount` sentinel selecting postings with a negative amount.
pub const FILTER_CREDIT: &str = "ct";

/// Default for `filter_flag`.
pub const DEFAULT_FILTER_FLAG: char = 'x';

/// Default for `super_meta`.
pub const DEFAULT_SUPER_META: &str = "s_meta";

/// Default for `invert_amount`.
pub const DEFAULT_INVERT_AMOUNT: bool = true;

/// Prefix of keys that define one rewrite rule each.
pub const RULE_KEY_PREFIX: &str = "sm_";

const KNOWN_KEYS: &[&str] = &[
    "filter_account",
    "our_tag",
    "filter_amount",
    "our_account",
    "filter_flag",
    "super_meta",
    "invert_amount",
    "keep_unmatched_postings",
    "keep_prices",
    "rule_syntax",
    "meta_map",
];

/// Which sign a posting amount must have to be selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountFilter {
    /// Amount greater than zero (`dt`).
    Debit,
    /// Amount less than zero (`ct`).
    Credit,
}

impl AmountFilter {
    /// Parse a sign sentinel.
    pub fn from_sentinel(sentinel: &str) -> Option<Self> {
        match sentinel {
            FILTER_DEBIT => Some(Self::Debit),
            FILTER_CREDIT => Some(Self::Credit),
            _ => None,
        }
    }

    /// Whether an amount passes the sign test. Zero never does.
    pub const fn accepts(self, amount: &Amount) -> bool {
        match self {
            Self::Debit => amount.is_positive(),
            Self::Credit => amount.is_negative(),
        }
    }
}

/// Recognizes transactions belonging to the owning entity.
#[derive(Debug, Clone)]
pub struct TagMatcher {
    tag: String,
    pattern: Regex,
}

impl TagMatcher {
    /// Build a matcher; the tag doubles as a regex anchored at the start.
    pub fn new(tag: &str) -> Result<Self, ConfigError> {
        let pattern =
            Regex::new(&format!("^(?:{tag})")).map_err(|err| ConfigError::InvalidPattern {
                pattern: tag.to_string(),
                message: err.to_string(),
            })?;
        Ok(Self {
            tag: tag.to_string(),
            pattern,
        })
    }

    /// The configured tag.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// True if any tag equals the configured tag or matches it as a pattern.
    pub fn matches(&self, tags: &[String]) -> bool {
        tags.iter().any(|t| *t == self.tag) || tags.iter().any(|t| self.pattern.is_match(t))
    }
}

/// Validated plugin configuration.
#[derive(Debug, Clone)]
pub struct CombineConfig {
    /// Account whose postings are rewritten.
    pub filter_account: String,
    /// Tag identifying the owning entity's transactions.
    pub our_tag: TagMatcher,
    /// Sign test applied to `filter_account` postings.
    pub filter_amount: AmountFilter,
    /// Account the selected postings are moved to.
    pub our_account: String,
    /// Transaction flag reserved for flag-based selection. Parsed and
    /// validated; selection does not consult it yet.
    pub filter_flag: char,
    /// Posting metadata key whose value selects the rewrite rule.
    pub super_meta: String,
    /// Negate the moved posting (and keep the original sign on the
    /// balancing posting) when true; the reverse when false.
    pub invert_amount: bool,
    /// Keep postings of a rewritten transaction that were not selected.
    pub keep_unmatched_postings: bool,
    /// Keep every Price directive regardless of its source file.
    pub keep_prices: bool,
    /// Rewrite rules in configuration order.
    pub rules: RuleTable,
}

impl CombineConfig {
    /// Parse and validate a configuration string.
    pub fn parse(source: &str) -> Result<Self, ConfigError> {
        if source.trim().is_empty() {
            return Err(ConfigError::Missing);
        }
        match parser::parse(source)? {
            ConfigValue::Mapping(mapping) => Self::from_mapping(&mapping),
            other => Err(ConfigError::NotAMapping {
                found: other.kind(),
            }),
        }
    }

    /// Parse the optional configuration string of a plugin invocation.
    pub fn from_option(source: Option<&str>) -> Result<Self, ConfigError> {
        source.map_or(Err(ConfigError::Missing), Self::parse)
    }

    /// Validate an already parsed mapping.
    pub fn from_mapping(mapping: &Mapping) -> Result<Self, ConfigError> {
        for (key, _) in mapping.iter() {
            if !KNOWN_KEYS.contains(&key) && !key.starts_with(RULE_KEY_PREFIX) {
                return Err(ConfigError::UnknownKey(key.to_string()));
            }
        }

        let filter_amount_raw = required_str(mapping, "filter_amount")?;
        let filter_amount =
            AmountFilter::from_sentinel(filter_amount_raw).ok_or_else(|| {
                ConfigError::InvalidValue {
                    key: "filter_amount".to_string(),
                    message: format!(
                        "expected '{FILTER_DEBIT}' or '{FILTER_CREDIT}', found '{filter_amount_raw}'"
                    ),
                }
            })?;

        let filter_flag = match optional_str(mapping, "filter_flag")? {
            None => DEFAULT_FILTER_FLAG,
            Some(flag) => single_char(flag).ok_or_else(|| ConfigError::InvalidValue {
                key: "filter_flag".to_string(),
                message: format!("expected a single character, found '{flag}'"),
            })?,
        };

        let rule_syntax = match optional_str(mapping, "rule_syntax")? {
            None => RuleSyntax::default(),
            Some(name) => {
                RuleSyntax::from_name(name).ok_or_else(|| ConfigError::InvalidValue {
                    key: "rule_syntax".to_string(),
                    message: format!("expected 'glob' or 'regex', found '{name}'"),
                })?
            }
        };

        let super_meta = optional_str(mapping, "super_meta")?
            .unwrap_or(DEFAULT_SUPER_META)
            .to_string();
        if super_meta.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "super_meta".to_string(),
                message: "metadata key is empty".to_string(),
            });
        }

        let config = Self {
            filter_account: non_empty_str(mapping, "filter_account")?.to_string(),
            our_tag: TagMatcher::new(non_empty_str(mapping, "our_tag")?)?,
            filter_amount,
            our_account: non_empty_str(mapping, "our_account")?.to_string(),
            filter_flag,
            super_meta,
            invert_amount: optional_bool(mapping, "invert_amount")?
                .unwrap_or(DEFAULT_INVERT_AMOUNT),
            keep_unmatched_postings: optional_bool(mapping, "keep_unmatched_postings")?
                .unwrap_or(false),
            keep_prices: optional_bool(mapping, "keep_prices")?.unwrap_or(true),
            rules: RuleTable::new(rule_templates(mapping)?, rule_syntax)?,
        };

        if config.rules.is_empty() {
            return Err(ConfigError::NoRules);
        }

        tracing::debug!(
            "combine_entities config: filter_account={} our_account={} super_meta={} rules={}",
            config.filter_account,
            config.our_account,
            config.super_meta,
            config.rules.len()
        );

        Ok(config)
    }
}

/// Collect rule templates: `meta_map` entries first, then `sm_` keys.
///
/// An `sm_<name>` whose name already came from `meta_map` replaces that
/// rule in place.
fn rule_templates(mapping: &Mapping) -> Result<Vec<(String, RuleTemplate)>, ConfigError> {
    let mut templates: Vec<(String, RuleTemplate)> = Vec::new();

    match mapping.get("meta_map") {
        None => {}
        Some(ConfigValue::Mapping(meta_map)) => {
            for (name, value) in meta_map.iter() {
                let template = meta_map_rule(name, value)?;
                upsert(&mut templates, name.to_string(), template);
            }
        }
        Some(other) => {
            return Err(ConfigError::WrongType {
                key: "meta_map".to_string(),
                expected: "mapping",
                found: other.kind(),
            })
        }
    }

    for (key, value) in mapping.iter() {
        let Some(name) = key.strip_prefix(RULE_KEY_PREFIX) else {
            continue;
        };
        if name.is_empty() {
            return Err(ConfigError::InvalidRule {
                name: key.to_string(),
                message: "rule name after 'sm_' is empty".to_string(),
            });
        }
        let ConfigValue::String(spec) = value else {
            return Err(ConfigError::WrongType {
                key: key.to_string(),
                expected: "string",
                found: value.kind(),
            });
        };
        upsert(
            &mut templates,
            name.to_string(),
            RuleTemplate::parse(name, spec)?,
        );
    }

    Ok(templates)
}

/// One `meta_map` entry: `{'account': str, 'meta': {key: str}}`.
fn meta_map_rule(name: &str, value: &ConfigValue) -> Result<RuleTemplate, ConfigError> {
    let invalid = |message: String| ConfigError::InvalidRule {
        name: name.to_string(),
        message,
    };

    let ConfigValue::Mapping(entry) = value else {
        return Err(invalid(format!("expected a mapping, found {}", value.kind())));
    };

    let mut account = None;
    let mut meta = Vec::new();
    for (key, value) in entry.iter() {
        match (key, value) {
            ("account", ConfigValue::String(s)) if !s.trim().is_empty() => {
                account = Some(s.trim().to_string());
            }
            ("meta", ConfigValue::Mapping(items)) => {
                for (meta_key, meta_value) in items.iter() {
                    let ConfigValue::String(meta_value) = meta_value else {
                        return Err(invalid(format!(
                            "metadata value for '{meta_key}' must be a string"
                        )));
                    };
                    meta.push((meta_key.to_string(), meta_value.clone()));
                }
            }
            ("account" | "meta", other) => {
                return Err(invalid(format!(
                    "unexpected {} for '{key}'",
                    other.kind()
                )))
            }
            _ => return Err(invalid(format!("unknown field '{key}'"))),
        }
    }

    let account = account.ok_or_else(|| invalid("target account is missing".to_string()))?;
    Ok(RuleTemplate { account, meta })
}

fn optional_str<'a>(mapping: &'a Mapping, key: &str) -> Result<Option<&'a str>, ConfigError> {
    match mapping.get(key) {
        None => Ok(None),
        Some(ConfigValue::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(ConfigError::WrongType {
            key: key.to_string(),
            expected: "string",
            found: other.kind(),
        }),
    }
}

fn required_str<'a>(mapping: &'a Mapping, key: &'static str) -> Result<&'a str, ConfigError> {
    optional_str(mapping, key)?.ok_or(ConfigError::MissingKey(key))
}

fn non_empty_str<'a>(mapping: &'a Mapping, key: &'static str) -> Result<&'a str, ConfigError> {
    let value = required_str(mapping, key)?;
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "value is empty".to_string(),
        });
    }
    Ok(value)
}

fn optional_bool(mapping: &Mapping, key: &str) -> Result<Option<bool>, ConfigError> {
    match mapping.get(key) {
        None => Ok(None),
        Some(ConfigValue::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(ConfigError::WrongType {
            key: key.to_string(),
            expected: "boolean",
            found: other.kind(),
        }),
    }
}

fn single_char(value: &str) -> Option<char> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}
