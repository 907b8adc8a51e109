//! Rewrite rules and the super-meta rule matcher.
//!
//! Each rule maps a super-meta value (its name) to the account of the
//! balancing posting and a metadata template for it. Rules are immutable
//! blueprints: [`RewriteRule::expand`] produces a fresh [`ExpandedRule`] for
//! every match, so `*` placeholders never leak from one posting into the
//! next.

use combine_core::{MetaValue, Metadata};
use regex::Regex;

use crate::error::ConfigError;

/// Placeholder substituted with the matched super-meta value.
pub const PLACEHOLDER: &str = "*";

/// How rule names are interpreted when no name matches exactly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RuleSyntax {
    /// Shell-style globs (`*`, `?`, `[...]`) matching the whole value.
    #[default]
    Glob,
    /// Regular expressions anchored at the start of the value.
    Regex,
}

impl RuleSyntax {
    /// Parse the configuration spelling.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "glob" => Some(Self::Glob),
            "regex" => Some(Self::Regex),
            _ => None,
        }
    }

    fn compile(self, name: &str) -> Result<Regex, ConfigError> {
        let source = match self {
            Self::Glob => glob_to_regex(name),
            Self::Regex => format!("^(?:{name})"),
        };
        Regex::new(&source).map_err(|err| ConfigError::InvalidPattern {
            pattern: name.to_string(),
            message: err.to_string(),
        })
    }
}

/// A rule definition as written in the configuration, before compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTemplate {
    /// Target account; may contain `*`.
    pub account: String,
    /// Metadata template in declaration order; a value of `*` is a placeholder.
    pub meta: Vec<(String, String)>,
}

impl RuleTemplate {
    /// Parse an `sm_<name>` value: `<account>;<key>:<value>;...`.
    ///
    /// Items are split at the first `:`; surrounding whitespace is trimmed
    /// and empty items are ignored.
    pub fn parse(name: &str, spec: &str) -> Result<Self, ConfigError> {
        let mut parts = spec.split(';');
        let account = parts.next().unwrap_or_default().trim();
        if account.is_empty() {
            return Err(ConfigError::InvalidRule {
                name: name.to_string(),
                message: "target account is empty".to_string(),
            });
        }

        let mut meta: Vec<(String, String)> = Vec::new();
        for item in parts.map(str::trim).filter(|item| !item.is_empty()) {
            let Some((key, value)) = item.split_once(':') else {
                return Err(ConfigError::InvalidRule {
                    name: name.to_string(),
                    message: format!("metadata item '{item}' is not of the form key:value"),
                });
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(ConfigError::InvalidRule {
                    name: name.to_string(),
                    message: format!("metadata item '{item}' has an empty key"),
                });
            }
            upsert(&mut meta, key.to_string(), value.trim().to_string());
        }

        Ok(Self {
            account: account.to_string(),
            meta,
        })
    }
}

/// A compiled rewrite rule.
#[derive(Debug, Clone)]
pub struct RewriteRule {
    name: String,
    template: RuleTemplate,
    pattern: Regex,
}

impl RewriteRule {
    /// The rule name, i.e. the super-meta value or pattern it answers to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The uncompiled definition.
    pub const fn template(&self) -> &RuleTemplate {
        &self.template
    }

    /// Instantiate the rule for one matched super-meta value.
    ///
    /// A `*` in the account is replaced by the capitalized value; a metadata
    /// template value that is exactly `*` becomes the value itself.
    pub fn expand(&self, value: &str) -> ExpandedRule {
        let account = self
            .template
            .account
            .replace(PLACEHOLDER, &capitalize(value));
        let meta = self
            .template
            .meta
            .iter()
            .map(|(k, v)| {
                let v = if v == PLACEHOLDER { value } else { v.as_str() };
                (k.clone(), MetaValue::string(v))
            })
            .collect();
        ExpandedRule { account, meta }
    }
}

/// A rule instantiated for a single posting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedRule {
    /// Account of the balancing posting.
    pub account: String,
    /// Metadata overlaid on the balancing posting.
    pub meta: Metadata,
}

/// Ordered table of rewrite rules.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: Vec<RewriteRule>,
}

impl RuleTable {
    /// Compile named rule templates, keeping their order.
    pub fn new(
        templates: Vec<(String, RuleTemplate)>,
        syntax: RuleSyntax,
    ) -> Result<Self, ConfigError> {
        let rules = templates
            .into_iter()
            .map(|(name, template)| {
                Ok(RewriteRule {
                    pattern: syntax.compile(&name)?,
                    name,
                    template,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        Ok(Self { rules })
    }

    /// Find the rule for a super-meta value.
    ///
    /// Exact name equality is tried against every rule first, in table
    /// order. Only then are rule names used as patterns against the value.
    /// First match wins.
    pub fn find(&self, value: &str) -> Option<&RewriteRule> {
        self.rules
            .iter()
            .find(|rule| rule.name == value)
            .or_else(|| self.rules.iter().find(|rule| rule.pattern.is_match(value)))
    }

    /// Iterate the rules in table order.
    pub fn iter(&self) -> impl Iterator<Item = &RewriteRule> {
        self.rules.iter()
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Insert or replace a keyed entry, keeping the position of an existing key.
pub(crate) fn upsert<V>(entries: &mut Vec<(String, V)>, key: String, value: V) {
    if let Some(slot) = entries.iter_mut().find(|(k, _)| *k == key) {
        slot.1 = value;
    } else {
        entries.push((key, value));
    }
}

/// Uppercase the first character and lowercase the rest.
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Translate a shell glob into an anchored regex.
///
/// `*` matches any run and `?` any single character, newlines included.
/// `[...]` is a character set (`[!...]` negated). An unclosed `[` is literal.
pub fn glob_to_regex(glob: &str) -> String {
    let chars: Vec<char> = glob.chars().collect();
    let mut out = String::from("(?s)^(?:");
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        i += 1;
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '[' => {
                let mut j = i;
                if chars.get(j) == Some(&'!') {
                    j += 1;
                }
                if chars.get(j) == Some(&']') {
                    j += 1;
                }
                while j < chars.len() && chars[j] != ']' {
                    j += 1;
                }
                if j >= chars.len() {
                    out.push_str(r"\[");
                    continue;
                }

                let mut set = &chars[i..j];
                out.push('[');
                if set.first() == Some(&'!') {
                    out.push('^');
                    set = &set[1..];
                }
                for &member in set {
                    if matches!(member, '\\' | '[' | ']' | '&' | '~' | '^') {
                        out.push('\\');
                    }
                    out.push(member);
                }
                out.push(']');
                i = j + 1;
            }
            other => {
                let mut buf = [0u8; 4];
                out.push_str(&regex::escape(other.encode_utf8(&mut buf)));
            }
        }
    }

    out.push_str(")$");
    out
}
