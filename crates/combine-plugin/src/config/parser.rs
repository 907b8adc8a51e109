//! Recursive-descent parser for the configuration mapping literal.
//!
//! The accepted language is a small, declarative subset of a dictionary
//! literal:
//!
//! ```text
//! value   := string | boolean | mapping
//! mapping := '{' (entry (',' entry)* ','?)? '}'
//! entry   := string ':' value
//! ```
//!
//! Nothing is ever evaluated. Entry order is preserved and duplicate keys
//! are rejected. Mappings nest at most [`MAX_DEPTH`] levels deep.

use std::ops::Range;

use super::lexer::{tokenize, unquote, Token};
use crate::error::ConfigError;

/// Deepest mapping nesting accepted.
pub const MAX_DEPTH: usize = 16;

/// A parsed configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    /// A quoted string.
    String(String),
    /// `True` / `False`.
    Bool(bool),
    /// A nested mapping.
    Mapping(Mapping),
}

impl ConfigValue {
    /// Name of the value kind, for error messages.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Bool(_) => "boolean",
            Self::Mapping(_) => "mapping",
        }
    }
}

/// An insertion-ordered mapping from string keys to values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    entries: Vec<(String, ConfigValue)>,
}

impl Mapping {
    /// Look up a key.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Iterate entries in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the mapping has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parse a complete configuration text into a single value.
pub fn parse(source: &str) -> Result<ConfigValue, ConfigError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        end: source.len(),
        depth: 0,
    };

    let value = parser.value()?;
    if let Some((token, span)) = parser.tokens.get(parser.pos) {
        return Err(ConfigError::Syntax {
            offset: span.start,
            message: format!("unexpected {} after end of configuration", token.describe()),
        });
    }
    Ok(value)
}

struct Parser<'src> {
    tokens: Vec<(Token<'src>, Range<usize>)>,
    pos: usize,
    end: usize,
    depth: usize,
}

impl<'src> Parser<'src> {
    fn peek(&self) -> Option<&Token<'src>> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map_or(self.end, |(_, span)| span.start)
    }

    fn error(&self, expected: &str) -> ConfigError {
        let found = self.peek().map_or("end of input", Token::describe);
        ConfigError::Syntax {
            offset: self.offset(),
            message: format!("expected {expected}, found {found}"),
        }
    }

    fn expect(&mut self, want: &Token<'src>) -> Result<(), ConfigError> {
        if self.peek() == Some(want) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(want.describe()))
        }
    }

    fn value(&mut self) -> Result<ConfigValue, ConfigError> {
        match self.peek() {
            Some(Token::LBrace) => self.mapping().map(ConfigValue::Mapping),
            Some(Token::True) => {
                self.pos += 1;
                Ok(ConfigValue::Bool(true))
            }
            Some(Token::False) => {
                self.pos += 1;
                Ok(ConfigValue::Bool(false))
            }
            Some(Token::DoubleQuoted(_) | Token::SingleQuoted(_)) => {
                self.string().map(ConfigValue::String)
            }
            _ => Err(self.error("a string, boolean or mapping")),
        }
    }

    fn string(&mut self) -> Result<String, ConfigError> {
        match self.peek() {
            Some(Token::DoubleQuoted(s) | Token::SingleQuoted(s)) => {
                let value = unquote(s);
                self.pos += 1;
                Ok(value)
            }
            _ => Err(self.error("a quoted string")),
        }
    }

    fn mapping(&mut self) -> Result<Mapping, ConfigError> {
        if self.depth == MAX_DEPTH {
            return Err(ConfigError::Syntax {
                offset: self.offset(),
                message: "mapping nested too deeply".to_string(),
            });
        }
        self.depth += 1;
        let mapping = self.entries();
        self.depth -= 1;
        mapping
    }

    fn entries(&mut self) -> Result<Mapping, ConfigError> {
        self.expect(&Token::LBrace)?;
        let mut mapping = Mapping::default();

        loop {
            if self.peek() == Some(&Token::RBrace) {
                self.pos += 1;
                return Ok(mapping);
            }

            let key = self.string()?;
            self.expect(&Token::Colon)?;
            let value = self.value()?;
            if mapping.get(&key).is_some() {
                return Err(ConfigError::DuplicateKey(key));
            }
            mapping.entries.push((key, value));

            match self.peek() {
                Some(Token::Comma) => self.pos += 1,
                Some(Token::RBrace) => {}
                _ => return Err(self.error("',' or '}'")),
            }
        }
    }
}
