//! Logos tokenizer for the configuration mapping literal.

use logos::Logos;
use std::fmt;
use std::ops::Range;

use crate::error::ConfigError;

/// Token types of the configuration literal.
///
/// Whitespace and `#` line comments are skipped.
#[derive(Logos, Debug, Clone, PartialEq, Eq)]
#[logos(skip r"([ \t\r\n\f]+|#[^\n]*)")]
pub enum Token<'src> {
    /// Left brace `{` opening a mapping.
    #[token("{")]
    LBrace,
    /// Right brace `}` closing a mapping.
    #[token("}")]
    RBrace,
    /// Colon `:` between key and value.
    #[token(":")]
    Colon,
    /// Comma `,` between entries.
    #[token(",")]
    Comma,

    /// A double-quoted string. The slice includes the quotes.
    #[regex(r#""([^"\\]|\\.)*""#)]
    DoubleQuoted(&'src str),

    /// A single-quoted string. The slice includes the quotes.
    #[regex(r"'([^'\\]|\\.)*'")]
    SingleQuoted(&'src str),

    /// Boolean true.
    #[token("True")]
    #[token("true")]
    True,

    /// Boolean false.
    #[token("False")]
    #[token("false")]
    False,

    /// Any other bare word. Never valid, kept for error messages.
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident(&'src str),
}

impl Token<'_> {
    /// Short description used in syntax errors.
    pub const fn describe(&self) -> &'static str {
        match self {
            Self::LBrace => "'{'",
            Self::RBrace => "'}'",
            Self::Colon => "':'",
            Self::Comma => "','",
            Self::DoubleQuoted(_) | Self::SingleQuoted(_) => "string",
            Self::True | Self::False => "boolean",
            Self::Ident(_) => "identifier",
        }
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LBrace => write!(f, "{{"),
            Self::RBrace => write!(f, "}}"),
            Self::Colon => write!(f, ":"),
            Self::Comma => write!(f, ","),
            Self::DoubleQuoted(s) | Self::SingleQuoted(s) | Self::Ident(s) => write!(f, "{s}"),
            Self::True => write!(f, "True"),
            Self::False => write!(f, "False"),
        }
    }
}

/// Tokenize the whole configuration text.
///
/// Fails on the first character sequence that is not a token.
pub fn tokenize(source: &str) -> Result<Vec<(Token<'_>, Range<usize>)>, ConfigError> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(token) => tokens.push((token, span)),
            Err(()) => {
                return Err(ConfigError::Syntax {
                    offset: span.start,
                    message: format!("unexpected input '{}'", lexer.slice()),
                })
            }
        }
    }

    Ok(tokens)
}

/// Strip the quotes from a string token and resolve backslash escapes.
///
/// Unknown escapes are kept verbatim, backslash included.
pub fn unquote(quoted: &str) -> String {
    let inner = &quoted[1..quoted.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(q @ ('\\' | '\'' | '"')) => out.push(q),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token<'_>> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|(t, _)| t)
            .collect()
    }

    #[test]
    fn test_tokenize_mapping() {
        let tokens = kinds("{'our_tag': \"oi-master\", 'invert_amount': True,}");
        assert_eq!(
            tokens,
            vec![
                Token::LBrace,
                Token::SingleQuoted("'our_tag'"),
                Token::Colon,
                Token::DoubleQuoted("\"oi-master\""),
                Token::Comma,
                Token::SingleQuoted("'invert_amount'"),
                Token::Colon,
                Token::True,
                Token::Comma,
                Token::RBrace,
            ]
        );
    }

    #[test]
    fn test_comments_and_newlines_skipped() {
        let tokens = kinds("{\n  # principal side\n  'a': false\n}");
        assert_eq!(
            tokens,
            vec![
                Token::LBrace,
                Token::SingleQuoted("'a'"),
                Token::Colon,
                Token::False,
                Token::RBrace,
            ]
        );
    }

    #[test]
    fn test_bare_word_is_identifier() {
        assert_eq!(kinds("None"), vec![Token::Ident("None")]);
    }

    #[test]
    fn test_span_of_bad_input() {
        let err = tokenize("{'a': 12}").unwrap_err();
        assert!(matches!(err, ConfigError::Syntax { offset: 6, .. }));
    }

    #[test]
    fn test_unterminated_string_is_error() {
        assert!(tokenize("{'abc").is_err());
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("'plain'"), "plain");
        assert_eq!(unquote(r#""say \"hi\"""#), "say \"hi\"");
        assert_eq!(unquote(r"'it\'s'"), "it's");
        assert_eq!(unquote(r"'a\nb'"), "a\nb");
        assert_eq!(unquote(r"'\d+'"), r"\d+");
    }
}
