//! Expression tokenizer.
//!
//! Two quirks inherited from the language this implements:
//!
//! - `%2b` is rewritten to `+` before scanning. The language predates its
//!   own URL-safe transport, and `+` arrives percent-encoded from some
//!   callers. Error positions refer to the rewritten text.
//! - `/` is a division operator only with whitespace on both sides.
//!   Anywhere else it is an ordinary identifier character, because
//!   identifiers double as filenames (`crcalspec$bd_28d4211_stis_001.fits`,
//!   `/grp/hst/cdbs/file.fits`).

use crate::error::LangError;
use crate::regex;

/// Terminal classes. Doubles as the terminal symbol type of the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Number,
    Ident,
    Str,
    LParen,
    RParen,
    Comma,
    Plus,
    Minus,
    Star,
    Slash,
}

/// One scanned token. `pos` is the byte offset in the rewritten source.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text, without quotes for [`TokenKind::Str`].
    pub text: String,
    /// Parsed payload for [`TokenKind::Number`].
    pub value: Option<f64>,
    pub pos: usize,
}

impl Token {
    fn simple(kind: TokenKind, text: &str, pos: usize) -> Token {
        Token { kind, text: text.to_string(), value: None, pos }
    }
}

/// Rewrite transport escapes. Applied once, before scanning.
pub fn rewrite(src: &str) -> String {
    src.replace("%2b", "+")
}

/// Scan a (rewritten) source string into tokens.
pub fn scan(src: &str) -> Result<Vec<Token>, LangError> {
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < src.len() {
        let rest = &src[i..];

        // Division before whitespace skipping, so ` / ` never becomes an
        // identifier.
        if let Some(caps) = regex!(r"^(\s+)/\s+").captures(rest) {
            tokens.push(Token::simple(TokenKind::Slash, "/", i + caps[1].len()));
            i += caps[0].len();
            continue;
        }
        if let Some(m) = regex!(r"^\s+").find(rest) {
            i += m.end();
            continue;
        }
        if let Some(m) = regex!(r"^((\d*\.\d+)|(\d+\.\d*)|(\d+))([eE][-+]?\d+)?").find(rest) {
            let text = m.as_str();
            let value = text.parse::<f64>().map_err(|_| LangError::Lex { position: i })?;
            tokens.push(Token {
                kind: TokenKind::Number,
                text: text.to_string(),
                value: Some(value),
                pos: i,
            });
            i += m.end();
            continue;
        }
        if let Some(caps) = regex!(r#"^'([^']*)'|^"([^"]*)""#).captures(rest) {
            let inner = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
            tokens.push(Token::simple(TokenKind::Str, inner, i));
            i += caps[0].len();
            continue;
        }
        if let Some(m) = regex!(r"^[$a-zA-Z_/][\w/.$:#]*").find(rest) {
            tokens.push(Token::simple(TokenKind::Ident, m.as_str(), i));
            i += m.end();
            continue;
        }

        let kind = match rest.as_bytes()[0] {
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b',' => TokenKind::Comma,
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Star,
            _ => return Err(LangError::Lex { position: i }),
        };
        tokens.push(Token::simple(kind, &rest[..1], i));
        i += 1;
    }

    Ok(tokens)
}
