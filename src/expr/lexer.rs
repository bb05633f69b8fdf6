//! Tokenizer for formula expressions.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};

/// Maximum accepted expression length in characters.
pub const MAX_EXPRESSION_LENGTH: usize = 1000;

/// A lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A numeric literal.
    Number(Decimal),
    /// An identifier or keyword.
    Ident(String),
    /// A double-quoted string literal.
    Str(String),
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `=`
    Eq,
    /// `,`
    Comma,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// End of input.
    Eof,
}

/// A token with the character position it started at.
#[derive(Debug, Clone)]
pub struct Spanned {
    /// The token.
    pub token: Token,
    /// Zero-based character offset into the expression.
    pub pos: usize,
}

fn syntax_error(formula_code: &str, pos: usize, message: impl Into<String>) -> EngineError {
    EngineError::ExpressionSyntax {
        formula_code: formula_code.to_string(),
        message: format!("{} at position {}", message.into(), pos),
    }
}

/// Tokenizes a formula expression.
///
/// `formula_code` labels any syntax error with the formula it came from.
pub fn lex(src: &str, formula_code: &str) -> EngineResult<Vec<Spanned>> {
    let chars: Vec<char> = src.chars().collect();
    if chars.len() > MAX_EXPRESSION_LENGTH {
        return Err(EngineError::ExpressionSyntax {
            formula_code: formula_code.to_string(),
            message: format!(
                "expression is {} characters, maximum is {}",
                chars.len(),
                MAX_EXPRESSION_LENGTH
            ),
        });
    }

    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        let start = pos;
        let c = chars[pos];
        match c {
            ' ' | '\t' | '\n' | '\r' => {
                pos += 1;
            }
            '+' => {
                tokens.push(Spanned { token: Token::Plus, pos: start });
                pos += 1;
            }
            '-' => {
                tokens.push(Spanned { token: Token::Minus, pos: start });
                pos += 1;
            }
            '*' => {
                tokens.push(Spanned { token: Token::Star, pos: start });
                pos += 1;
            }
            '/' => {
                tokens.push(Spanned { token: Token::Slash, pos: start });
                pos += 1;
            }
            '%' => {
                tokens.push(Spanned { token: Token::Percent, pos: start });
                pos += 1;
            }
            '=' => {
                tokens.push(Spanned { token: Token::Eq, pos: start });
                pos += 1;
            }
            ',' => {
                tokens.push(Spanned { token: Token::Comma, pos: start });
                pos += 1;
            }
            '(' => {
                tokens.push(Spanned { token: Token::LParen, pos: start });
                pos += 1;
            }
            ')' => {
                tokens.push(Spanned { token: Token::RParen, pos: start });
                pos += 1;
            }
            '[' => {
                tokens.push(Spanned { token: Token::LBracket, pos: start });
                pos += 1;
            }
            ']' => {
                tokens.push(Spanned { token: Token::RBracket, pos: start });
                pos += 1;
            }
            '"' => {
                pos += 1;
                let mut value = String::new();
                loop {
                    if pos >= chars.len() {
                        return Err(syntax_error(
                            formula_code,
                            start,
                            "unterminated string literal",
                        ));
                    }
                    if chars[pos] == '"' {
                        pos += 1;
                        break;
                    }
                    value.push(chars[pos]);
                    pos += 1;
                }
                tokens.push(Spanned { token: Token::Str(value), pos: start });
            }
            c if c.is_ascii_digit() => {
                let mut literal = String::new();
                while pos < chars.len() && chars[pos].is_ascii_digit() {
                    literal.push(chars[pos]);
                    pos += 1;
                }
                if pos + 1 < chars.len() && chars[pos] == '.' && chars[pos + 1].is_ascii_digit() {
                    literal.push('.');
                    pos += 1;
                    while pos < chars.len() && chars[pos].is_ascii_digit() {
                        literal.push(chars[pos]);
                        pos += 1;
                    }
                }
                let number = Decimal::from_str(&literal).map_err(|_| {
                    syntax_error(formula_code, start, format!("invalid number '{literal}'"))
                })?;
                tokens.push(Spanned { token: Token::Number(number), pos: start });
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut name = String::new();
                while pos < chars.len()
                    && (chars[pos].is_ascii_alphanumeric() || chars[pos] == '_')
                {
                    name.push(chars[pos]);
                    pos += 1;
                }
                tokens.push(Spanned { token: Token::Ident(name), pos: start });
            }
            other => {
                return Err(syntax_error(
                    formula_code,
                    start,
                    format!("unexpected character '{other}'"),
                ));
            }
        }
    }

    tokens.push(Spanned { token: Token::Eof, pos });
    Ok(tokens)
}
