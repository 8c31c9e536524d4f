//! Parser for the small S-expression query language.
//!
//! ```text
//! expr    := '(' head tail ')'
//! head    := symbol
//! tail    := expr* | atom*
//! atom    := symbol | number | string
//! ```
//!
//! Recognized heads, case-insensitive: `and`, `or`, `eq`, `id`.

use crate::condition::Condition;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    LParen,
    RParen,
    Atom(String),
}

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            '(' => {
                tokens.push(Token::LParen);
                chars.next();
            }
            ')' => {
                tokens.push(Token::RParen);
                chars.next();
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            '"' => {
                chars.next();
                let mut s = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == '"' {
                        closed = true;
                        break;
                    }
                    s.push(c);
                }
                if !closed {
                    return Err(Error::ParseError("unterminated string literal".to_string()));
                }
                tokens.push(Token::Atom(s));
            }
            _ => {
                let mut s = String::new();
                while let Some(&c) = chars.peek() {
                    if c == '(' || c == ')' || c.is_whitespace() {
                        break;
                    }
                    s.push(c);
                    chars.next();
                }
                tokens.push(Token::Atom(s));
            }
        }
    }

    Ok(tokens)
}

/// Parse a textual query into a [`Condition`] tree.
pub fn parse(input: &str) -> Result<Condition> {
    let tokens = tokenize(input)?;
    let mut pos = 0;
    let cond = parse_expr(&tokens, &mut pos)?;
    if pos != tokens.len() {
        return Err(Error::ParseError(format!(
            "trailing input after expression in '{}'",
            input
        )));
    }
    Ok(cond)
}

fn parse_expr(tokens: &[Token], pos: &mut usize) -> Result<Condition> {
    match tokens.get(*pos) {
        Some(Token::LParen) => *pos += 1,
        _ => return Err(Error::ParseError("expected '(' to start expression".to_string())),
    }

    let head = match tokens.get(*pos) {
        Some(Token::Atom(s)) => s.clone(),
        Some(_) => return Err(Error::ParseError("head is not a symbol".to_string())),
        None => return Err(Error::ParseError("unexpected end of input, expected head".to_string())),
    };
    *pos += 1;

    let cond = match head.to_lowercase().as_str() {
        "and" => parse_bool_list(tokens, pos, true)?,
        "or" => parse_bool_list(tokens, pos, false)?,
        "eq" => parse_eq(tokens, pos)?,
        "id" => parse_id(tokens, pos)?,
        other => return Err(Error::ParseError(format!("unknown head '{}'", other))),
    };

    match tokens.get(*pos) {
        Some(Token::RParen) => *pos += 1,
        _ => return Err(Error::ParseError(format!("missing closing ')' for '{}'", head))),
    }

    Ok(cond)
}

fn parse_bool_list(tokens: &[Token], pos: &mut usize, is_and: bool) -> Result<Condition> {
    let name = if is_and { "and" } else { "or" };
    let mut children = Vec::new();
    while let Some(Token::LParen) = tokens.get(*pos) {
        children.push(parse_expr(tokens, pos)?);
    }
    if children.is_empty() {
        return Err(Error::ParseError(format!("empty {} expression", name)));
    }
    Ok(if is_and {
        Condition::And(children)
    } else {
        Condition::Or(children)
    })
}

fn next_atom(tokens: &[Token], pos: &mut usize, what: &str) -> Result<String> {
    match tokens.get(*pos) {
        Some(Token::Atom(s)) => {
            *pos += 1;
            Ok(s.clone())
        }
        Some(_) => Err(Error::ParseError(format!("expected {}, got nested expression", what))),
        None => Err(Error::ParseError(format!("missing {}", what))),
    }
}

fn parse_eq(tokens: &[Token], pos: &mut usize) -> Result<Condition> {
    if matches!(tokens.get(*pos), Some(Token::RParen) | None) {
        return Err(Error::ParseError("missing field and value in eq".to_string()));
    }
    let field = next_atom(tokens, pos, "field name in eq")?;

    if matches!(tokens.get(*pos), Some(Token::RParen) | None) {
        return Err(Error::ParseError(format!("missing value in (eq {}) expression", field)));
    }
    let value = next_atom(tokens, pos, "value in eq")?;

    // tolerate (and ignore) any extra atoms before the closing paren.
    while let Some(Token::Atom(_)) = tokens.get(*pos) {
        *pos += 1;
    }

    Ok(Condition::equals(field, value))
}

fn parse_id(tokens: &[Token], pos: &mut usize) -> Result<Condition> {
    if matches!(tokens.get(*pos), Some(Token::RParen) | None) {
        return Err(Error::ParseError("missing id value in (id) expression".to_string()));
    }
    let id_str = next_atom(tokens, pos, "id")?;
    let id: i64 = id_str
        .parse()
        .map_err(|_| Error::ParseError(format!("couldn't parse numeric id '{}'", id_str)))?;

    while let Some(Token::Atom(_)) = tokens.get(*pos) {
        *pos += 1;
    }

    Ok(Condition::ById(id))
}

#[cfg(test)]
#[path = "expression_test.rs"]
mod expression_test;
