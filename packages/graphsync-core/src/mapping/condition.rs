//! Rule conditions
//!
//! Small predicate language deciding whether a rule applies to an entity:
//!
//! ```text
//! expr    := and ( "||" and )*
//! and     := unary ( "&&" unary )*
//! unary   := "!" unary | primary
//! primary := "(" expr ")" | "true" | "false" | call [ ("==" | "!=") literal ]
//! call    := allNodes() | allRelationships() | hasLabel('L') | isType('T')
//!          | hasProperty('p') | getProperty('p')
//! ```
//!
//! Only `getProperty` may be compared. Evaluation never fails: a missing
//! property simply makes the comparison false.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use super::template::scalar_to_string;
use crate::config::{ConfigError, ConfigResult};
use crate::domain::{EntityKind, EntitySnapshot};

/// Compiled condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Const(bool),
    Kind(EntityKind),
    HasLabel(String),
    IsType(String),
    HasProperty(String),
    PropertyEquals { name: String, value: String },
    Not(Box<Condition>),
    And(Vec<Condition>),
    Or(Vec<Condition>),
}

impl Condition {
    pub fn parse(expression: &str) -> ConfigResult<Self> {
        let tokens = tokenize(expression).map_err(|reason| invalid(expression, reason))?;
        let mut parser = Parser { tokens, pos: 0 };
        let condition = parser.expr().map_err(|reason| invalid(expression, reason))?;
        if let Some(token) = parser.peek() {
            return Err(invalid(expression, format!("unexpected {}", token)));
        }
        Ok(condition)
    }

    pub fn evaluate(&self, entity: &EntitySnapshot) -> bool {
        match self {
            Condition::Const(value) => *value,
            Condition::Kind(kind) => entity.kind() == *kind,
            Condition::HasLabel(label) => entity.has_label(label),
            Condition::IsType(rel_type) => entity.rel_type() == Some(rel_type.as_str()),
            Condition::HasProperty(name) => entity.has_property(name),
            Condition::PropertyEquals { name, value } => entity
                .property(name)
                .is_some_and(|actual| matches_literal(actual, value)),
            Condition::Not(inner) => !inner.evaluate(entity),
            Condition::And(all) => all.iter().all(|c| c.evaluate(entity)),
            Condition::Or(any) => any.iter().any(|c| c.evaluate(entity)),
        }
    }
}

impl FromStr for Condition {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Condition::parse(s)
    }
}

/// Numbers compare numerically (`1 == 1.0`), everything else by string form
fn matches_literal(actual: &Value, literal: &str) -> bool {
    if let (Value::Number(number), Ok(expected)) = (actual, literal.parse::<f64>()) {
        if let Some(actual) = number.as_f64() {
            return actual == expected;
        }
    }
    scalar_to_string(actual).is_some_and(|actual| actual == literal)
}

fn invalid(expression: &str, reason: String) -> ConfigError {
    ConfigError::InvalidCondition {
        mapper: String::new(),
        expression: expression.to_string(),
        reason,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Literal(String),
    LParen,
    RParen,
    And,
    Or,
    Not,
    Eq,
    NotEq,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(name) => write!(f, "'{}'", name),
            Token::Literal(value) => write!(f, "literal '{}'", value),
            Token::LParen => f.write_str("'('"),
            Token::RParen => f.write_str("')'"),
            Token::And => f.write_str("'&&'"),
            Token::Or => f.write_str("'||'"),
            Token::Not => f.write_str("'!'"),
            Token::Eq => f.write_str("'=='"),
            Token::NotEq => f.write_str("'!='"),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '&' | '|' | '=' => {
                chars.next();
                if chars.next() != Some(c) {
                    return Err(format!("expected '{}{}'", c, c));
                }
                tokens.push(match c {
                    '&' => Token::And,
                    '|' => Token::Or,
                    _ => Token::Eq,
                });
            }
            '!' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::NotEq);
                } else {
                    tokens.push(Token::Not);
                }
            }
            '\'' | '"' => {
                chars.next();
                let mut value = String::new();
                let mut closed = false;
                for next in chars.by_ref() {
                    if next == c {
                        closed = true;
                        break;
                    }
                    value.push(next);
                }
                if !closed {
                    return Err("unterminated string literal".to_string());
                }
                tokens.push(Token::Literal(value));
            }
            c if c.is_ascii_digit() || c == '-' => {
                let mut value = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' || d == '-' {
                        value.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Literal(value));
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_alphanumeric() || d == '_' {
                        ident.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            other => return Err(format!("unexpected character '{}'", other)),
        }
    }

    if tokens.is_empty() {
        return Err("condition is empty".to_string());
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expect(&mut self, expected: Token) -> Result<(), String> {
        match self.next() {
            Some(token) if token == expected => Ok(()),
            Some(token) => Err(format!("expected {}, found {}", expected, token)),
            None => Err(format!("expected {}, found end of expression", expected)),
        }
    }

    fn expr(&mut self) -> Result<Condition, String> {
        let mut terms = vec![self.and()?];
        while self.peek() == Some(&Token::Or) {
            self.next();
            terms.push(self.and()?);
        }
        Ok(if terms.len() == 1 { terms.remove(0) } else { Condition::Or(terms) })
    }

    fn and(&mut self) -> Result<Condition, String> {
        let mut terms = vec![self.unary()?];
        while self.peek() == Some(&Token::And) {
            self.next();
            terms.push(self.unary()?);
        }
        Ok(if terms.len() == 1 { terms.remove(0) } else { Condition::And(terms) })
    }

    fn unary(&mut self) -> Result<Condition, String> {
        if self.peek() == Some(&Token::Not) {
            self.next();
            return Ok(Condition::Not(Box::new(self.unary()?)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Condition, String> {
        match self.next() {
            Some(Token::LParen) => {
                let inner = self.expr()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Some(Token::Ident(name)) => match name.as_str() {
                "true" => Ok(Condition::Const(true)),
                "false" => Ok(Condition::Const(false)),
                _ => self.call(name),
            },
            Some(token) => Err(format!("unexpected {}", token)),
            None => Err("unexpected end of expression".to_string()),
        }
    }

    fn call(&mut self, function: String) -> Result<Condition, String> {
        self.expect(Token::LParen)?;
        let argument = match self.peek() {
            Some(Token::Literal(_)) => match self.next() {
                Some(Token::Literal(value)) => Some(value),
                _ => None,
            },
            _ => None,
        };
        self.expect(Token::RParen)?;

        let require = |argument: Option<String>| {
            argument.ok_or_else(|| format!("{}() requires one quoted argument", function))
        };
        let condition = match function.as_str() {
            "allNodes" | "allRelationships" if argument.is_some() => {
                return Err(format!("{}() takes no arguments", function))
            }
            "allNodes" => Condition::Kind(EntityKind::Node),
            "allRelationships" => Condition::Kind(EntityKind::Relationship),
            "hasLabel" => Condition::HasLabel(require(argument)?),
            "isType" => Condition::IsType(require(argument)?),
            "hasProperty" => Condition::HasProperty(require(argument)?),
            "getProperty" => {
                let name = require(argument)?;
                let negated = match self.next() {
                    Some(Token::Eq) => false,
                    Some(Token::NotEq) => true,
                    _ => return Err("getProperty() must be compared with '==' or '!='".to_string()),
                };
                let value = match self.next() {
                    Some(Token::Literal(value)) => value,
                    Some(Token::Ident(word)) if word == "true" || word == "false" => word,
                    _ => return Err("expected literal after comparison".to_string()),
                };
                let equals = Condition::PropertyEquals { name, value };
                if negated {
                    Condition::Not(Box::new(equals))
                } else {
                    equals
                }
            }
            other => return Err(format!("unknown function '{}'", other)),
        };
        Ok(condition)
    }
}
