//! Label selector parsing and matching
//!
//! Implements the set-based Kubernetes selector grammar accepted by
//! `kubectl -l` and `ListParams::labels`:
//!
//! ```text
//! selector    := "" | requirement ("," requirement)*
//! requirement := "!" key | key | key op value | key set-op "(" values ")"
//! op          := "=" | "==" | "!=" | ">" | "<"
//! set-op      := "in" | "notin"
//! ```
//!
//! A parsed selector renders back to a canonical string (requirements sorted
//! by key, set values sorted), which is what gets sent to the API server.

use crate::validation::{validate_label_value, validate_qualified_name};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced while parsing a label selector
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SelectorError {
    /// Grammar violation
    #[error("unable to parse requirement: found '{found}', expected: {expected}")]
    Syntax { found: String, expected: String },

    /// Key is not a qualified name
    #[error("invalid label key \"{key}\": {reason}")]
    InvalidKey { key: String, reason: String },

    /// Value is not a valid label value
    #[error("invalid label value: \"{value}\": {reason}")]
    InvalidValue { value: String, reason: String },

    /// `>` / `<` used with a non-integer value
    #[error("for 'Gt', 'Lt' operators, the value must be an integer, got \"{0}\"")]
    InvalidNumber(String),
}

/// Selector operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Exists,
    DoesNotExist,
    Equals,
    DoubleEquals,
    NotEquals,
    In,
    NotIn,
    GreaterThan,
    LessThan,
}

/// A single `key op values` clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    key: String,
    operator: Operator,
    values: BTreeSet<String>,
}

impl Requirement {
    /// Builds a validated requirement.
    pub fn new(
        key: impl Into<String>,
        operator: Operator,
        values: impl IntoIterator<Item = String>,
    ) -> Result<Self, SelectorError> {
        let key = key.into();
        validate_qualified_name(&key).map_err(|e| SelectorError::InvalidKey {
            key: key.clone(),
            reason: e.to_string(),
        })?;

        let values: BTreeSet<String> = values.into_iter().collect();
        match operator {
            Operator::GreaterThan | Operator::LessThan => {
                for v in &values {
                    v.parse::<i64>()
                        .map_err(|_| SelectorError::InvalidNumber(v.clone()))?;
                }
            }
            _ => {
                for v in &values {
                    validate_label_value(v).map_err(|e| SelectorError::InvalidValue {
                        value: v.clone(),
                        reason: e.to_string(),
                    })?;
                }
            }
        }

        Ok(Self { key, operator, values })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }

    /// Whether `labels` satisfy this requirement.
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        let value = labels.get(&self.key);
        match self.operator {
            Operator::Exists => value.is_some(),
            Operator::DoesNotExist => value.is_none(),
            Operator::Equals | Operator::DoubleEquals | Operator::In => {
                value.is_some_and(|v| self.values.contains(v))
            }
            Operator::NotEquals | Operator::NotIn => {
                value.is_none_or(|v| !self.values.contains(v))
            }
            Operator::GreaterThan | Operator::LessThan => {
                let Some(actual) = value.and_then(|v| v.parse::<i64>().ok()) else {
                    return false;
                };
                self.values
                    .iter()
                    .filter_map(|v| v.parse::<i64>().ok())
                    .all(|bound| match self.operator {
                        Operator::GreaterThan => actual > bound,
                        _ => actual < bound,
                    })
            }
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let single = || self.values.iter().next().map(String::as_str).unwrap_or("");
        let set = || self.values.iter().cloned().collect::<Vec<_>>().join(",");
        match self.operator {
            Operator::Exists => write!(f, "{}", self.key),
            Operator::DoesNotExist => write!(f, "!{}", self.key),
            Operator::Equals => write!(f, "{}={}", self.key, single()),
            Operator::DoubleEquals => write!(f, "{}=={}", self.key, single()),
            Operator::NotEquals => write!(f, "{}!={}", self.key, single()),
            Operator::GreaterThan => write!(f, "{}>{}", self.key, single()),
            Operator::LessThan => write!(f, "{}<{}", self.key, single()),
            Operator::In => write!(f, "{} in ({})", self.key, set()),
            Operator::NotIn => write!(f, "{} notin ({})", self.key, set()),
        }
    }
}

/// Conjunction of requirements; empty matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSelector {
    requirements: Vec<Requirement>,
}

impl LabelSelector {
    /// Selector that matches every object.
    pub fn everything() -> Self {
        Self::default()
    }

    /// Parses the selector grammar. Empty input yields `everything()`.
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let tokens = lex(input);
        let mut parser = Parser { tokens, pos: 0 };
        let mut requirements = parser.parse()?;
        requirements.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(Self { requirements })
    }

    pub fn is_everything(&self) -> bool {
        self.requirements.is_empty()
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    /// Whether `labels` satisfy every requirement.
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.requirements.iter().all(|r| r.matches(labels))
    }
}

impl fmt::Display for LabelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.requirements.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join(","))
    }
}

impl FromStr for LabelSelector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Identifier(String),
    Bang,
    Equals,
    DoubleEquals,
    NotEquals,
    GreaterThan,
    LessThan,
    In,
    NotIn,
    OpenPar,
    ClosedPar,
    Comma,
    End,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Identifier(s) => write!(f, "{}", s),
            Token::Bang => write!(f, "!"),
            Token::Equals => write!(f, "="),
            Token::DoubleEquals => write!(f, "=="),
            Token::NotEquals => write!(f, "!="),
            Token::GreaterThan => write!(f, ">"),
            Token::LessThan => write!(f, "<"),
            Token::In => write!(f, "in"),
            Token::NotIn => write!(f, "notin"),
            Token::OpenPar => write!(f, "("),
            Token::ClosedPar => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::End => write!(f, "end of string"),
        }
    }
}

fn is_special(c: char) -> bool {
    matches!(c, '!' | '=' | '>' | '<' | '(' | ')' | ',')
}

fn lex(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        if is_special(c) {
            chars.next();
            let token = match c {
                '!' if chars.peek() == Some(&'=') => {
                    chars.next();
                    Token::NotEquals
                }
                '!' => Token::Bang,
                '=' if chars.peek() == Some(&'=') => {
                    chars.next();
                    Token::DoubleEquals
                }
                '=' => Token::Equals,
                '>' => Token::GreaterThan,
                '<' => Token::LessThan,
                '(' => Token::OpenPar,
                ')' => Token::ClosedPar,
                _ => Token::Comma,
            };
            tokens.push(token);
            continue;
        }

        let mut ident = String::new();
        while let Some(&c) = chars.peek() {
            if c.is_whitespace() || is_special(c) {
                break;
            }
            ident.push(c);
            chars.next();
        }
        tokens.push(match ident.as_str() {
            "in" => Token::In,
            "notin" => Token::NotIn,
            _ => Token::Identifier(ident),
        });
    }

    tokens.push(Token::End);
    tokens
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::End)
    }

    fn consume(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn syntax(found: &Token, expected: &str) -> SelectorError {
        SelectorError::Syntax {
            found: found.to_string(),
            expected: expected.to_string(),
        }
    }

    fn parse(&mut self) -> Result<Vec<Requirement>, SelectorError> {
        let mut requirements = Vec::new();
        if *self.peek() == Token::End {
            return Ok(requirements);
        }

        loop {
            requirements.push(self.parse_requirement()?);
            match self.consume() {
                Token::Comma => {
                    if *self.peek() == Token::End {
                        return Err(Self::syntax(&Token::End, "identifier after ','"));
                    }
                }
                Token::End => return Ok(requirements),
                other => return Err(Self::syntax(&other, "',' or 'end of string'")),
            }
        }
    }

    fn parse_requirement(&mut self) -> Result<Requirement, SelectorError> {
        let mut token = self.consume();
        let negated = token == Token::Bang;
        if negated {
            token = self.consume();
        }

        let key = match token {
            Token::Identifier(key) => key,
            other => return Err(Self::syntax(&other, "!, identifier, or 'end of string'")),
        };

        if matches!(self.peek(), Token::End | Token::Comma) {
            let operator = if negated {
                Operator::DoesNotExist
            } else {
                Operator::Exists
            };
            return Requirement::new(key, operator, Vec::new());
        }
        if negated {
            return Err(Self::syntax(self.peek(), "',' or 'end of string'"));
        }

        let operator = match self.consume() {
            Token::In => Operator::In,
            Token::NotIn => Operator::NotIn,
            Token::Equals => Operator::Equals,
            Token::DoubleEquals => Operator::DoubleEquals,
            Token::NotEquals => Operator::NotEquals,
            Token::GreaterThan => Operator::GreaterThan,
            Token::LessThan => Operator::LessThan,
            other => return Err(Self::syntax(&other, "in, notin, =, ==, !=, gt, lt")),
        };

        let values = match operator {
            Operator::In | Operator::NotIn => self.parse_value_set()?,
            _ => vec![self.parse_exact_value()?],
        };

        Requirement::new(key, operator, values)
    }

    fn parse_exact_value(&mut self) -> Result<String, SelectorError> {
        if matches!(self.peek(), Token::End | Token::Comma) {
            return Ok(String::new());
        }
        match self.consume() {
            Token::Identifier(value) => Ok(value),
            other => Err(Self::syntax(&other, "identifier")),
        }
    }

    fn parse_value_set(&mut self) -> Result<Vec<String>, SelectorError> {
        match self.consume() {
            Token::OpenPar => {}
            other => return Err(Self::syntax(&other, "(")),
        }

        let mut values = Vec::new();
        loop {
            // "(a,,b)" and "()" carry empty values
            if let Token::Identifier(value) = self.peek() {
                let value = value.clone();
                self.consume();
                values.push(value);
            } else {
                values.push(String::new());
            }

            match self.consume() {
                Token::Comma => continue,
                Token::ClosedPar => return Ok(values),
                other => return Err(Self::syntax(&other, "',' or ')'")),
            }
        }
    }
}
