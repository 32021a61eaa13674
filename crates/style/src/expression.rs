//! Filter and label expressions.
//!
//! Only the source text is kept. Loading checks that field references
//! (`[name]`) and string literals are properly closed; evaluating the
//! expression against features is left to the renderer.

use crate::parsers::StyleParseError;
use itertools::Itertools;
use nom::branch::alt;
use nom::bytes::complete::{take_while, take_while1};
use nom::character::complete::char;
use nom::combinator::{all_consuming, map, verify};
use nom::multi::many0;
use nom::sequence::delimited;
use nom::{IResult, Parser};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Expression {
    source: String,
}

impl Expression {
    pub fn parse(source: &str) -> Result<Self, StyleParseError> {
        scan(source)?;
        Ok(Self {
            source: source.trim().to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// Field names referenced with `[...]`, in order of first appearance.
    pub fn field_names(&self) -> Vec<String> {
        scan(&self.source)
            .unwrap_or_default()
            .into_iter()
            .unique()
            .collect()
    }
}

/// A `[field]` reference, trimmed.
fn field(input: &str) -> IResult<&str, &str> {
    map(
        delimited(
            char('['),
            verify(take_while1(|c: char| c != '[' && c != ']'), |s: &str| {
                !s.trim().is_empty()
            }),
            char(']'),
        ),
        |name: &str| name.trim(),
    )
    .parse(input)
}

/// A single or double quoted string. Brackets inside are not fields.
fn literal(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('\''), take_while(|c: char| c != '\''), char('\'')),
        delimited(char('"'), take_while(|c: char| c != '"'), char('"')),
    ))
    .parse(input)
}

fn token(input: &str) -> IResult<&str, Option<&str>> {
    alt((
        map(field, Some),
        map(literal, |_| None),
        map(
            take_while1(|c: char| !matches!(c, '[' | ']' | '\'' | '"')),
            |_| None,
        ),
    ))
    .parse(input)
}

/// Explains why scanning stopped at `rest`.
fn failure_reason(rest: &str) -> &'static str {
    let mut chars = rest.chars();
    match chars.next() {
        Some(']') => "unmatched ']'",
        Some('\'' | '"') => "unterminated string literal",
        Some('[') => {
            let inner = chars.as_str();
            match inner.find(|c: char| c == '[' || c == ']') {
                Some(i) if inner[i..].starts_with('[') => "nested '['",
                Some(_) => "empty field reference",
                None => "unterminated field reference",
            }
        }
        _ => "unexpected input",
    }
}

fn scan(source: &str) -> Result<Vec<String>, StyleParseError> {
    match all_consuming(many0(token)).parse(source) {
        Ok((_, tokens)) => Ok(tokens.into_iter().flatten().map(str::to_string).collect()),
        Err(nom::Err::Error(e) | nom::Err::Failure(e)) => Err(StyleParseError::Expression {
            expression: source.to_string(),
            reason: failure_reason(e.input).to_string(),
        }),
        Err(nom::Err::Incomplete(_)) => Err(StyleParseError::Expression {
            expression: source.to_string(),
            reason: "incomplete input".to_string(),
        }),
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl TryFrom<String> for Expression {
    type Error = StyleParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Expression::parse(&value)
    }
}

impl From<Expression> for String {
    fn from(value: Expression) -> Self {
        value.source
    }
}
