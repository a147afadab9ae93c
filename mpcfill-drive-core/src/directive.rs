//! User directives for pairing and repeating cards, and their flag syntax.
//!
//! Both flags use `;` between items and `|` inside an item:
//! - double-sided: `front.png|back.png;front2.png|back2.png`
//! - card multiples: `card.png|3;other.png|2`
//!
//! The multiples syntax is overloaded: `front.png|back.png` there is a pairing, told
//! apart from a count only by whether the right-hand side parses as an integer.

use std::fmt;

use crate::error::ManifestError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardSlotDirective {
    DoubleSided { front: String, back: String },
    Multiple { name: String, count: u32 },
}

impl fmt::Display for CardSlotDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardSlotDirective::DoubleSided { front, back } => write!(f, "{front}|{back}"),
            CardSlotDirective::Multiple { name, count } => write!(f, "{name}|{count}"),
        }
    }
}

/// Parses `front|back;front|back`.
pub fn parse_double_sided(spec: &str) -> Result<Vec<CardSlotDirective>, ManifestError> {
    items(spec)
        .map(|item| {
            let (front, back) = split_pair(item)?;
            Ok(CardSlotDirective::DoubleSided {
                front: front.to_string(),
                back: back.to_string(),
            })
        })
        .collect()
}

/// Parses `name|count;front|back`.
pub fn parse_card_multiples(spec: &str) -> Result<Vec<CardSlotDirective>, ManifestError> {
    items(spec)
        .map(|item| {
            let (name, rhs) = split_pair(item)?;
            match rhs.parse::<i64>() {
                Ok(count) if count >= 1 => Ok(CardSlotDirective::Multiple {
                    name: name.to_string(),
                    count: u32::try_from(count).map_err(|_| invalid(item, "count is too large"))?,
                }),
                Ok(_) => Err(invalid(item, "count must be at least 1")),
                Err(_) => Ok(CardSlotDirective::DoubleSided {
                    front: name.to_string(),
                    back: rhs.to_string(),
                }),
            }
        })
        .collect()
}

fn items(spec: &str) -> impl Iterator<Item = &str> {
    spec.split(';').map(str::trim).filter(|item| !item.is_empty())
}

fn split_pair(item: &str) -> Result<(&str, &str), ManifestError> {
    let (left, right) = item
        .split_once('|')
        .ok_or_else(|| invalid(item, "expected 'left|right'"))?;
    let (left, right) = (left.trim(), right.trim());
    if left.is_empty() || right.is_empty() {
        return Err(invalid(item, "both sides of '|' must be non-empty"));
    }
    if right.contains('|') {
        return Err(invalid(item, "expected exactly one '|'"));
    }
    Ok((left, right))
}

fn invalid(item: &str, reason: &str) -> ManifestError {
    ManifestError::InvalidDirective {
        directive: item.to_string(),
        reason: reason.to_string(),
    }
}
