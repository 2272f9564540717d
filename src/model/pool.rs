use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub const POOL_MIN: u8 = 1;
pub const POOL_MAX: u8 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    Horizontal,
    Vertical,
}

impl Direction {
    pub fn letter(self) -> char {
        match self {
            Direction::Horizontal => 'H',
            Direction::Vertical => 'V',
        }
    }

    pub fn from_letter(c: char) -> Option<Direction> {
        match c {
            'H' => Some(Direction::Horizontal),
            'V' => Some(Direction::Vertical),
            _ => None,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("bad pool name: {0}")]
pub struct InvalidPoolLabel(pub String);

/// `H1`..`H12` or `V1`..`V12`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PoolLabel {
    direction: Direction,
    number: u8,
}

impl PoolLabel {
    pub fn new(direction: Direction, number: u8) -> Option<PoolLabel> {
        if (POOL_MIN..=POOL_MAX).contains(&number) {
            Some(PoolLabel { direction, number })
        } else {
            None
        }
    }

    pub fn direction(self) -> Direction {
        self.direction
    }

    /// Every label of one direction, in numeric order.
    pub fn all(direction: Direction) -> impl Iterator<Item = PoolLabel> {
        (POOL_MIN..=POOL_MAX).map(move |number| PoolLabel { direction, number })
    }
}

impl FromStr for PoolLabel {
    type Err = InvalidPoolLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidPoolLabel(s.to_string());
        let mut chars = s.chars();
        let direction = chars
            .next()
            .and_then(Direction::from_letter)
            .ok_or_else(invalid)?;
        let digits = chars.as_str();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if digits.starts_with('0') {
            return Err(invalid());
        }
        let number: u8 = digits.parse().map_err(|_| invalid())?;
        PoolLabel::new(direction, number).ok_or_else(invalid)
    }
}

impl fmt::Display for PoolLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.direction.letter(), self.number)
    }
}

/// Last token of a file base name (split on `_` or `-`) that is a valid pool label.
pub fn find_pool_label(base: &str) -> Option<PoolLabel> {
    let toks: Vec<&str> = base.split(['_', '-']).collect();
    toks.into_iter()
        .rev()
        .find_map(|tok| tok.parse::<PoolLabel>().ok())
}

pub fn pair_label(horizontal: PoolLabel, vertical: PoolLabel) -> String {
    format!("{} x {}", horizontal, vertical)
}

/// Inverse of [`pair_label`].
pub fn parse_pair(pair: &str) -> Option<(PoolLabel, PoolLabel)> {
    let (h, v) = pair.split_once(" x ")?;
    let h: PoolLabel = h.parse().ok()?;
    let v: PoolLabel = v.parse().ok()?;
    if h.direction() != Direction::Horizontal || v.direction() != Direction::Vertical {
        return None;
    }
    Some((h, v))
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/pool.rs"]
mod tests;
