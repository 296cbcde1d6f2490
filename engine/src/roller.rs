//! Free-form polyhedral dice roller: `"2d6 + 1d4 - 1"`, `"d20"`, `"4d6"`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Dice;

/// Dice the roller knows about.
pub const POLYHEDRAL_FACES: [u32; 7] = [4, 6, 8, 10, 12, 20, 100];
/// Largest dice count accepted in one term, here and in damage expressions.
pub const MAX_DICE_PER_TERM: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RollerError {
    #[error("empty dice notation")]
    Empty,
    #[error("invalid dice term '{0}'")]
    InvalidTerm(String),
    #[error("unsupported die d{0} (expected d4, d6, d8, d10, d12, d20 or d100)")]
    UnsupportedDie(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceTerm {
    pub count: u32,
    pub faces: u32,
    pub negative: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DicePool {
    pub terms: Vec<DiceTerm>,
    pub modifier: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRoll {
    pub faces: u32,
    pub negative: bool,
    pub rolls: Vec<u32>,
    pub subtotal: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolRoll {
    pub groups: Vec<GroupRoll>,
    pub modifier: i32,
    pub total: i32,
}

impl DicePool {
    pub fn roll(&self, dice: &mut Dice) -> PoolRoll {
        let groups: Vec<GroupRoll> = self
            .terms
            .iter()
            .map(|term| {
                let rolls: Vec<u32> = (0..term.count).map(|_| dice.roll(term.faces)).collect();
                let sum = rolls.iter().sum::<u32>() as i32;
                GroupRoll {
                    faces: term.faces,
                    negative: term.negative,
                    rolls,
                    subtotal: if term.negative { -sum } else { sum },
                }
            })
            .collect();
        let total = groups.iter().map(|g| g.subtotal).sum::<i32>() + self.modifier;
        PoolRoll { groups, modifier: self.modifier, total }
    }

    pub fn min(&self) -> i32 {
        self.bound(|t| t.count as i32, |t| (t.count * t.faces) as i32)
    }

    pub fn max(&self) -> i32 {
        self.bound(|t| (t.count * t.faces) as i32, |t| t.count as i32)
    }

    fn bound(
        &self,
        positive: impl Fn(&DiceTerm) -> i32,
        negative: impl Fn(&DiceTerm) -> i32,
    ) -> i32 {
        self.terms
            .iter()
            .map(|t| if t.negative { -negative(t) } else { positive(t) })
            .sum::<i32>()
            + self.modifier
    }
}

impl FromStr for DicePool {
    type Err = RollerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        if compact.is_empty() {
            return Err(RollerError::Empty);
        }

        let mut pool = DicePool::default();
        for (negative, body) in signed_terms(&compact) {
            match body.split_once('d') {
                Some((count, faces)) => {
                    let count: u32 = if count.is_empty() {
                        1
                    } else {
                        count.parse().map_err(|_| RollerError::InvalidTerm(body.to_string()))?
                    };
                    let faces: u32 =
                        faces.parse().map_err(|_| RollerError::InvalidTerm(body.to_string()))?;
                    if count == 0 || count > MAX_DICE_PER_TERM {
                        return Err(RollerError::InvalidTerm(body.to_string()));
                    }
                    if !POLYHEDRAL_FACES.contains(&faces) {
                        return Err(RollerError::UnsupportedDie(faces));
                    }
                    pool.terms.push(DiceTerm { count, faces, negative });
                }
                None => {
                    let value: i32 =
                        body.parse().map_err(|_| RollerError::InvalidTerm(body.to_string()))?;
                    pool.modifier += if negative { -value } else { value };
                }
            }
        }
        Ok(pool)
    }
}

/// Splits `2d6+1d4-1` into `(false, "2d6"), (false, "1d4"), (true, "1")`.
fn signed_terms(compact: &str) -> Vec<(bool, &str)> {
    let mut terms = Vec::new();
    let mut negative = false;
    let mut start = 0;
    for (i, c) in compact.char_indices() {
        if c == '+' || c == '-' {
            if i > 0 {
                terms.push((negative, &compact[start..i]));
            }
            negative = c == '-';
            start = i + 1;
        }
    }
    terms.push((negative, &compact[start..]));
    terms
}

impl fmt::Display for DicePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, term) in self.terms.iter().enumerate() {
            match (i, term.negative) {
                (0, true) => write!(f, "-")?,
                (0, false) => {}
                (_, true) => write!(f, " - ")?,
                (_, false) => write!(f, " + ")?,
            }
            write!(f, "{}d{}", term.count, term.faces)?;
        }
        match (self.terms.is_empty(), self.modifier) {
            (true, m) => write!(f, "{}", m),
            (false, 0) => Ok(()),
            (false, m) if m < 0 => write!(f, " - {}", -m),
            (false, m) => write!(f, " + {}", m),
        }
    }
}

/// Parse `notation` and roll it.
pub fn roll_notation(dice: &mut Dice, notation: &str) -> Result<PoolRoll, RollerError> {
    let pool: DicePool = notation.parse()?;
    Ok(pool.roll(dice))
}
