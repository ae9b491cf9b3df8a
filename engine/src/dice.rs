//! Dice rolling with an explicit random/average mode.
//!
//! Every roll in the engine goes through [`Dice::roll_or_average`], so a
//! [`Dice`] built with [`Dice::average`] makes the whole engine deterministic.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiceMode {
    #[default]
    Random,
    Average,
}

pub struct Dice {
    rng: ChaCha8Rng,
    mode: DiceMode,
    scripted: VecDeque<u32>,
}

impl Dice {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            mode: DiceMode::Random,
            scripted: VecDeque::new(),
        }
    }

    /// Every die contributes `sides / 2`.
    pub fn average() -> Self {
        Self::from_seed(0).with_mode(DiceMode::Average)
    }

    /// Replays the given faces in order, then falls back to a fixed seed.
    pub fn from_scripted(faces: Vec<u32>) -> Self {
        let mut dice = Self::from_seed(0);
        dice.scripted = faces.into();
        dice
    }

    pub fn with_mode(mut self, mode: DiceMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> DiceMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: DiceMode) {
        self.mode = mode;
    }

    fn face(&mut self, sides: u32) -> u32 {
        if let Some(face) = self.scripted.pop_front() {
            return face.clamp(1, sides.max(1));
        }
        self.rng.gen_range(1..=sides.max(1))
    }

    /// Sum of `count` dice of `sides` faces plus `bonus`, or the average
    /// substitute `count * sides / 2 + bonus` (not rounded).
    pub fn roll_or_average(&mut self, count: u32, sides: u32, bonus: i32) -> f64 {
        let dice_total = match self.mode {
            DiceMode::Average => f64::from(count) * f64::from(sides) / 2.0,
            DiceMode::Random => (0..count).map(|_| f64::from(self.face(sides))).sum(),
        };
        let total = dice_total + f64::from(bonus);
        debug!(count, sides, bonus, mode = ?self.mode, total, "roll");
        total
    }

    pub fn roll(&mut self, expr: DiceRoll) -> f64 {
        self.roll_or_average(expr.count, expr.sides, expr.bonus)
    }
}

/// A dice expression such as `2d6+3`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRoll {
    pub count: u32,
    pub sides: u32,
    #[serde(default)]
    pub bonus: i32,
}

impl DiceRoll {
    pub fn new(count: u32, sides: u32, bonus: i32) -> Self {
        Self { count, sides, bonus }
    }
}

impl fmt::Display for DiceRoll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)?;
        match self.bonus {
            0 => Ok(()),
            b => write!(f, "{:+}", b),
        }
    }
}

impl FromStr for DiceRoll {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        let (count, rest) = lowered
            .split_once('d')
            .ok_or_else(|| format!("missing 'd' in dice notation: {}", s))?;
        let count: u32 = if count.is_empty() {
            1
        } else {
            count.parse().map_err(|_| format!("invalid dice count: {}", count))?
        };
        let (sides, bonus) = match rest.find(['+', '-']) {
            Some(pos) => {
                let bonus: i32 = rest[pos..]
                    .trim_start_matches('+')
                    .parse()
                    .map_err(|_| format!("invalid bonus: {}", &rest[pos..]))?;
                (&rest[..pos], bonus)
            }
            None => (rest, 0),
        };
        let sides: u32 = sides.parse().map_err(|_| format!("invalid die sides: {}", sides))?;
        if count == 0 || sides == 0 {
            return Err("dice must be at least 1d1".to_string());
        }
        Ok(Self { count, sides, bonus })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        let roll: DiceRoll = "2d6+3".parse().unwrap();
        assert_eq!(roll, DiceRoll::new(2, 6, 3));
        assert_eq!(roll.to_string(), "2d6+3");
        assert_eq!("d8".parse::<DiceRoll>().unwrap(), DiceRoll::new(1, 8, 0));
        assert_eq!("1d4-1".parse::<DiceRoll>().unwrap().to_string(), "1d4-1");
        assert!("0d6".parse::<DiceRoll>().is_err());
        assert!("2x6".parse::<DiceRoll>().is_err());
    }

    #[test]
    fn scripted_faces_are_clamped_to_die() {
        let mut dice = Dice::from_scripted(vec![9, 0]);
        assert_eq!(dice.roll_or_average(2, 6, 0), 7.0);
    }
}
