use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Rejection, SheetError};
use crate::rules::Rules;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    Str,
    Dex,
    Int,
}

impl Stat {
    pub const ALL: [Stat; 3] = [Stat::Str, Stat::Dex, Stat::Int];

    pub fn abbreviation(self) -> &'static str {
        match self {
            Stat::Str => "str",
            Stat::Dex => "dex",
            Stat::Int => "int",
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

impl FromStr for Stat {
    type Err = SheetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "str" | "strength" => Ok(Stat::Str),
            "dex" | "dexterity" => Ok(Stat::Dex),
            "int" | "intelligence" => Ok(Stat::Int),
            _ => Err(SheetError::UnknownStat(s.to_string())),
        }
    }
}

/// Either a set of scores or a set of per-stat deltas.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBlock {
    #[serde(rename = "str", default)]
    pub str_: i32,
    #[serde(default)]
    pub dex: i32,
    #[serde(rename = "int", default)]
    pub int_: i32,
}

impl StatBlock {
    pub fn new(str_: i32, dex: i32, int_: i32) -> Self {
        Self { str_, dex, int_ }
    }

    pub fn get(&self, stat: Stat) -> i32 {
        match stat {
            Stat::Str => self.str_,
            Stat::Dex => self.dex,
            Stat::Int => self.int_,
        }
    }

    pub fn set(&mut self, stat: Stat, value: i32) {
        match stat {
            Stat::Str => self.str_ = value,
            Stat::Dex => self.dex = value,
            Stat::Int => self.int_ = value,
        }
    }

    pub fn add(&mut self, stat: Stat, delta: i32) {
        self.set(stat, self.get(stat).saturating_add(delta));
    }

    pub fn plus(self, other: StatBlock) -> StatBlock {
        StatBlock::new(
            self.str_.saturating_add(other.str_),
            self.dex.saturating_add(other.dex),
            self.int_.saturating_add(other.int_),
        )
    }

    pub fn mod_of(&self, stat: Stat) -> i32 {
        modifier(self.get(stat))
    }
}

/// Which stat gets the high score and which the mid score; the third is low.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatSelection {
    pub high: Stat,
    pub mid: Stat,
}

impl StatSelection {
    pub fn new(high: Stat, mid: Stat) -> Self {
        Self { high, mid }
    }

    pub fn base_stats(&self, rules: &Rules) -> Result<StatBlock, Rejection> {
        if self.high == self.mid {
            return Err(Rejection::DuplicateSelection(self.high));
        }
        let mut block = StatBlock::new(rules.low_stat, rules.low_stat, rules.low_stat);
        block.set(self.high, rules.high_stat);
        block.set(self.mid, rules.mid_stat);
        Ok(block)
    }
}

/// Player-set deltas applied on top of base stats while enabled.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatOverrides {
    pub enabled: bool,
    pub deltas: StatBlock,
}

/// D&D style modifier: `floor((score - 10) / 2)`.
pub fn modifier(score: i32) -> i32 {
    (score - 10).div_euclid(2)
}

pub fn clamp_stat(value: i32, rules: &Rules) -> i32 {
    value.clamp(rules.stat_floor, rules.stat_ceiling)
}

/// Delta that actually gets stored when `requested` is asked for on top of
/// `base`: the result never leaves the stat bounds.
pub fn saturated_delta(base: i32, requested: i32, rules: &Rules) -> i32 {
    clamp_stat(base.saturating_add(requested), rules) - base
}

/// Base plus active overrides plus equipment, each component clamped.
pub fn effective_stats(
    base: StatBlock,
    overrides: &StatOverrides,
    equipment: StatBlock,
    rules: &Rules,
) -> StatBlock {
    let mut out = StatBlock::default();
    for stat in Stat::ALL {
        let delta = if overrides.enabled {
            overrides.deltas.get(stat)
        } else {
            0
        };
        let raw = base
            .get(stat)
            .saturating_add(delta)
            .saturating_add(equipment.get(stat));
        let value = clamp_stat(raw, rules);
        if value != raw {
            debug!(%stat, raw, value, "effective stat clamped");
        }
        out.set(stat, value);
    }
    out
}
