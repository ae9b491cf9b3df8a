use serde::{Deserialize, Serialize};

use crate::error::Rejection;
use crate::stats::{Stat, StatBlock};

/// Racial bonuses: fixed deltas plus a number of +1 bonuses the player
/// places on distinct stats of their choice.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Race {
    pub name: String,
    #[serde(default)]
    pub fixed: StatBlock,
    #[serde(default)]
    pub any_choices: usize,
}

impl Race {
    pub fn new(name: &str, fixed: StatBlock, any_choices: usize) -> Self {
        Self {
            name: name.to_string(),
            fixed,
            any_choices,
        }
    }

    /// Fold this race's bonuses into `base`.
    pub fn apply(&self, base: StatBlock, picks: &[Stat]) -> Result<StatBlock, Rejection> {
        if picks.len() != self.any_choices {
            return Err(Rejection::WrongBonusChoiceCount {
                race: self.name.clone(),
                expected: self.any_choices,
                actual: picks.len(),
            });
        }
        let mut out = base.plus(self.fixed);
        for (idx, stat) in picks.iter().enumerate() {
            if picks[..idx].contains(stat) {
                return Err(Rejection::RepeatedBonusChoice(*stat));
            }
            out.add(*stat, 1);
        }
        Ok(out)
    }
}
