use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::character::Character;
use crate::error::{Result, SheetError};
use crate::inventory::Inventory;
use crate::observer::Observers;
use crate::resources::Resources;
use crate::rules::Rules;
use crate::stats::{Stat, StatBlock, StatOverrides, StatSelection};

pub const SNAPSHOT_VERSION: u32 = 1;

/// Everything needed to rebuild a character, minus its listeners.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Snapshot {
    pub version: u32,
    pub name: String,
    pub selection: StatSelection,
    #[serde(default)]
    pub race: Option<String>,
    #[serde(default)]
    pub racial_choices: Vec<Stat>,
    pub base_stats: StatBlock,
    pub level: u32,
    pub hp: f64,
    pub hp_rolls: Vec<f64>,
    #[serde(default)]
    pub level_up_choices: Vec<Stat>,
    #[serde(default)]
    pub pending_level_up_points: u32,
    #[serde(default)]
    pub use_stat_overrides: bool,
    #[serde(default)]
    pub stat_modifiers: StatBlock,
    pub resources: Resources,
    #[serde(default)]
    pub inventory: Inventory,
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    fn validate(&self, rules: &Rules) -> Result<(), String> {
        if self.version != SNAPSHOT_VERSION {
            return Err(format!("unsupported version {}", self.version));
        }
        if self.level == 0 {
            return Err("level must be at least 1".to_string());
        }
        if self.hp_rolls.len() != self.level as usize {
            return Err(format!(
                "{} hp rolls recorded for level {}",
                self.hp_rolls.len(),
                self.level
            ));
        }
        if self.pending_level_up_points > rules.level_up_points {
            return Err(format!(
                "{} pending points exceed the per-level budget",
                self.pending_level_up_points
            ));
        }
        let bounds = rules.stat_floor..=rules.stat_ceiling;
        for stat in Stat::ALL {
            let base = self.base_stats.get(stat);
            if !bounds.contains(&base) {
                return Err(format!("base {} {} out of bounds", stat, base));
            }
            let overridden = base.checked_add(self.stat_modifiers.get(stat));
            if !overridden.is_some_and(|v| bounds.contains(&v)) {
                return Err(format!("{} override leaves the stat bounds", stat));
            }
        }
        self.resources.validate()?;
        self.inventory.validate(rules)?;
        Ok(())
    }
}

impl Character {
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION,
            name: self.name.clone(),
            selection: self.selection,
            race: self.race.clone(),
            racial_choices: self.racial_choices.clone(),
            base_stats: self.base,
            level: self.level,
            hp: self.hp,
            hp_rolls: self.hp_rolls.clone(),
            level_up_choices: self.level_up_choices.clone(),
            pending_level_up_points: self.pending_level_up_points,
            use_stat_overrides: self.overrides.enabled,
            stat_modifiers: self.overrides.deltas,
            resources: self.resources,
            inventory: self.inventory.clone(),
        }
    }

    /// Rebuild a character, refusing snapshots that break sheet invariants.
    pub fn from_snapshot(snapshot: Snapshot, rules: Arc<Rules>) -> Result<Self> {
        snapshot
            .validate(&rules)
            .map_err(SheetError::CorruptSnapshot)?;
        Ok(Self {
            rules,
            name: snapshot.name,
            selection: snapshot.selection,
            race: snapshot.race,
            racial_choices: snapshot.racial_choices,
            base: snapshot.base_stats,
            overrides: StatOverrides {
                enabled: snapshot.use_stat_overrides,
                deltas: snapshot.stat_modifiers,
            },
            level: snapshot.level,
            hp: snapshot.hp,
            hp_rolls: snapshot.hp_rolls,
            level_up_choices: snapshot.level_up_choices,
            pending_level_up_points: snapshot.pending_level_up_points,
            resources: snapshot.resources,
            inventory: snapshot.inventory,
            observers: Observers::default(),
        })
    }

    pub fn to_json(&self) -> Result<String> {
        self.snapshot().to_json_pretty()
    }

    pub fn from_json(text: &str, rules: Arc<Rules>) -> Result<Self> {
        Self::from_snapshot(Snapshot::from_json(text)?, rules)
    }
}
