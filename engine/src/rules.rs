//! Balance values the engine reads but never decides.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::inventory::{ArmorType, WeaponKind};
use crate::race::Race;
use crate::stats::StatBlock;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmorRule {
    pub strength_requirement: i32,
    pub ac_modifier: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    pub stat_floor: i32,
    pub stat_ceiling: i32,
    pub high_stat: i32,
    pub mid_stat: i32,
    pub low_stat: i32,
    pub base_ac: i32,
    pub shield_ac: i32,
    pub level_up_points: u32,
    /// Indexed by the (non-negative) strength modifier.
    pub hit_dice: Vec<u32>,
    pub fallback_hit_die: u32,
    pub armor: IndexMap<ArmorType, ArmorRule>,
    pub weapon_dice: IndexMap<WeaponKind, u32>,
    /// Damage die for a weapon kind missing from `weapon_dice`.
    pub fallback_weapon_die: u32,
    pub attack_die: u32,
    pub sneak_attack_die: u32,
    pub enchantment_min: i32,
    pub enchantment_max: i32,
    /// Refuse a two-handed weapon while both hands are full instead of
    /// evicting both.
    pub strict_hand_swap: bool,
    pub races: IndexMap<String, Race>,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            stat_floor: 0,
            stat_ceiling: 30,
            high_stat: 16,
            mid_stat: 10,
            low_stat: 6,
            base_ac: 13,
            shield_ac: 2,
            level_up_points: 2,
            hit_dice: vec![6, 8, 10, 12],
            fallback_hit_die: 12,
            armor: IndexMap::from([
                (
                    ArmorType::Light,
                    ArmorRule {
                        strength_requirement: 0,
                        ac_modifier: 1,
                    },
                ),
                (
                    ArmorType::Medium,
                    ArmorRule {
                        strength_requirement: 10,
                        ac_modifier: 3,
                    },
                ),
                (
                    ArmorType::Heavy,
                    ArmorRule {
                        strength_requirement: 16,
                        ac_modifier: 5,
                    },
                ),
            ]),
            weapon_dice: IndexMap::from([
                (WeaponKind::OneHand, 8),
                (WeaponKind::TwoHand, 12),
                (WeaponKind::Finesse, 6),
                (WeaponKind::Ranged, 8),
                (WeaponKind::Staff, 6),
            ]),
            fallback_weapon_die: 4,
            attack_die: 20,
            sneak_attack_die: 6,
            enchantment_min: -3,
            enchantment_max: 3,
            strict_hand_swap: false,
            races: default_races(),
        }
    }
}

fn default_races() -> IndexMap<String, Race> {
    [
        Race::new("human", StatBlock::default(), 2),
        Race::new("elf", StatBlock::new(0, 2, 0), 0),
        Race::new("dwarf", StatBlock::new(2, 0, 0), 0),
        Race::new("gnome", StatBlock::new(0, 0, 2), 0),
        Race::new("halfling", StatBlock::new(0, 1, 0), 1),
    ]
    .into_iter()
    .map(|race| (race.name.clone(), race))
    .collect()
}

impl Rules {
    pub fn armor_rule(&self, armor: ArmorType) -> ArmorRule {
        self.armor.get(&armor).copied().unwrap_or_default()
    }

    pub fn weapon_die(&self, kind: WeaponKind) -> u32 {
        self.weapon_dice.get(&kind).copied().unwrap_or(self.fallback_weapon_die)
    }

    /// Hit die for a strength modifier; past the table the fallback applies.
    pub fn hit_die(&self, str_mod: i32) -> u32 {
        usize::try_from(str_mod.max(0))
            .ok()
            .and_then(|idx| self.hit_dice.get(idx).copied())
            .unwrap_or(self.fallback_hit_die)
    }

    pub fn race(&self, name: &str) -> Option<&Race> {
        self.races
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, race)| race)
    }
}

/// Load rules from a YAML file (or JSON when the extension says so).
pub fn load_rules(path: impl AsRef<Path>) -> Result<Rules> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read rules: {}", path.display()))?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let rules = if is_json {
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse rules JSON: {}", path.display()))?
    } else {
        serde_yaml::from_str(&text)
            .with_context(|| format!("failed to parse rules YAML: {}", path.display()))?
    };
    Ok(rules)
}
