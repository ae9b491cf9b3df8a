//! Attack, damage, armor class and hit point queries.
//!
//! Everything is read from the character at call time. With average dice
//! the results are repeatable; with random dice each call rolls afresh.

use serde::Serialize;
use tracing::debug;

use crate::character::Character;
use crate::dice::Dice;
use crate::error::{Rejection, Result};
use crate::inventory::{Item, WeaponKind};
use crate::observer::SheetEvent;
use crate::resources::Pool;
use crate::stats::{self, Stat};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Hand {
    Main,
    Off,
}

/// Result of a sneak-attack style damage roll.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct SneakAttack {
    pub damage: f64,
    pub extra_dice: u32,
    pub spent_point: bool,
}

impl Character {
    fn weapon_in(&self, hand: Hand) -> Option<(&Item, WeaponKind)> {
        let hands = self.inventory.equipped_weapons();
        let item = match hand {
            Hand::Main => hands.main_hand,
            Hand::Off => hands.off_hand,
        }?;
        Some((item, item.weapon_kind()?))
    }

    /// d20 + stat modifier + level + enchantment.
    pub fn main_hand_attack_roll(&self, dice: &mut Dice) -> Option<f64> {
        let (weapon, kind) = self.weapon_in(Hand::Main)?;
        let bonus = self.modifier(kind.governing_stat()) + self.level as i32 + weapon.enchantment;
        let total = dice.roll_or_average(1, self.rules.attack_die, bonus);
        debug!(weapon = %weapon.name, bonus, total, "main-hand attack");
        Some(total)
    }

    /// d20 + stat modifier + enchantment; no level bonus off-hand.
    pub fn off_hand_attack_roll(&self, dice: &mut Dice) -> Option<f64> {
        let (weapon, kind) = self.weapon_in(Hand::Off)?;
        let bonus = self.modifier(kind.governing_stat()) + weapon.enchantment;
        let total = dice.roll_or_average(1, self.rules.attack_die, bonus);
        debug!(weapon = %weapon.name, bonus, total, "off-hand attack");
        Some(total)
    }

    /// Weapon die + stat modifier + enchantment.
    pub fn main_hand_damage_roll(&self, dice: &mut Dice) -> Option<f64> {
        let (weapon, kind) = self.weapon_in(Hand::Main)?;
        let bonus = self.modifier(kind.governing_stat()) + weapon.enchantment;
        let total = dice.roll_or_average(1, self.rules.weapon_die(kind), bonus);
        debug!(weapon = %weapon.name, bonus, total, "main-hand damage");
        Some(total)
    }

    /// Weapon die + enchantment; the off hand adds no stat modifier.
    pub fn off_hand_damage_roll(&self, dice: &mut Dice) -> Option<f64> {
        let (weapon, kind) = self.weapon_in(Hand::Off)?;
        let total = dice.roll_or_average(1, self.rules.weapon_die(kind), weapon.enchantment);
        debug!(weapon = %weapon.name, total, "off-hand damage");
        Some(total)
    }

    pub fn armor_class(&self) -> i32 {
        let rules = &self.rules;
        let dex_mod = stats::modifier(self.effective_stat(Stat::Dex));
        let armor = self
            .inventory
            .equipped_armor()
            .map_or(0, |(_, armor_type)| rules.armor_rule(armor_type).ac_modifier);
        let shield = if self.inventory.shield_equipped() {
            rules.shield_ac
        } else {
            0
        };
        let enchantment = self.inventory.equipped_enchantment_ac_bonus();
        let ac = rules.base_ac + dex_mod + armor + shield + enchantment;
        debug!(base = rules.base_ac, dex_mod, armor, shield, enchantment, ac, "armor class");
        ac
    }

    pub fn hit_points(&self) -> f64 {
        self.hp
    }

    /// Main-hand damage plus one sneak die per finesse point. Costs a point.
    pub fn sneak_attack(&mut self, dice: &mut Dice) -> Result<Option<SneakAttack>> {
        let points = self.resources.finesse.current;
        if points <= 0 {
            return Err(Rejection::NoPointsLeft(Pool::Finesse).into());
        }
        self.sneak(dice, Hand::Main, points as u32, true)
    }

    /// Off-hand damage plus one sneak die per finesse point beyond the
    /// first. Costs a point.
    pub fn off_hand_sneak_attack(&mut self, dice: &mut Dice) -> Result<Option<SneakAttack>> {
        let points = self.resources.finesse.current;
        if points <= 0 {
            return Err(Rejection::NoPointsLeft(Pool::Finesse).into());
        }
        self.sneak(dice, Hand::Off, (points - 1) as u32, true)
    }

    /// Main-hand damage plus two sneak dice per finesse point. Free.
    pub fn assassinate(&mut self, dice: &mut Dice) -> Result<Option<SneakAttack>> {
        let points = self.resources.finesse.current.max(0) as u32;
        self.sneak(dice, Hand::Main, 2 * points, false)
    }

    fn sneak(
        &mut self,
        dice: &mut Dice,
        hand: Hand,
        extra_dice: u32,
        costs_point: bool,
    ) -> Result<Option<SneakAttack>> {
        let base = match hand {
            Hand::Main => self.main_hand_damage_roll(dice),
            Hand::Off => self.off_hand_damage_roll(dice),
        };
        let Some(base) = base else {
            return Ok(None);
        };
        let extra = dice.roll_or_average(extra_dice, self.rules.sneak_attack_die, 0);
        if costs_point && self.resources.spend(Pool::Finesse) {
            self.notify(SheetEvent::Spent(Pool::Finesse));
        }
        debug!(?hand, base, extra_dice, extra, costs_point, "sneak damage");
        Ok(Some(SneakAttack {
            damage: base + extra,
            extra_dice,
            spent_point: costs_point,
        }))
    }
}
