//! Items, equipment slots and enchantments.
//!
//! The inventory is the only place item state changes. Slot rules:
//! - main-hand, off-hand, armor and shield hold at most one item each;
//! - accessories are equipped without a slot and without limit;
//! - a two-handed weapon never shares the hands with a second weapon, and
//!   never coexists with a shield.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Rejection, Result, SheetError};
use crate::resources::{Pool, PoolTotals};
use crate::rules::Rules;
use crate::stats::{Stat, StatBlock};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u32);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeaponKind {
    OneHand,
    TwoHand,
    Finesse,
    Ranged,
    Staff,
}

impl WeaponKind {
    pub fn is_two_handed(self) -> bool {
        matches!(self, WeaponKind::TwoHand | WeaponKind::Ranged)
    }

    /// Stat that drives attack and damage with this weapon.
    pub fn governing_stat(self) -> Stat {
        match self {
            WeaponKind::Finesse | WeaponKind::Ranged => Stat::Dex,
            WeaponKind::Staff => Stat::Int,
            WeaponKind::OneHand | WeaponKind::TwoHand => Stat::Str,
        }
    }
}

/// Armor weight class; heavier classes need more strength.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArmorType {
    Light,
    Medium,
    Heavy,
}

impl fmt::Display for ArmorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArmorType::Light => "light",
            ArmorType::Medium => "medium",
            ArmorType::Heavy => "heavy",
        })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemKind {
    Weapon { weapon_type: WeaponKind },
    Armor { armor_type: ArmorType },
    Shield,
    Accessory,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Slot {
    MainHand,
    OffHand,
    Armor,
    Shield,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Slot::MainHand => "main-hand",
            Slot::OffHand => "off-hand",
            Slot::Armor => "armor",
            Slot::Shield => "shield",
        })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBonus {
    pub stat: Stat,
    pub amount: i32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManeuverBonus {
    pub pool: Pool,
    pub amount: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub kind: ItemKind,
    pub equipped: bool,
    pub slot: Option<Slot>,
    pub enchantment: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stat_bonuses: Vec<StatBonus>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub maneuver_bonuses: Vec<ManeuverBonus>,
}

impl Item {
    pub fn weapon_kind(&self) -> Option<WeaponKind> {
        match self.kind {
            ItemKind::Weapon { weapon_type } => Some(weapon_type),
            _ => None,
        }
    }

    pub fn is_two_handed(&self) -> bool {
        self.weapon_kind().is_some_and(WeaponKind::is_two_handed)
    }

    fn protects(&self) -> bool {
        matches!(self.kind, ItemKind::Armor { .. } | ItemKind::Shield)
    }
}

/// An item before it joins an inventory and gets an id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub kind: ItemKind,
    #[serde(default)]
    pub enchantment: i32,
    #[serde(default)]
    pub stat_bonuses: Vec<StatBonus>,
    #[serde(default)]
    pub maneuver_bonuses: Vec<ManeuverBonus>,
}

impl NewItem {
    fn of(name: &str, kind: ItemKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            enchantment: 0,
            stat_bonuses: Vec::new(),
            maneuver_bonuses: Vec::new(),
        }
    }

    pub fn weapon(name: &str, weapon_type: WeaponKind) -> Self {
        Self::of(name, ItemKind::Weapon { weapon_type })
    }

    pub fn armor(name: &str, armor_type: ArmorType) -> Self {
        Self::of(name, ItemKind::Armor { armor_type })
    }

    pub fn shield(name: &str) -> Self {
        Self::of(name, ItemKind::Shield)
    }

    pub fn accessory(name: &str) -> Self {
        Self::of(name, ItemKind::Accessory)
    }

    pub fn with_enchantment(mut self, level: i32) -> Self {
        self.enchantment = level;
        self
    }

    pub fn with_stat_bonus(mut self, stat: Stat, amount: i32) -> Self {
        self.stat_bonuses.push(StatBonus { stat, amount });
        self
    }

    pub fn with_maneuver_bonus(mut self, pool: Pool, amount: i32) -> Self {
        self.maneuver_bonuses.push(ManeuverBonus { pool, amount });
        self
    }
}

/// What an equip call changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EquipOutcome {
    pub slot: Option<Slot>,
    pub evicted: Vec<ItemId>,
}

#[derive(Copy, Clone, Debug, Default)]
pub struct EquippedWeapons<'a> {
    pub main_hand: Option<&'a Item>,
    pub off_hand: Option<&'a Item>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    items: Vec<Item>,
    next_id: u32,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    fn get(&self, id: ItemId) -> Result<&Item> {
        self.item(id).ok_or(SheetError::UnknownItem(id))
    }

    fn get_mut(&mut self, id: ItemId) -> Result<&mut Item> {
        self.items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(SheetError::UnknownItem(id))
    }

    pub fn equipped_items(&self) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(|item| item.equipped)
    }

    pub fn occupant(&self, slot: Slot) -> Option<&Item> {
        self.items.iter().find(|item| item.slot == Some(slot))
    }

    pub fn equipped_armor(&self) -> Option<(&Item, ArmorType)> {
        self.occupant(Slot::Armor).and_then(|item| match item.kind {
            ItemKind::Armor { armor_type } => Some((item, armor_type)),
            _ => None,
        })
    }

    pub fn shield_equipped(&self) -> bool {
        self.occupant(Slot::Shield).is_some()
    }

    pub fn equipped_weapons(&self) -> EquippedWeapons<'_> {
        EquippedWeapons {
            main_hand: self.occupant(Slot::MainHand),
            off_hand: self.occupant(Slot::OffHand),
        }
    }

    pub fn add_item(&mut self, new: NewItem, rules: &Rules) -> Result<ItemId> {
        check_enchantment(new.enchantment, rules)?;
        let id = ItemId(self.next_id);
        self.next_id += 1;
        info!(%id, name = %new.name, "item added");
        self.items.push(Item {
            id,
            name: new.name,
            kind: new.kind,
            equipped: false,
            slot: None,
            enchantment: new.enchantment,
            stat_bonuses: new.stat_bonuses,
            maneuver_bonuses: new.maneuver_bonuses,
        });
        Ok(id)
    }

    /// Drop an item from the inventory, unequipping it first.
    pub fn remove_item(&mut self, id: ItemId) -> Result<Item> {
        let idx = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or(SheetError::UnknownItem(id))?;
        let mut item = self.items.remove(idx);
        item.equipped = false;
        item.slot = None;
        info!(%id, name = %item.name, "item removed");
        Ok(item)
    }

    /// Validate an equip without changing anything.
    pub fn can_equip(&self, id: ItemId, effective_str: i32, rules: &Rules) -> Result<()> {
        let item = self.get(id)?;
        self.check_equip(item, effective_str, rules)?;
        Ok(())
    }

    fn check_equip(&self, item: &Item, effective_str: i32, rules: &Rules) -> Result<(), Rejection> {
        if item.equipped {
            return Ok(());
        }
        match item.kind {
            ItemKind::Armor { armor_type } => {
                let required = rules.armor_rule(armor_type).strength_requirement;
                if effective_str < required {
                    return Err(Rejection::StrengthTooLow {
                        armor: armor_type.to_string(),
                        required,
                        actual: effective_str,
                    });
                }
            }
            ItemKind::Weapon { weapon_type } if weapon_type.is_two_handed() => {
                if self.shield_equipped() {
                    return Err(Rejection::ShieldBlocksTwoHanded);
                }
                let hands = self.equipped_weapons();
                if rules.strict_hand_swap && hands.main_hand.is_some() && hands.off_hand.is_some() {
                    return Err(Rejection::HandsFull);
                }
            }
            ItemKind::Shield => {
                let hands = self.equipped_weapons();
                if [hands.main_hand, hands.off_hand]
                    .into_iter()
                    .flatten()
                    .any(Item::is_two_handed)
                {
                    return Err(Rejection::TwoHandedBlocksShield);
                }
            }
            ItemKind::Weapon { .. } | ItemKind::Accessory => {}
        }
        Ok(())
    }

    pub fn equip(&mut self, id: ItemId, effective_str: i32, rules: &Rules) -> Result<EquipOutcome> {
        let item = self.get(id)?;
        if item.equipped {
            return Ok(EquipOutcome {
                slot: item.slot,
                evicted: Vec::new(),
            });
        }
        self.check_equip(item, effective_str, rules)?;
        let kind = item.kind;

        let mut outcome = EquipOutcome::default();
        let slot = match kind {
            ItemKind::Weapon { weapon_type } if weapon_type.is_two_handed() => {
                self.evict(Slot::MainHand, &mut outcome);
                self.evict(Slot::OffHand, &mut outcome);
                Some(Slot::MainHand)
            }
            ItemKind::Weapon { .. } => {
                let hands = self.equipped_weapons();
                let main_two_handed = hands.main_hand.map(Item::is_two_handed);
                let off_taken = hands.off_hand.is_some();
                match (main_two_handed, off_taken) {
                    (None, _) => Some(Slot::MainHand),
                    (Some(false), false) => Some(Slot::OffHand),
                    (Some(true), _) | (Some(false), true) => {
                        self.evict(Slot::MainHand, &mut outcome);
                        Some(Slot::MainHand)
                    }
                }
            }
            ItemKind::Armor { .. } => {
                self.evict(Slot::Armor, &mut outcome);
                Some(Slot::Armor)
            }
            ItemKind::Shield => {
                self.evict(Slot::Shield, &mut outcome);
                Some(Slot::Shield)
            }
            ItemKind::Accessory => None,
        };

        let item = self.get_mut(id)?;
        item.equipped = true;
        item.slot = slot;
        outcome.slot = slot;
        info!(%id, name = %item.name, ?slot, evicted = ?outcome.evicted, "item equipped");
        Ok(outcome)
    }

    fn evict(&mut self, slot: Slot, outcome: &mut EquipOutcome) {
        if let Some(item) = self.items.iter_mut().find(|item| item.slot == Some(slot)) {
            debug!(id = %item.id, ?slot, "evicting");
            item.equipped = false;
            item.slot = None;
            outcome.evicted.push(item.id);
        }
    }

    /// Returns false when the item was not equipped.
    pub fn unequip(&mut self, id: ItemId) -> Result<bool> {
        let item = self.get_mut(id)?;
        if !item.equipped {
            return Ok(false);
        }
        item.equipped = false;
        item.slot = None;
        info!(%id, name = %item.name, "item unequipped");
        Ok(true)
    }

    pub fn modify_enchantment(&mut self, id: ItemId, delta: i32, rules: &Rules) -> Result<i32> {
        let current = self.get(id)?.enchantment;
        self.set_enchantment(id, current.saturating_add(delta), rules)
    }

    pub fn set_enchantment(&mut self, id: ItemId, level: i32, rules: &Rules) -> Result<i32> {
        let item = self.get_mut(id)?;
        check_enchantment(level, rules)?;
        debug!(%id, from = item.enchantment, to = level, "enchantment set");
        item.enchantment = level;
        Ok(level)
    }

    /// Enchantment of every equipped armor and shield, summed.
    pub fn equipped_enchantment_ac_bonus(&self) -> i32 {
        self.equipped_items()
            .filter(|item| item.protects())
            .map(|item| item.enchantment)
            .sum()
    }

    pub fn stat_bonuses(&self) -> StatBlock {
        let mut out = StatBlock::default();
        for bonus in self.equipped_items().flat_map(|item| &item.stat_bonuses) {
            out.add(bonus.stat, bonus.amount);
        }
        out
    }

    pub fn maneuver_bonuses(&self) -> PoolTotals {
        let mut out = PoolTotals::default();
        for bonus in self.equipped_items().flat_map(|item| &item.maneuver_bonuses) {
            out.add(bonus.pool, bonus.amount);
        }
        out
    }

    /// Structural checks for state that did not come through `equip`.
    pub fn validate(&self, rules: &Rules) -> Result<(), String> {
        for (idx, item) in self.items.iter().enumerate() {
            if self.items[..idx].iter().any(|other| other.id == item.id) {
                return Err(format!("duplicate item id {}", item.id));
            }
            if item.id.0 >= self.next_id {
                return Err(format!("item id {} not below next id {}", item.id, self.next_id));
            }
            if check_enchantment(item.enchantment, rules).is_err() {
                return Err(format!("item {} enchantment {} out of range", item.id, item.enchantment));
            }
            if item.slot.is_some() && !item.equipped {
                return Err(format!("item {} has a slot but is not equipped", item.id));
            }
            let slot_fits = match (item.kind, item.slot) {
                (_, None) => !item.equipped || matches!(item.kind, ItemKind::Accessory),
                (ItemKind::Weapon { .. }, Some(Slot::MainHand | Slot::OffHand)) => true,
                (ItemKind::Armor { .. }, Some(Slot::Armor)) => true,
                (ItemKind::Shield, Some(Slot::Shield)) => true,
                _ => false,
            };
            if !slot_fits {
                return Err(format!("item {} sits in the wrong slot {:?}", item.id, item.slot));
            }
        }
        for slot in [Slot::MainHand, Slot::OffHand, Slot::Armor, Slot::Shield] {
            if self.items.iter().filter(|item| item.slot == Some(slot)).count() > 1 {
                return Err(format!("slot {:?} holds more than one item", slot));
            }
        }
        let hands = self.equipped_weapons();
        let two_handed = [hands.main_hand, hands.off_hand]
            .into_iter()
            .flatten()
            .any(Item::is_two_handed);
        if two_handed && (self.shield_equipped() || hands.off_hand.is_some()) {
            return Err("two-handed weapon shares the hands or a shield".to_string());
        }
        Ok(())
    }
}

fn check_enchantment(level: i32, rules: &Rules) -> Result<(), Rejection> {
    if (rules.enchantment_min..=rules.enchantment_max).contains(&level) {
        Ok(())
    } else {
        Err(Rejection::EnchantmentOutOfRange {
            requested: level,
            min: rules.enchantment_min,
            max: rules.enchantment_max,
        })
    }
}
