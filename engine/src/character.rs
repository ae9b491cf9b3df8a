use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::dice::Dice;
use crate::error::{Rejection, Result, SheetError};
use crate::inventory::{EquipOutcome, Inventory, Item, ItemId, NewItem};
use crate::observer::{Listener, ListenerId, Observers, SheetEvent};
use crate::resources::{self, Pool, PoolTotals, Resources};
use crate::rules::Rules;
use crate::stats::{self, Stat, StatBlock, StatOverrides, StatSelection};

/// Choices made on the creation screen.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCharacter {
    pub name: String,
    pub selection: StatSelection,
    #[serde(default)]
    pub race: Option<String>,
    /// One distinct stat per free racial +1.
    #[serde(default)]
    pub racial_choices: Vec<Stat>,
}

impl NewCharacter {
    pub fn new(name: &str, high: Stat, mid: Stat) -> Self {
        Self {
            name: name.to_string(),
            selection: StatSelection::new(high, mid),
            race: None,
            racial_choices: Vec::new(),
        }
    }

    pub fn with_race(mut self, race: &str, racial_choices: Vec<Stat>) -> Self {
        self.race = Some(race.to_string());
        self.racial_choices = racial_choices;
        self
    }
}

/// A player character and everything it owns.
#[derive(Debug)]
pub struct Character {
    pub(crate) rules: Arc<Rules>,
    pub(crate) name: String,
    pub(crate) selection: StatSelection,
    pub(crate) race: Option<String>,
    pub(crate) racial_choices: Vec<Stat>,
    pub(crate) base: StatBlock,
    pub(crate) overrides: StatOverrides,
    pub(crate) level: u32,
    pub(crate) hp: f64,
    pub(crate) hp_rolls: Vec<f64>,
    pub(crate) level_up_choices: Vec<Stat>,
    pub(crate) pending_level_up_points: u32,
    pub(crate) resources: Resources,
    pub(crate) inventory: Inventory,
    pub(crate) observers: Observers,
}

impl Character {
    pub fn create(new: NewCharacter, rules: Arc<Rules>, dice: &mut Dice) -> Result<Self> {
        let base = creation_stats(&new, &rules)?;
        let mut character = Self {
            resources: Resources::baseline(resources::starting_maxima(base)),
            rules,
            name: new.name,
            selection: new.selection,
            race: new.race,
            racial_choices: new.racial_choices,
            base,
            overrides: StatOverrides::default(),
            level: 1,
            hp: 0.0,
            hp_rolls: Vec::new(),
            level_up_choices: Vec::new(),
            pending_level_up_points: 0,
            inventory: Inventory::new(),
            observers: Observers::default(),
        };
        character.roll_hp(dice);
        info!(name = %character.name, base = ?character.base, hp = character.hp, "character created");
        Ok(character)
    }

    /// Replace the whole sheet with a fresh one. Subscribers stay attached.
    pub fn reset(&mut self, new: NewCharacter, dice: &mut Dice) -> Result<()> {
        let mut fresh = Character::create(new, Arc::clone(&self.rules), dice)?;
        std::mem::swap(&mut fresh.observers, &mut self.observers);
        *self = fresh;
        self.notify(SheetEvent::Reset);
        Ok(())
    }

    pub(crate) fn notify(&mut self, event: SheetEvent) {
        self.observers.notify(&event);
    }

    pub fn subscribe(&mut self, listener: Listener) -> ListenerId {
        self.observers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.observers.unsubscribe(id)
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn selection(&self) -> StatSelection {
        self.selection
    }

    pub fn race(&self) -> Option<&str> {
        self.race.as_deref()
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn hp(&self) -> f64 {
        self.hp
    }

    pub fn hp_rolls(&self) -> &[f64] {
        &self.hp_rolls
    }

    pub fn level_up_choices(&self) -> &[Stat] {
        &self.level_up_choices
    }

    pub fn pending_level_up_points(&self) -> u32 {
        self.pending_level_up_points
    }

    pub fn base_stats(&self) -> StatBlock {
        self.base
    }

    pub fn stat_overrides(&self) -> StatOverrides {
        self.overrides
    }

    /// Base, overrides and equipment folded together and clamped.
    pub fn effective_stats(&self) -> StatBlock {
        stats::effective_stats(
            self.base,
            &self.overrides,
            self.inventory.stat_bonuses(),
            &self.rules,
        )
    }

    pub fn effective_stat(&self, stat: Stat) -> i32 {
        self.effective_stats().get(stat)
    }

    pub fn modifier(&self, stat: Stat) -> i32 {
        stats::modifier(self.effective_stat(stat))
    }

    /// Store an override delta, saturated so base + delta stays in bounds.
    /// Returns the delta actually stored.
    pub fn set_stat_modifier(&mut self, stat: Stat, requested: i32) -> i32 {
        let delta = stats::saturated_delta(self.base.get(stat), requested, &self.rules);
        self.overrides.deltas.set(stat, delta);
        info!(%stat, requested, delta, "stat override set");
        self.notify(SheetEvent::StatOverridesChanged);
        delta
    }

    pub fn set_use_stat_overrides(&mut self, enabled: bool) {
        self.overrides.enabled = enabled;
        self.notify(SheetEvent::StatOverridesChanged);
    }

    pub fn clear_stat_modifiers(&mut self) {
        self.overrides.deltas = StatBlock::default();
        self.notify(SheetEvent::StatOverridesChanged);
    }

    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    pub fn spend(&mut self, pool: Pool) -> bool {
        let spent = self.resources.spend(pool);
        if spent {
            self.notify(SheetEvent::Spent(pool));
        }
        spent
    }

    pub fn short_rest(&mut self) {
        self.resources.short_rest();
        self.notify(SheetEvent::ShortRest);
    }

    pub fn long_rest(&mut self) {
        self.resources.long_rest();
        self.notify(SheetEvent::LongRest);
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Summed maneuver bonuses of everything equipped.
    pub fn maneuver_bonuses(&self) -> PoolTotals {
        self.inventory.maneuver_bonuses()
    }

    pub fn add_item(&mut self, item: NewItem) -> Result<ItemId> {
        let id = self.inventory.add_item(item, &self.rules)?;
        self.notify(SheetEvent::ItemAdded(id));
        Ok(id)
    }

    pub fn remove_item(&mut self, id: ItemId) -> Result<Item> {
        let item = self.inventory.remove_item(id)?;
        self.notify(SheetEvent::ItemRemoved(id));
        Ok(item)
    }

    pub fn can_equip(&self, id: ItemId) -> Result<()> {
        self.inventory
            .can_equip(id, self.effective_stat(Stat::Str), &self.rules)
    }

    pub fn equip(&mut self, id: ItemId) -> Result<EquipOutcome> {
        let strength = self.effective_stat(Stat::Str);
        let outcome = self.inventory.equip(id, strength, &self.rules)?;
        self.notify(SheetEvent::Equipped {
            id,
            slot: outcome.slot,
            evicted: outcome.evicted.clone(),
        });
        Ok(outcome)
    }

    pub fn unequip(&mut self, id: ItemId) -> Result<bool> {
        let changed = self.inventory.unequip(id)?;
        if changed {
            self.notify(SheetEvent::Unequipped(id));
        }
        Ok(changed)
    }

    pub fn modify_enchantment(&mut self, id: ItemId, delta: i32) -> Result<i32> {
        let level = self.inventory.modify_enchantment(id, delta, &self.rules)?;
        self.notify(SheetEvent::Enchanted { id, level });
        Ok(level)
    }

    pub fn set_enchantment(&mut self, id: ItemId, level: i32) -> Result<i32> {
        let level = self.inventory.set_enchantment(id, level, &self.rules)?;
        self.notify(SheetEvent::Enchanted { id, level });
        Ok(level)
    }
}

fn creation_stats(new: &NewCharacter, rules: &Rules) -> Result<StatBlock> {
    let base = new.selection.base_stats(rules)?;
    let with_race = match new.race.as_deref() {
        Some(name) => {
            let race = rules
                .race(name)
                .ok_or_else(|| SheetError::UnknownRace(name.to_string()))?;
            race.apply(base, &new.racial_choices)?
        }
        None if new.racial_choices.is_empty() => base,
        None => {
            return Err(Rejection::WrongBonusChoiceCount {
                race: "none".to_string(),
                expected: 0,
                actual: new.racial_choices.len(),
            }
            .into());
        }
    };
    let mut clamped = StatBlock::default();
    for stat in Stat::ALL {
        clamped.set(stat, stats::clamp_stat(with_race.get(stat), rules));
    }
    Ok(clamped)
}
