//! Two-phase level-up.
//!
//! `Idle` (no pending points) -> `start_level_up` -> `LevelingUp` ->
//! `allocate_point` until the budget is spent -> finalize -> `Idle`.

use tracing::{debug, info};

use crate::character::Character;
use crate::dice::Dice;
use crate::observer::SheetEvent;
use crate::stats::{self, Stat};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LevelUpState {
    Idle,
    LevelingUp { pending: u32 },
}

impl Character {
    pub fn level_up_state(&self) -> LevelUpState {
        match self.pending_level_up_points {
            0 => LevelUpState::Idle,
            pending => LevelUpState::LevelingUp { pending },
        }
    }

    /// Gain a level, roll its hit points and open the allocation budget.
    /// Returns false, changing nothing, while a level-up is already open.
    pub fn start_level_up(&mut self, dice: &mut Dice) -> bool {
        let Some(hp_roll) = self.open_level(dice) else {
            return false;
        };
        self.notify(SheetEvent::LevelUpStarted {
            level: self.level,
            hp_roll,
        });
        if self.pending_level_up_points == 0 {
            self.finalize_level_up();
        }
        true
    }

    /// Put one pending point into `stat`. Returns false when no level-up is
    /// open.
    pub fn allocate_point(&mut self, stat: Stat) -> bool {
        let LevelUpState::LevelingUp { pending } = self.level_up_state() else {
            debug!(%stat, "no pending level-up points");
            return false;
        };
        self.place_point(stat, pending);
        self.notify(SheetEvent::PointAllocated {
            stat,
            remaining: self.pending_level_up_points,
        });
        if self.pending_level_up_points == 0 {
            self.finalize_level_up();
        }
        true
    }

    /// One-call level-up putting the whole budget into `stat`. Observers
    /// only see `LevelUpFinished`.
    pub fn level_up(&mut self, stat: Stat, dice: &mut Dice) -> bool {
        if self.open_level(dice).is_none() {
            return false;
        }
        while let LevelUpState::LevelingUp { pending } = self.level_up_state() {
            self.place_point(stat, pending);
        }
        self.finalize_level_up();
        true
    }

    fn open_level(&mut self, dice: &mut Dice) -> Option<f64> {
        if self.level_up_state() != LevelUpState::Idle {
            debug!(pending = self.pending_level_up_points, "level-up already in progress");
            return None;
        }
        self.level += 1;
        let hp_roll = self.roll_hp(dice);
        self.pending_level_up_points = self.rules.level_up_points;
        info!(level = self.level, hp_roll, "level-up started");
        Some(hp_roll)
    }

    fn place_point(&mut self, stat: Stat, pending: u32) {
        let raised = stats::clamp_stat(self.base.get(stat).saturating_add(1), &self.rules);
        self.base.set(stat, raised);
        self.pending_level_up_points = pending - 1;
        self.level_up_choices.push(stat);
        debug!(%stat, value = raised, remaining = self.pending_level_up_points, "point allocated");
    }

    fn finalize_level_up(&mut self) {
        let stats = self.effective_stats();
        self.resources.advance(stats, self.level);
        info!(level = self.level, resources = ?self.resources, "level-up finished");
        self.notify(SheetEvent::LevelUpFinished { level: self.level });
    }

    /// Roll hit points for one level and add them to the total.
    pub(crate) fn roll_hp(&mut self, dice: &mut Dice) -> f64 {
        let str_mod = self.modifier(Stat::Str).max(0);
        let hit_die = self.rules.hit_die(str_mod);
        let roll = dice.roll_or_average(1, hit_die, str_mod);
        let recorded = if roll <= 0.0 { 1.0 } else { roll };
        debug!(str_mod, hit_die, roll, recorded, "hp roll");
        self.hp_rolls.push(recorded);
        self.hp += recorded;
        recorded
    }
}
