use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::SheetError;
use crate::stats::StatBlock;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Pool {
    Sorcery,
    Finesse,
    CombatManeuver,
}

impl Pool {
    pub const ALL: [Pool; 3] = [Pool::Sorcery, Pool::Finesse, Pool::CombatManeuver];
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Pool::Sorcery => "sorcery",
            Pool::Finesse => "finesse",
            Pool::CombatManeuver => "combat-maneuver",
        })
    }
}

impl FromStr for Pool {
    type Err = SheetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sorcery" => Ok(Pool::Sorcery),
            "finesse" => Ok(Pool::Finesse),
            "combat-maneuver" | "combat_maneuver" | "combat" => Ok(Pool::CombatManeuver),
            _ => Err(SheetError::UnknownPool(s.to_string())),
        }
    }
}

/// One number per pool.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolTotals {
    pub sorcery: i32,
    pub finesse: i32,
    pub combat_maneuver: i32,
}

impl PoolTotals {
    pub fn get(&self, pool: Pool) -> i32 {
        match pool {
            Pool::Sorcery => self.sorcery,
            Pool::Finesse => self.finesse,
            Pool::CombatManeuver => self.combat_maneuver,
        }
    }

    pub fn add(&mut self, pool: Pool, amount: i32) {
        match pool {
            Pool::Sorcery => self.sorcery = self.sorcery.saturating_add(amount),
            Pool::Finesse => self.finesse = self.finesse.saturating_add(amount),
            Pool::CombatManeuver => {
                self.combat_maneuver = self.combat_maneuver.saturating_add(amount)
            }
        }
    }
}

/// Pool maxima for a new level 1 character.
pub fn starting_maxima(stats: StatBlock) -> PoolTotals {
    PoolTotals {
        sorcery: if stats.int_ > 10 { 3 } else { 0 },
        finesse: i32::from(stats.dex >= 16),
        combat_maneuver: combat_maneuver_max(stats, 1),
    }
}

/// Max growth earned by finishing a level-up at `level`. Sorcery gains one
/// for int 11+ and one more for int above 14; finesse gains one with dex
/// 16+ on an odd level. Stats only count from the level they are reached.
pub fn level_grants(stats: StatBlock, level: u32) -> PoolTotals {
    PoolTotals {
        sorcery: i32::from(stats.int_ >= 11) + i32::from(stats.int_ > 14),
        finesse: i32::from(stats.dex >= 16 && level % 2 == 1),
        combat_maneuver: 0,
    }
}

/// Combat maneuvers track the level outright while str is 16+.
pub fn combat_maneuver_max(stats: StatBlock, level: u32) -> i32 {
    if stats.str_ >= 16 {
        i32::try_from(level).unwrap_or(i32::MAX)
    } else {
        0
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePool {
    pub current: i32,
    pub max: i32,
}

impl ResourcePool {
    pub fn full(max: i32) -> Self {
        let max = max.max(0);
        Self { current: max, max }
    }

    /// Move the max; a raise grants the difference, a cut clamps current.
    pub fn set_max(&mut self, max: i32) {
        let max = max.max(0);
        if max > self.max {
            self.current = self.current.saturating_add(max - self.max);
        }
        self.max = max;
        self.current = self.current.min(self.max);
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resources {
    pub sorcery: ResourcePool,
    pub finesse: ResourcePool,
    pub combat_maneuver: ResourcePool,
}

impl Resources {
    /// Every pool full at its max.
    pub fn baseline(maxima: PoolTotals) -> Self {
        Self {
            sorcery: ResourcePool::full(maxima.sorcery),
            finesse: ResourcePool::full(maxima.finesse),
            combat_maneuver: ResourcePool::full(maxima.combat_maneuver),
        }
    }

    pub fn pool(&self, pool: Pool) -> ResourcePool {
        match pool {
            Pool::Sorcery => self.sorcery,
            Pool::Finesse => self.finesse,
            Pool::CombatManeuver => self.combat_maneuver,
        }
    }

    fn pool_mut(&mut self, pool: Pool) -> &mut ResourcePool {
        match pool {
            Pool::Sorcery => &mut self.sorcery,
            Pool::Finesse => &mut self.finesse,
            Pool::CombatManeuver => &mut self.combat_maneuver,
        }
    }

    /// Spend one point. Returns false, changing nothing, when empty.
    pub fn spend(&mut self, pool: Pool) -> bool {
        let p = self.pool_mut(pool);
        if p.current <= 0 {
            debug!(%pool, "spend refused: empty");
            return false;
        }
        p.current -= 1;
        debug!(%pool, left = p.current, "spent");
        true
    }

    /// Each pool regains half its max, rounded up.
    pub fn short_rest(&mut self) {
        for pool in Pool::ALL {
            let p = self.pool_mut(pool);
            p.current = (p.current + (p.max + 1) / 2).min(p.max);
        }
        info!("short rest");
    }

    pub fn long_rest(&mut self) {
        for pool in Pool::ALL {
            let p = self.pool_mut(pool);
            p.current = p.max;
        }
        info!("long rest");
    }

    /// Apply a finished level-up: sorcery and finesse grow by their grants,
    /// combat maneuvers are recomputed from str and level.
    pub fn advance(&mut self, stats: StatBlock, level: u32) {
        let grants = level_grants(stats, level);
        for pool in Pool::ALL {
            let p = self.pool_mut(pool);
            let before = p.max;
            let target = match pool {
                Pool::CombatManeuver => combat_maneuver_max(stats, level),
                _ => before.saturating_add(grants.get(pool)),
            };
            p.set_max(target);
            if before != p.max {
                info!(%pool, from = before, to = p.max, "pool max changed");
            }
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        for pool in Pool::ALL {
            let p = self.pool(pool);
            if p.current < 0 || p.current > p.max {
                return Err(format!("{} pool {}/{} out of range", pool, p.current, p.max));
            }
        }
        Ok(())
    }
}
