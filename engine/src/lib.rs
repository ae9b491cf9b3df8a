//! Character progression, resources, equipment and combat math for a
//! three-stat tabletop RPG character sheet.

pub mod character;
pub mod combat;
pub mod content;
pub mod dice;
pub mod error;
pub mod inventory;
pub mod observer;
pub mod progression;
pub mod race;
pub mod resources;
pub mod rules;
pub mod snapshot;
pub mod stats;

pub use character::{Character, NewCharacter};
pub use combat::SneakAttack;
pub use dice::{Dice, DiceMode, DiceRoll};
pub use error::{Rejection, SheetError};
pub use inventory::{
    ArmorType, EquipOutcome, EquippedWeapons, Inventory, Item, ItemId, ItemKind, NewItem, Slot,
    WeaponKind,
};
pub use observer::{ListenerId, SheetEvent};
pub use progression::LevelUpState;
pub use race::Race;
pub use resources::{Pool, PoolTotals, ResourcePool, Resources};
pub use rules::Rules;
pub use snapshot::Snapshot;
pub use stats::{modifier, Stat, StatBlock, StatOverrides, StatSelection};
