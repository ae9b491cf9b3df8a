use thiserror::Error;

use crate::inventory::ItemId;
use crate::resources::Pool;
use crate::stats::Stat;

/// A game-state validation failure. The character is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("strength {actual} is below the {required} required for {armor} armor")]
    StrengthTooLow {
        armor: String,
        required: i32,
        actual: i32,
    },
    #[error("cannot equip a two-handed weapon while a shield is equipped")]
    ShieldBlocksTwoHanded,
    #[error("both hands already hold one-handed weapons")]
    HandsFull,
    #[error("cannot equip a shield while wielding a two-handed weapon")]
    TwoHandedBlocksShield,
    #[error("enchantment {requested:+} is outside {min:+}..={max:+}")]
    EnchantmentOutOfRange { requested: i32, min: i32, max: i32 },
    #[error("no {0} points left")]
    NoPointsLeft(Pool),
    #[error("high and mid stat must differ (both were {0})")]
    DuplicateSelection(Stat),
    #[error("race {race} needs {expected} free bonus choice(s), got {actual}")]
    WrongBonusChoiceCount {
        race: String,
        expected: usize,
        actual: usize,
    },
    #[error("free racial bonus picked {0} twice")]
    RepeatedBonusChoice(Stat),
}

#[derive(Debug, Error)]
pub enum SheetError {
    #[error(transparent)]
    Rejected(#[from] Rejection),
    #[error("unknown item id {0}")]
    UnknownItem(ItemId),
    #[error("unknown stat `{0}`")]
    UnknownStat(String),
    #[error("unknown resource pool `{0}`")]
    UnknownPool(String),
    #[error("unknown race `{0}`")]
    UnknownRace(String),
    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),
    #[error("snapshot json: {0}")]
    Json(#[from] serde_json::Error),
}

impl SheetError {
    /// The validation failure behind this error, if it is one.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            SheetError::Rejected(r) => Some(r),
            _ => None,
        }
    }
}

pub type Result<T, E = SheetError> = std::result::Result<T, E>;
