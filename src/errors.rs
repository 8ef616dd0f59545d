use crate::unit::UnitId;
use schema::{Bird, ClassName, TableError};
use thiserror::Error;

/// Main error type for the bird battle engine.
///
/// Ordinary game outcomes (blocked actions, bad user input) are not errors;
/// they travel through `CommandOutcome`. Anything that ends up here is a bug in
/// the caller or the ability data.
#[derive(Debug, Error)]
pub enum BattleEngineError {
    #[error("contract violation: {0}")]
    Contract(#[from] ContractViolation),
    #[error("invalid battle setup: {0}")]
    Setup(#[from] SetupError),
    #[error("ability data error: {0}")]
    Data(#[from] DataError),
}

/// A caller broke one of the engine's invariants mid-battle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractViolation {
    #[error("cannot add positive effect '{0}' as a negative effect")]
    PositiveAsNegative(String),
    #[error("cannot add negative effect '{0}' as a positive effect")]
    NegativeAsPositive(String),
    #[error("invalid chance {0}, expected a percentage in 0-100")]
    InvalidChance(u32),
    #[error("{ability} expected at least {expected} enemies on the field, found {found}")]
    MissingNeighbours {
        ability: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("unit {0} is not on the battlefield")]
    UnitNotOnField(UnitId),
}

/// Structural problems detected while building a battle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error("a battle needs at least one ally")]
    NoAllies,
    #[error("a battle needs at least one wave")]
    NoWaves,
    #[error("wave {0} has no enemies")]
    EmptyWave(usize),
    #[error("at most {max} allies may join a battle, got {count}")]
    TooManyAllies { count: usize, max: usize },
    #[error("{0} can only join the battle once")]
    DuplicateBird(Bird),
    #[error("unit name '{0}' is used twice on the same side")]
    DuplicateKey(String),
    #[error("no abilities are defined for class {0}")]
    UnknownClass(ClassName),
    #[error("no stats are defined for bird {0}")]
    UnknownBird(Bird),
}

#[derive(Debug, Error)]
pub enum DataError {
    #[error(transparent)]
    Table(#[from] TableError),
}

impl From<TableError> for BattleEngineError {
    fn from(err: TableError) -> Self {
        BattleEngineError::Data(DataError::Table(err))
    }
}

/// Type alias for Results using BattleEngineError
pub type BattleResult<T> = Result<T, BattleEngineError>;
