// In: src/lib.rs

//! Bird Battle Engine
//!
//! A turn-based combat engine: a party of up to three birds against successive
//! waves of enemies, with a shared charge meter and a catalogue of timed,
//! reactive and periodic effects.

// --- MODULE DECLARATIONS ---
// This declares the module hierarchy for the crate.
pub mod battle;
pub mod effects;
pub mod errors;
pub mod progression;
pub mod unit;

// --- PUBLIC API RE-EXPORTS ---
// This section defines the public-facing API of the `bird-battle` crate,
// making it easy for users to import the most important types directly.

// --- From the `schema` crate ---
// Re-export the ability data definitions.
pub use schema::{
    AbilityTable, AttackAbility, Bird, BirdData, ChargedAbility, ClassData, ClassName, SupportAbility,
    TableError,
};

// --- From this crate's modules (`src/`) ---

// Core battle engine types and state.
pub use battle::battlefield::{BattleConfig, Battlefield, MAX_CHARGE};
pub use battle::combat::Damage;
pub use battle::commands::{Command, CommandOutcome, InputError};
pub use battle::runner::{dummy_waves, run_battle, CommandSource};
pub use battle::state::{BattleEvent, BattleOutcome, BattleRng, BlockReason, EventBus, GameState};

// Runtime unit and effect types.
pub use effects::{Effect, EffectKind, Polarity};
pub use unit::{ActionKind, Side, Unit, UnitId, UnitSpec};

// Crate-specific error and result types.
pub use errors::{BattleEngineError, BattleResult, ContractViolation, DataError, SetupError};
