use crate::battle::battlefield::Battlefield;
use crate::errors::ContractViolation;
use crate::unit::{ActionKind, UnitId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    AwaitingAllyInput,
    ResolvingAllyAction,
    EnemyTurn,
    Won,
    Lost,
    Aborted,
}

impl GameState {
    pub fn outcome(self) -> Option<BattleOutcome> {
        match self {
            GameState::Won => Some(BattleOutcome::Won),
            GameState::Lost => Some(BattleOutcome::Lost),
            GameState::Aborted => Some(BattleOutcome::Aborted),
            _ => None,
        }
    }
}

/// The terminal result of a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleOutcome {
    Won,
    Lost,
    Aborted,
}

/// Why an ally could not perform the action it was ordered to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockReason {
    /// Names of the effects forbidding the action.
    Effects(Vec<String>),
    /// The charge meter is below 100; holds its current value.
    ChargeNotFull(u8),
}

impl std::fmt::Display for BlockReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockReason::Effects(names) if names.len() == 1 => {
                write!(f, "because of '{}' effect", names[0])
            }
            BlockReason::Effects(names) => {
                let quoted: Vec<String> = names.iter().map(|name| format!("'{}'", name)).collect();
                write!(f, "because of {} effects", quoted.join(", "))
            }
            BlockReason::ChargeNotFull(charge) => {
                write!(f, "because chili is only charged to {}%", charge)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleEvent {
    // Battle Flow Events
    TurnStarted { turn: u32 },
    WaveStarted { wave: u32 },
    WaveCleared { wave: u32 },
    BattleEnded { outcome: BattleOutcome },

    // Action Events
    AbilityUsed { unit: UnitId, ability: String, target: Option<UnitId> },
    ActionBlocked { unit: UnitId, action: ActionKind, reason: BlockReason },
    Redirected { attacker: UnitId, from: UnitId, to: UnitId },

    // Damage & Health Events
    DamageDealt { source: UnitId, victim: UnitId, damage: i32, remaining_hp: i32 },
    Healed { target: UnitId, amount: i32, new_hp: i32 },
    UnitDied { unit: UnitId },

    // Effect Events
    EffectApplied { target: UnitId, effect: String, turns: u32 },
    EffectExpired { target: UnitId, effect: String },
    EffectCleansed { target: UnitId, effect: String },
    EffectDispelled { target: UnitId, effect: String },

    // Shared Resources
    ChargeChanged { old: u8, new: u8 },
}

impl BattleEvent {
    /// Renders the event as player-facing text. Silent events return `None`.
    pub fn format(&self, battlefield: &Battlefield) -> Option<String> {
        let name = |id: &UnitId| battlefield.name_of(*id).to_string();

        match self {
            BattleEvent::TurnStarted { turn } => Some(format!("=== Turn {} ===", turn)),
            BattleEvent::WaveStarted { wave } => Some(format!("Incoming wave {}...", wave)),
            BattleEvent::WaveCleared { wave } => Some(format!("Wave {} defeated!", wave)),
            BattleEvent::BattleEnded { outcome } => Some(match outcome {
                BattleOutcome::Won => "All waves defeated. The birds win!".to_string(),
                BattleOutcome::Lost => "Every bird has fallen. The battle is lost.".to_string(),
                BattleOutcome::Aborted => "The battle was aborted.".to_string(),
            }),

            BattleEvent::AbilityUsed { unit, ability, target } => Some(match target {
                Some(target) if target != unit => {
                    format!("{} uses {} on {}!", name(unit), ability, name(target))
                }
                _ => format!("{} uses {}!", name(unit), ability),
            }),
            BattleEvent::ActionBlocked { unit, action, reason } => {
                Some(format!("'{}' can't {} {}.", name(unit), action, reason))
            }
            BattleEvent::Redirected { attacker, from, to } => Some(format!(
                "{}'s attack on {} is redirected to {}!",
                name(attacker),
                name(from),
                name(to)
            )),

            BattleEvent::DamageDealt { source, victim, damage, remaining_hp } => {
                if source == victim {
                    Some(format!("{} takes {} damage ({} hp left)", name(victim), damage, remaining_hp))
                } else {
                    Some(format!(
                        "{} deals {} damage to {} ({} hp left)",
                        name(source),
                        damage,
                        name(victim),
                        remaining_hp
                    ))
                }
            }
            BattleEvent::Healed { target, amount, new_hp } => {
                if *amount <= 0 {
                    None
                } else {
                    Some(format!("{} heals {} hp ({} hp)", name(target), amount, new_hp))
                }
            }
            BattleEvent::UnitDied { unit } => Some(format!("{} dies.", name(unit))),

            BattleEvent::EffectApplied { target, effect, turns } => Some(format!(
                "{} gets '{}' for {} turns.",
                name(target),
                effect,
                turns
            )),
            BattleEvent::EffectExpired { target, effect } => {
                Some(format!("'{}' effect expired on {}.", effect, name(target)))
            }
            BattleEvent::EffectCleansed { target, effect } => {
                Some(format!("'{}' was cleansed from {}.", effect, name(target)))
            }
            BattleEvent::EffectDispelled { target, effect } => {
                Some(format!("'{}' was dispelled from {}.", effect, name(target)))
            }

            // Shown in the status line instead.
            BattleEvent::ChargeChanged { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EventBus {
    events: Vec<BattleEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    /// Takes every event collected so far, leaving the bus empty.
    pub fn drain(&mut self) -> Vec<BattleEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl std::fmt::Display for EventBus {
    /// Format the EventBus for printing. Shows debug format of all events.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for event in &self.events {
            writeln!(f, "  {:?}", event)?;
        }
        Ok(())
    }
}

/// Source of every chance roll and random pick in a battle.
///
/// `Scripted` replays a fixed list of 1-100 outcomes, wrapping around when it
/// runs out, so tests can force a specific branch.
#[derive(Debug, Clone)]
pub enum BattleRng {
    Seeded(StdRng),
    Scripted { outcomes: Vec<u8>, index: usize },
}

impl BattleRng {
    pub fn seeded(seed: u64) -> Self {
        BattleRng::Seeded(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        BattleRng::Seeded(StdRng::from_os_rng())
    }

    pub fn scripted(outcomes: Vec<u8>) -> Self {
        BattleRng::Scripted { outcomes, index: 0 }
    }

    /// Next outcome in 1..=100.
    pub fn roll(&mut self, reason: &str) -> u8 {
        let outcome = match self {
            BattleRng::Seeded(rng) => rng.random_range(1..=100),
            BattleRng::Scripted { outcomes, index } => {
                if outcomes.is_empty() {
                    100
                } else {
                    let outcome = outcomes[*index % outcomes.len()];
                    *index += 1;
                    outcome
                }
            }
        };

        tracing::trace!(outcome, reason, "rng roll");
        outcome
    }

    /// True with probability `percent`%. Anything above 100 is a caller bug.
    pub fn chance(&mut self, percent: u32) -> Result<bool, ContractViolation> {
        if percent > 100 {
            return Err(ContractViolation::InvalidChance(percent));
        }
        Ok(u32::from(self.roll("chance")) <= percent)
    }

    /// A uniformly chosen index below `len`. `len` must not be zero.
    pub fn pick_index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        match self {
            BattleRng::Seeded(rng) => rng.random_range(0..len),
            BattleRng::Scripted { .. } => usize::from(self.roll("pick")).saturating_sub(1) % len,
        }
    }
}
