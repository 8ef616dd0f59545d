use crate::battle::battlefield::{Battlefield, MAX_CHARGE};
use crate::battle::state::{BattleEvent, BattleOutcome, BlockReason, GameState};
use crate::errors::BattleResult;
use crate::unit::{ActionKind, Side, Unit, UnitId};
use thiserror::Error;
use tracing::debug;

pub const HELP_TEXT: &str = "\
Commands:
  attack|a <ally> [enemy]     attack an enemy (area attacks need no target)
  support|s <ally> [target]   use a support ability, on the ally itself by default
  chili|charge|c <ally>       use the bird's charged ability once chili is at 100%
  stat <unit>                 show a unit's health and effects
  turns                       list allies that have not acted this turn
  abort <CONFIRM|no>          end the battle
  help                        show this text
Units can be named by any unique prefix of their name.";

/// One line of player input, parsed but not yet checked against the battlefield.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Attack { ally: String, target: Option<String> },
    Support { ally: String, target: Option<String> },
    Charged { ally: String },
    Stat { unit: String },
    Turns,
    Abort { confirmed: bool },
    Help,
}

/// Bad player input. Reported back, never consumes an action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("no command given")]
    Empty,
    #[error("unknown command '{0}', type 'help' for a list")]
    UnknownCommand(String),
    #[error("'{command}' needs {argument}")]
    MissingArgument { command: &'static str, argument: &'static str },
    #[error("'{command}' takes at most {max} arguments")]
    TooManyArguments { command: &'static str, max: usize },
    #[error("no unit matches '{0}'")]
    UnknownUnit(String),
    #[error("'{reference}' could mean any of: {}", .candidates.join(", "))]
    AmbiguousUnit { reference: String, candidates: Vec<String> },
    #[error("'{0}' is not one of your birds")]
    NotAnAlly(String),
    #[error("'{0}' is not an enemy")]
    NotAnEnemy(String),
    #[error("'{0}' has already acted this turn")]
    AlreadyActed(String),
    #[error("{0} needs a target")]
    TargetRequired(String),
    #[error("type 'abort CONFIRM' to abort or 'abort no' to continue, not '{0}'")]
    InvalidConfirmation(String),
}

/// A unit's health and effects, as shown by `stat` and `turns`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitStatus {
    pub id: UnitId,
    pub name: String,
    pub hp: i32,
    pub total_hp: i32,
    pub effects: Vec<(String, u32)>,
}

impl UnitStatus {
    fn of(unit: &Unit) -> Self {
        Self {
            id: unit.id,
            name: unit.key.clone(),
            hp: unit.hp(),
            total_hp: unit.total_hp(),
            effects: unit.effects().map(|effect| (effect.name.clone(), effect.turns)).collect(),
        }
    }
}

impl std::fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}/{} hp", self.name, self.hp, self.total_hp)?;
        if !self.effects.is_empty() {
            let effects: Vec<String> =
                self.effects.iter().map(|(name, turns)| format!("{} ({})", name, turns)).collect();
            write!(f, " [{}]", effects.join(", "))?;
        }
        Ok(())
    }
}

/// What happened to one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The action went through. The battle may have moved on to a new turn.
    Resolved,
    Blocked { unit: UnitId, action: ActionKind, reason: BlockReason },
    Rejected(InputError),
    Status(UnitStatus),
    Unacted(Vec<UnitStatus>),
    Help,
    AbortCancelled,
    Finished(BattleOutcome),
}

impl CommandOutcome {
    /// Player-facing text for outcomes that are not already narrated by events.
    pub fn describe(&self) -> Option<String> {
        match self {
            CommandOutcome::Rejected(error) => Some(error.to_string()),
            CommandOutcome::Status(status) => Some(status.to_string()),
            CommandOutcome::Unacted(statuses) if statuses.is_empty() => {
                Some("Every bird has acted this turn.".to_string())
            }
            CommandOutcome::Unacted(statuses) => Some(
                statuses
                    .iter()
                    .map(|status| format!("  {}", status))
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
            CommandOutcome::Help => Some(HELP_TEXT.to_string()),
            CommandOutcome::AbortCancelled => Some("The battle goes on.".to_string()),
            CommandOutcome::Resolved
            | CommandOutcome::Blocked { .. }
            | CommandOutcome::Finished(_) => None,
        }
    }
}

impl Command {
    pub fn parse(input: &str) -> Result<Command, InputError> {
        let mut words = input.split_whitespace();
        let Some(verb) = words.next() else {
            return Err(InputError::Empty);
        };
        let args: Vec<&str> = words.collect();
        let unit_ref = |arg: &str| arg.to_lowercase();

        match verb.to_lowercase().as_str() {
            "attack" | "a" => {
                let (ally, target) = one_or_two(&args, "attack", "an ally")?;
                Ok(Command::Attack { ally: unit_ref(ally), target: target.map(unit_ref) })
            }
            "support" | "s" => {
                let (ally, target) = one_or_two(&args, "support", "an ally")?;
                Ok(Command::Support { ally: unit_ref(ally), target: target.map(unit_ref) })
            }
            "chili" | "charge" | "c" => {
                let ally = exactly_one(&args, "chili", "an ally")?;
                Ok(Command::Charged { ally: unit_ref(ally) })
            }
            "stat" => {
                let unit = exactly_one(&args, "stat", "a unit")?;
                Ok(Command::Stat { unit: unit_ref(unit) })
            }
            "turns" => no_arguments(&args, "turns").map(|_| Command::Turns),
            "help" => no_arguments(&args, "help").map(|_| Command::Help),
            "abort" => match exactly_one(&args, "abort", "a confirmation")? {
                "CONFIRM" => Ok(Command::Abort { confirmed: true }),
                "no" => Ok(Command::Abort { confirmed: false }),
                other => Err(InputError::InvalidConfirmation(other.to_string())),
            },
            other => Err(InputError::UnknownCommand(other.to_string())),
        }
    }
}

fn one_or_two<'a>(
    args: &[&'a str],
    command: &'static str,
    argument: &'static str,
) -> Result<(&'a str, Option<&'a str>), InputError> {
    match *args {
        [] => Err(InputError::MissingArgument { command, argument }),
        [first] => Ok((first, None)),
        [first, second] => Ok((first, Some(second))),
        _ => Err(InputError::TooManyArguments { command, max: 2 }),
    }
}

fn exactly_one<'a>(args: &[&'a str], command: &'static str, argument: &'static str) -> Result<&'a str, InputError> {
    match *args {
        [] => Err(InputError::MissingArgument { command, argument }),
        [only] => Ok(only),
        _ => Err(InputError::TooManyArguments { command, max: 1 }),
    }
}

fn no_arguments(args: &[&str], command: &'static str) -> Result<(), InputError> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(InputError::TooManyArguments { command, max: 0 })
    }
}

impl Battlefield {
    /// Resolves a unit reference: an exact key wins, otherwise the reference must
    /// be the prefix of exactly one unit's key.
    pub fn resolve_unit(&self, reference: &str) -> Result<UnitId, InputError> {
        if let Some(unit) = self.find(reference) {
            return Ok(unit.id);
        }

        let matches: Vec<&Unit> = self.units().filter(|unit| unit.key.starts_with(reference)).collect();
        match matches.as_slice() {
            [] => Err(InputError::UnknownUnit(reference.to_string())),
            [unit] => Ok(unit.id),
            _ => Err(InputError::AmbiguousUnit {
                reference: reference.to_string(),
                candidates: matches.iter().map(|unit| unit.key.clone()).collect(),
            }),
        }
    }

    fn resolve_on(&self, reference: &str, side: Side) -> Result<UnitId, InputError> {
        let id = self.resolve_unit(reference)?;
        match (self.side_of(id), side) {
            (Some(found), wanted) if found == wanted => Ok(id),
            (_, Side::Ally) => Err(InputError::NotAnAlly(reference.to_string())),
            (_, Side::Enemy) => Err(InputError::NotAnEnemy(reference.to_string())),
        }
    }

    /// The ally ordered to act, provided it still owes an action this turn.
    fn acting_ally(&self, reference: &str) -> Result<UnitId, InputError> {
        let ally = self.resolve_on(reference, Side::Ally)?;
        if self.has_acted(ally) {
            return Err(InputError::AlreadyActed(self.name_of(ally).to_string()));
        }
        Ok(ally)
    }

    /// Applies one command. Input problems and blocked actions come back as
    /// outcomes; only broken invariants surface as errors.
    pub fn execute(&mut self, command: Command) -> BattleResult<CommandOutcome> {
        if let Some(outcome) = self.outcome() {
            return Ok(CommandOutcome::Finished(outcome));
        }
        debug!(?command, "executing command");

        match command {
            Command::Attack { ally, target } => {
                let ally = match self.acting_ally(&ally) {
                    Ok(ally) => ally,
                    Err(error) => return Ok(CommandOutcome::Rejected(error)),
                };
                if let Some(blocked) = self.check_blocked(ally, ActionKind::Attack) {
                    return Ok(blocked);
                }
                let target = match self.attack_target(ally, target.as_deref()) {
                    Ok(target) => target,
                    Err(error) => return Ok(CommandOutcome::Rejected(error)),
                };
                self.begin_action(ally);
                self.attack_with(ally, target, 100)?;
                self.finish_action()
            }
            Command::Support { ally, target } => {
                let ally = match self.acting_ally(&ally) {
                    Ok(ally) => ally,
                    Err(error) => return Ok(CommandOutcome::Rejected(error)),
                };
                if let Some(blocked) = self.check_blocked(ally, ActionKind::Support) {
                    return Ok(blocked);
                }
                let target = match target {
                    Some(target) => match self.resolve_on(&target, Side::Ally) {
                        Ok(target) => target,
                        Err(error) => return Ok(CommandOutcome::Rejected(error)),
                    },
                    None => ally,
                };
                self.begin_action(ally);
                self.use_support(ally, target)?;
                self.finish_action()
            }
            Command::Charged { ally } => {
                let ally = match self.acting_ally(&ally) {
                    Ok(ally) => ally,
                    Err(error) => return Ok(CommandOutcome::Rejected(error)),
                };
                if let Some(blocked) = self.check_blocked(ally, ActionKind::Charged) {
                    return Ok(blocked);
                }
                self.begin_action(ally);
                self.use_charged(ally)?;
                self.finish_action()
            }
            Command::Stat { unit } => Ok(match self.resolve_unit(&unit) {
                Ok(id) => CommandOutcome::Status(UnitStatus::of(self.require(id)?)),
                Err(error) => CommandOutcome::Rejected(error),
            }),
            Command::Turns => Ok(CommandOutcome::Unacted(
                self.allies()
                    .iter()
                    .filter(|unit| !self.has_acted(unit.id))
                    .map(UnitStatus::of)
                    .collect(),
            )),
            Command::Abort { confirmed: true } => {
                self.finish(BattleOutcome::Aborted);
                Ok(CommandOutcome::Finished(BattleOutcome::Aborted))
            }
            Command::Abort { confirmed: false } => Ok(CommandOutcome::AbortCancelled),
            Command::Help => Ok(CommandOutcome::Help),
        }
    }

    /// Reports and returns a `Blocked` outcome when `unit` may not take `action` now.
    fn check_blocked(&mut self, unit: UnitId, action: ActionKind) -> Option<CommandOutcome> {
        let blocking = self.unit(unit)?.blocking_effects(action);
        let reason = if !blocking.is_empty() {
            BlockReason::Effects(blocking)
        } else if action == ActionKind::Charged && self.charge() != MAX_CHARGE {
            BlockReason::ChargeNotFull(self.charge())
        } else {
            return None;
        };

        debug!(unit = %unit, %action, %reason, "action blocked");
        self.bus.push(BattleEvent::ActionBlocked { unit, action, reason: reason.clone() });
        Some(CommandOutcome::Blocked { unit, action, reason })
    }

    fn attack_target(&self, ally: UnitId, reference: Option<&str>) -> Result<UnitId, InputError> {
        if let Some(reference) = reference {
            return self.resolve_on(reference, Side::Enemy);
        }

        let attack = self.unit(ally).and_then(Unit::loadout).map(|loadout| &loadout.attack);
        match attack {
            Some(attack) if attack.targets_all() => self
                .ids_on(Side::Enemy)
                .first()
                .copied()
                .ok_or_else(|| InputError::TargetRequired(attack.name().to_string())),
            Some(attack) => Err(InputError::TargetRequired(attack.name().to_string())),
            None => Err(InputError::TargetRequired(ActionKind::Attack.to_string())),
        }
    }

    fn begin_action(&mut self, ally: UnitId) {
        self.acted.push(ally);
        self.state = GameState::ResolvingAllyAction;
    }

    /// Settles deaths after an ally's action and hands over to the enemies once every
    /// ally that can act has done so.
    fn finish_action(&mut self) -> BattleResult<CommandOutcome> {
        if let Some(outcome) = self.death_check() {
            return Ok(CommandOutcome::Finished(outcome));
        }

        if self.ally_phase_complete() {
            self.run_enemy_turn()?;
        } else {
            self.state = GameState::AwaitingAllyInput;
        }

        Ok(match self.outcome() {
            Some(outcome) => CommandOutcome::Finished(outcome),
            None => CommandOutcome::Resolved,
        })
    }
}
