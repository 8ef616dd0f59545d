//! Drives the turn cycle: effect countdowns, periodic effects, the enemy phase and
//! the hand-over back to the allies.
//!
//! Each half of the cycle counts down one polarity per side. When the allies' turn
//! starts, enemy negatives and ally positives tick; when the enemies' turn starts,
//! enemy positives and ally negatives tick.

use crate::battle::battlefield::Battlefield;
use crate::battle::state::{BattleEvent, BlockReason, GameState};
use crate::effects::{Polarity, TurnEnd};
use crate::errors::BattleResult;
use crate::unit::{ActionKind, Side, UnitId};
use tracing::{debug, info};

impl Battlefield {
    /// Opens the first ally turn. Does nothing once the battle has started.
    pub fn start(&mut self) -> BattleResult<()> {
        if self.turn == 0 && !self.is_finished() {
            self.start_ally_turn()?;
        }
        Ok(())
    }

    /// True once every ally that can still act has acted this turn.
    pub fn ally_phase_complete(&self) -> bool {
        self.unacted_allies().is_empty()
    }

    /// Starts a new ally turn. If no ally is able to act, the enemies go again
    /// straight away until someone can, or the battle ends.
    pub(crate) fn start_ally_turn(&mut self) -> BattleResult<()> {
        loop {
            self.turn += 1;
            self.acted.clear();
            self.state = GameState::AwaitingAllyInput;
            info!(turn = self.turn, wave = self.wave(), "ally turn started");
            self.bus.push(BattleEvent::TurnStarted { turn: self.turn });

            self.tick_effects(&[(Side::Enemy, Polarity::Negative), (Side::Ally, Polarity::Positive)]);
            self.run_end_of_turn(TurnEnd::EnemiesTurnEnded)?;
            if self.is_finished() || !self.ally_phase_complete() {
                return Ok(());
            }

            debug!(turn = self.turn, "no ally can act, skipping to the enemies");
            self.enemy_phase()?;
            if self.is_finished() {
                return Ok(());
            }
        }
    }

    /// Runs the enemies' half of the cycle, then opens the next ally turn.
    pub(crate) fn run_enemy_turn(&mut self) -> BattleResult<()> {
        self.enemy_phase()?;
        if !self.is_finished() {
            self.start_ally_turn()?;
        }
        Ok(())
    }

    fn enemy_phase(&mut self) -> BattleResult<()> {
        self.state = GameState::EnemyTurn;
        debug!(turn = self.turn, "enemy turn started");

        self.tick_effects(&[(Side::Enemy, Polarity::Positive), (Side::Ally, Polarity::Negative)]);
        self.run_end_of_turn(TurnEnd::AlliesTurnEnded)?;
        if self.is_finished() {
            return Ok(());
        }

        for enemy in self.ids_on(Side::Enemy) {
            // Killed earlier this phase, or swept away with its wave.
            let Some(unit) = self.unit(enemy) else {
                continue;
            };

            let blocking = unit.blocking_effects(ActionKind::Attack);
            if !blocking.is_empty() {
                self.bus.push(BattleEvent::ActionBlocked {
                    unit: enemy,
                    action: ActionKind::Attack,
                    reason: BlockReason::Effects(blocking),
                });
                continue;
            }

            let Some(target) = self.enemy_ai.choose_target(enemy, self) else {
                break;
            };
            self.attack_with(enemy, target, 100)?;

            if self.death_check().is_some() {
                return Ok(());
            }
        }

        Ok(())
    }

    /// Counts down every effect in the given side/polarity groups, then expires the
    /// ones that hit zero. Countdown finishes everywhere before any exit hook runs.
    fn tick_effects(&mut self, groups: &[(Side, Polarity)]) {
        let mut expired: Vec<(UnitId, Polarity, String)> = Vec::new();

        for &(side, polarity) in groups {
            for id in self.ids_on(side) {
                if let Some(unit) = self.unit_mut(id) {
                    expired.extend(unit.tick_effects(polarity).into_iter().map(|name| (id, polarity, name)));
                }
            }
        }

        for (id, polarity, name) in expired {
            let removed = self.unit_mut(id).is_some_and(|unit| unit.expire(polarity, &name));
            if removed {
                debug!(unit = %id, effect = %name, "effect expired");
                self.bus.push(BattleEvent::EffectExpired { target: id, effect: name });
            }
        }
    }

    /// Fires every effect's end-of-turn hook, checking for deaths after each one.
    fn run_end_of_turn(&mut self, phase: TurnEnd) -> BattleResult<()> {
        for effect_ref in self.effect_refs() {
            let Some(effect) = self.resolve(&effect_ref) else {
                continue;
            };
            effect.end_of_turn(self, effect_ref.wearer, phase)?;

            if self.death_check().is_some() {
                break;
            }
        }
        Ok(())
    }
}
