use crate::battle::ai::{Behavior, LowestHealth};
use crate::battle::state::{BattleEvent, BattleOutcome, BattleRng, EventBus, GameState};
use crate::effects::{Effect, Polarity};
use crate::errors::{BattleResult, ContractViolation, SetupError};
use crate::unit::{Side, Unit, UnitId, UnitKind, UnitSpec};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::{debug, info};

pub const MAX_CHARGE: u8 = 100;
/// Charge gained by every resolved hit.
pub const CHARGE_PER_HIT: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleConfig {
    pub starting_charge: u8,
    pub max_allies: usize,
    /// Level every ally's stats are scaled to before the battle starts.
    pub level: u32,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            starting_charge: 0,
            max_allies: 3,
            level: 0,
        }
    }
}

/// Held while a reactive effect runs, so the reaction cannot trigger itself again.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReactionLock {
    /// A wearer's re-attack reaction, keyed by effect name.
    Reaction(UnitId, String),
    /// Propagation across a side under one effect name: linked heals and shared
    /// storm damage.
    Link(Side, String),
}

/// Points at one effect on one unit. Hook loops iterate over these instead of the
/// effect collections themselves, since a hook may add or remove effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EffectRef {
    pub wearer: UnitId,
    pub polarity: Polarity,
    pub name: String,
}

/// Owns every unit in a battle along with the shared state they fight over.
#[derive(Debug)]
pub struct Battlefield {
    allies: Vec<Unit>,
    enemies: Vec<Unit>,
    waves: VecDeque<Vec<UnitSpec>>,
    wave: u32,
    next_id: u32,
    /// Display names of every unit that ever joined, kept after death for narration.
    names: HashMap<UnitId, String>,
    charge: u8,
    pub(crate) turn: u32,
    pub(crate) state: GameState,
    pub(crate) acted: Vec<UnitId>,
    locks: HashSet<ReactionLock>,
    pub(crate) enemy_ai: Box<dyn Behavior>,
    pub rng: BattleRng,
    pub bus: EventBus,
}

impl Battlefield {
    /// Builds a battlefield with the first wave on the field. No turn has started yet.
    pub fn new(
        allies: Vec<UnitSpec>,
        waves: Vec<Vec<UnitSpec>>,
        config: &BattleConfig,
        rng: BattleRng,
    ) -> Result<Self, SetupError> {
        if allies.is_empty() {
            return Err(SetupError::NoAllies);
        }
        if allies.len() > config.max_allies {
            return Err(SetupError::TooManyAllies {
                count: allies.len(),
                max: config.max_allies,
            });
        }
        if waves.is_empty() {
            return Err(SetupError::NoWaves);
        }
        if let Some(index) = waves.iter().position(Vec::is_empty) {
            return Err(SetupError::EmptyWave(index + 1));
        }

        let mut birds = HashSet::new();
        for spec in &allies {
            if let UnitKind::Ally { bird, .. } = spec.kind {
                if !birds.insert(bird) {
                    return Err(SetupError::DuplicateBird(bird));
                }
            }
        }
        check_unique_keys(&allies)?;
        for wave in &waves {
            check_unique_keys(wave)?;
        }

        let mut waves: VecDeque<Vec<UnitSpec>> = waves.into();
        let first_wave = waves.pop_front().unwrap_or_default();

        let mut battlefield = Self {
            allies: Vec::new(),
            enemies: Vec::new(),
            waves,
            wave: 1,
            next_id: 0,
            names: HashMap::new(),
            charge: config.starting_charge.min(MAX_CHARGE),
            turn: 0,
            state: GameState::AwaitingAllyInput,
            acted: Vec::new(),
            locks: HashSet::new(),
            enemy_ai: Box::new(LowestHealth),
            rng,
            bus: EventBus::new(),
        };

        battlefield.allies = allies.into_iter().map(|spec| battlefield.spawn(spec)).collect();
        battlefield.enemies = first_wave.into_iter().map(|spec| battlefield.spawn(spec)).collect();
        battlefield.bus.push(BattleEvent::WaveStarted { wave: 1 });

        Ok(battlefield)
    }

    /// Replaces the enemy targeting behaviour.
    pub fn with_behavior(mut self, behavior: Box<dyn Behavior>) -> Self {
        self.enemy_ai = behavior;
        self
    }

    fn spawn(&mut self, spec: UnitSpec) -> Unit {
        self.next_id += 1;
        let id = UnitId(self.next_id);
        self.names.insert(id, spec.key.clone());
        Unit::new(id, spec)
    }

    // --- Lookups ---

    pub fn allies(&self) -> &[Unit] {
        &self.allies
    }

    pub fn enemies(&self) -> &[Unit] {
        &self.enemies
    }

    pub fn units_on(&self, side: Side) -> &[Unit] {
        match side {
            Side::Ally => &self.allies,
            Side::Enemy => &self.enemies,
        }
    }

    /// Every unit on the field, allies first, each side in roster order.
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.allies.iter().chain(self.enemies.iter())
    }

    pub fn ids_on(&self, side: Side) -> Vec<UnitId> {
        self.units_on(side).iter().map(|unit| unit.id).collect()
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units().find(|unit| unit.id == id)
    }

    pub(crate) fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.allies
            .iter_mut()
            .chain(self.enemies.iter_mut())
            .find(|unit| unit.id == id)
    }

    pub fn require(&self, id: UnitId) -> Result<&Unit, ContractViolation> {
        self.unit(id).ok_or(ContractViolation::UnitNotOnField(id))
    }

    pub(crate) fn require_mut(&mut self, id: UnitId) -> Result<&mut Unit, ContractViolation> {
        self.unit_mut(id).ok_or(ContractViolation::UnitNotOnField(id))
    }

    pub fn find(&self, key: &str) -> Option<&Unit> {
        self.units().find(|unit| unit.key == key)
    }

    pub fn side_of(&self, id: UnitId) -> Option<Side> {
        self.unit(id).map(Unit::side)
    }

    /// True when both units are on the field on opposite sides.
    pub fn is_hostile(&self, a: UnitId, b: UnitId) -> bool {
        match (self.side_of(a), self.side_of(b)) {
            (Some(a), Some(b)) => a != b,
            _ => false,
        }
    }

    /// Display name of any unit that was ever on this battlefield.
    pub fn name_of(&self, id: UnitId) -> &str {
        self.names.get(&id).map_or("unknown", String::as_str)
    }

    /// Unit with the least current health. Ties go to the earliest in roster order.
    pub fn lowest_hp(&self, side: Side) -> Option<UnitId> {
        first_by(self.units_on(side), |unit, best| unit.hp() < best.hp())
    }

    /// Unit with the lowest health percentage. Ties go to the earliest in roster order.
    pub fn lowest_hp_percent(&self, side: Side) -> Option<UnitId> {
        first_by(self.units_on(side), |unit, best| unit.hp_percent() < best.hp_percent())
    }

    /// Unit with the most current health. Ties go to the earliest in roster order.
    pub fn healthiest(&self, side: Side) -> Option<UnitId> {
        first_by(self.units_on(side), |unit, best| unit.hp() > best.hp())
    }

    // --- Shared state ---

    pub fn charge(&self) -> u8 {
        self.charge
    }

    pub fn add_charge(&mut self, amount: u8) {
        self.set_charge(self.charge.saturating_add(amount));
    }

    pub(crate) fn set_charge(&mut self, charge: u8) {
        let old = self.charge;
        self.charge = charge.min(MAX_CHARGE);
        if old != self.charge {
            debug!(old, new = self.charge, "charge changed");
            self.bus.push(BattleEvent::ChargeChanged { old, new: self.charge });
        }
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn wave(&self) -> u32 {
        self.wave
    }

    pub fn remaining_waves(&self) -> usize {
        self.waves.len()
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn outcome(&self) -> Option<BattleOutcome> {
        self.state.outcome()
    }

    pub fn is_finished(&self) -> bool {
        self.outcome().is_some()
    }

    pub fn has_acted(&self, id: UnitId) -> bool {
        self.acted.contains(&id)
    }

    /// Allies that still owe an action this turn. Incapacitated allies owe nothing.
    pub fn unacted_allies(&self) -> Vec<UnitId> {
        self.allies
            .iter()
            .filter(|unit| !self.has_acted(unit.id) && !unit.is_incapacitated())
            .map(|unit| unit.id)
            .collect()
    }

    // --- Effects ---

    /// Snapshot of every effect on the field, in unit order then effect order.
    pub(crate) fn effect_refs(&self) -> Vec<EffectRef> {
        self.units().flat_map(unit_effect_refs).collect()
    }

    /// Snapshot of one unit's effects.
    pub(crate) fn effect_refs_of(&self, id: UnitId) -> Vec<EffectRef> {
        self.unit(id).map(unit_effect_refs).unwrap_or_default()
    }

    /// The effect a reference points at, if it is still attached.
    pub(crate) fn resolve(&self, effect: &EffectRef) -> Option<Effect> {
        self.unit(effect.wearer)?
            .effect(effect.polarity, &effect.name)
            .cloned()
    }

    pub fn add_negative_effects(&mut self, target: UnitId, effects: Vec<Effect>) -> BattleResult<Vec<Effect>> {
        let applied = self.require_mut(target)?.add_negative_effects(effects)?;
        self.report_applied(target, &applied);
        Ok(applied)
    }

    pub fn add_positive_effects(&mut self, target: UnitId, effects: Vec<Effect>) -> BattleResult<Vec<Effect>> {
        let applied = self.require_mut(target)?.add_positive_effects(effects)?;
        self.report_applied(target, &applied);
        Ok(applied)
    }

    fn report_applied(&mut self, target: UnitId, applied: &[Effect]) {
        for effect in applied {
            self.bus.push(BattleEvent::EffectApplied {
                target,
                effect: effect.name.clone(),
                turns: effect.turns,
            });
        }
    }

    pub fn cleanse(&mut self, target: UnitId) -> Vec<String> {
        let removed = self.unit_mut(target).map(Unit::cleanse).unwrap_or_default();
        for effect in &removed {
            self.bus.push(BattleEvent::EffectCleansed { target, effect: effect.clone() });
        }
        removed
    }

    pub fn dispel(&mut self, target: UnitId) -> Vec<String> {
        let removed = self.unit_mut(target).map(Unit::dispel).unwrap_or_default();
        for effect in &removed {
            self.bus.push(BattleEvent::EffectDispelled { target, effect: effect.clone() });
        }
        removed
    }

    /// Runs `reaction` unless `lock` is already held. The lock is released afterwards
    /// even if the reaction fails.
    pub(crate) fn with_lock<F>(&mut self, lock: ReactionLock, reaction: F) -> BattleResult<()>
    where
        F: FnOnce(&mut Self) -> BattleResult<()>,
    {
        if !self.locks.insert(lock.clone()) {
            debug!(?lock, "reaction already running, skipped");
            return Ok(());
        }

        let result = reaction(self);
        self.locks.remove(&lock);
        result
    }

    // --- Deaths & waves ---

    /// Removes dead units and decides whether the battle is over.
    /// Clearing the field with waves left brings in the next wave.
    pub fn death_check(&mut self) -> Option<BattleOutcome> {
        if self.is_finished() {
            return self.outcome();
        }

        let dead: Vec<UnitId> = self.units().filter(|unit| unit.is_dead()).map(|unit| unit.id).collect();
        for id in dead {
            info!(unit = self.name_of(id), "unit died");
            self.bus.push(BattleEvent::UnitDied { unit: id });
        }
        self.allies.retain(|unit| !unit.is_dead());
        self.enemies.retain(|unit| !unit.is_dead());

        if self.allies.is_empty() {
            self.finish(BattleOutcome::Lost);
        } else if self.enemies.is_empty() {
            match self.waves.pop_front() {
                Some(wave) => self.next_wave(wave),
                None => self.finish(BattleOutcome::Won),
            }
        }

        self.outcome()
    }

    fn next_wave(&mut self, wave: Vec<UnitSpec>) {
        self.bus.push(BattleEvent::WaveCleared { wave: self.wave });
        self.wave += 1;
        info!(wave = self.wave, enemies = wave.len(), "next wave");

        self.enemies = wave.into_iter().map(|spec| self.spawn(spec)).collect();
        self.acted.clear();
        self.bus.push(BattleEvent::WaveStarted { wave: self.wave });
    }

    pub(crate) fn finish(&mut self, outcome: BattleOutcome) {
        if self.is_finished() {
            return;
        }
        info!(?outcome, turn = self.turn, wave = self.wave, "battle ended");

        self.state = match outcome {
            BattleOutcome::Won => GameState::Won,
            BattleOutcome::Lost => GameState::Lost,
            BattleOutcome::Aborted => GameState::Aborted,
        };
        self.bus.push(BattleEvent::BattleEnded { outcome });
    }
}

fn unit_effect_refs(unit: &Unit) -> Vec<EffectRef> {
    unit.effects()
        .map(|effect| EffectRef {
            wearer: unit.id,
            polarity: effect.polarity,
            name: effect.name.clone(),
        })
        .collect()
}

/// First unit for which no later unit is strictly `better`.
fn first_by(units: &[Unit], better: impl Fn(&Unit, &Unit) -> bool) -> Option<UnitId> {
    let mut best: Option<&Unit> = None;
    for unit in units {
        match best {
            Some(current) if !better(unit, current) => {}
            _ => best = Some(unit),
        }
    }
    best.map(|unit| unit.id)
}

fn check_unique_keys(specs: &[UnitSpec]) -> Result<(), SetupError> {
    let mut seen = HashSet::new();
    for spec in specs {
        if !seen.insert(spec.key.as_str()) {
            return Err(SetupError::DuplicateKey(spec.key.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn enemy(name: &str, hp: i32) -> UnitSpec {
        UnitSpec::enemy(name, hp, 10)
    }

    fn field(allies: Vec<UnitSpec>, waves: Vec<Vec<UnitSpec>>) -> Result<Battlefield, SetupError> {
        Battlefield::new(allies, waves, &BattleConfig::default(), BattleRng::scripted(vec![50]))
    }

    #[test]
    fn setup_rejects_structural_problems() {
        assert_eq!(field(vec![], vec![vec![enemy("pig", 10)]]).err(), Some(SetupError::NoAllies));
        assert_eq!(field(vec![enemy("a", 1)], vec![]).err(), Some(SetupError::NoWaves));
        assert_eq!(
            field(vec![enemy("a", 1)], vec![vec![enemy("pig", 1)], vec![]]).err(),
            Some(SetupError::EmptyWave(2))
        );
        assert_eq!(
            field(vec![enemy("a", 1)], vec![vec![enemy("pig", 1), enemy("Pig", 2)]]).err(),
            Some(SetupError::DuplicateKey("pig".to_string()))
        );
        assert_eq!(
            field(
                vec![enemy("a", 1), enemy("b", 1), enemy("c", 1), enemy("d", 1)],
                vec![vec![enemy("pig", 1)]]
            )
            .err(),
            Some(SetupError::TooManyAllies { count: 4, max: 3 })
        );
    }

    #[test]
    fn ids_are_sequential_across_rosters() {
        let battlefield = field(vec![enemy("a", 10)], vec![vec![enemy("x", 10), enemy("y", 10)]]).unwrap();
        let ids: Vec<UnitId> = battlefield.units().map(|unit| unit.id).collect();
        assert_eq!(ids, vec![UnitId(1), UnitId(2), UnitId(3)]);
    }

    #[test]
    fn charge_is_clamped() {
        let mut battlefield = field(vec![enemy("a", 10)], vec![vec![enemy("x", 10)]]).unwrap();
        battlefield.add_charge(90);
        battlefield.add_charge(90);
        assert_eq!(battlefield.charge(), MAX_CHARGE);
    }

    #[test]
    fn ties_go_to_first_in_roster() {
        let battlefield =
            field(vec![enemy("a", 10)], vec![vec![enemy("x", 30), enemy("y", 30), enemy("z", 30)]]).unwrap();
        assert_eq!(battlefield.healthiest(Side::Enemy), Some(UnitId(2)));
        assert_eq!(battlefield.lowest_hp(Side::Enemy), Some(UnitId(2)));
    }

    #[test]
    fn lock_blocks_nested_reaction() {
        let mut battlefield = field(vec![enemy("a", 10)], vec![vec![enemy("x", 10)]]).unwrap();
        let lock = ReactionLock::Reaction(UnitId(1), "Counter".to_string());
        let mut runs = 0;

        battlefield
            .with_lock(lock.clone(), |battlefield| {
                runs += 1;
                battlefield.with_lock(lock.clone(), |_| {
                    runs += 1;
                    Ok(())
                })
            })
            .unwrap();

        assert_eq!(runs, 1);
        assert!(battlefield.locks.is_empty());
    }
}
