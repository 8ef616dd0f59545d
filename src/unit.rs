use crate::effects::{Effect, Polarity, Release};
use crate::errors::{ContractViolation, SetupError};
use crate::progression::scaled_stat;
use schema::{AbilityTable, AttackAbility, Bird, ChargedAbility, ClassName, SupportAbility};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Battlefield-unique unit identity. Ids are handed out sequentially and never reused,
/// not even across waves.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Ally,
    Enemy,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Ally => Side::Enemy,
            Side::Enemy => Side::Ally,
        }
    }
}

/// The three things an ally can do on its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    Attack,
    Support,
    Charged,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Attack => write!(f, "attack"),
            ActionKind::Support => write!(f, "use support"),
            ActionKind::Charged => write!(f, "use chili"),
        }
    }
}

/// The abilities an ally brings into battle, resolved from the ability table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loadout {
    pub attack: AttackAbility,
    pub support: SupportAbility,
    pub charged: ChargedAbility,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitKind {
    Ally {
        bird: Bird,
        class: ClassName,
        /// Base attack every damage percentage is taken from.
        attack: i32,
        loadout: Box<Loadout>,
    },
    Enemy {
        damage: i32,
    },
}

/// A unit before it joins a battlefield and receives an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitSpec {
    pub key: String,
    pub hp: i32,
    pub kind: UnitKind,
}

impl UnitSpec {
    /// Builds an ally for `class`, scaling its bird's stats to `level`.
    /// The class name becomes the ally's roster key.
    pub fn ally(class: ClassName, table: &AbilityTable, level: u32) -> Result<Self, SetupError> {
        let bird = class.bird();
        let bird_data = table.get_bird(bird).ok_or(SetupError::UnknownBird(bird))?;
        let class_data = table.get_class(class).ok_or(SetupError::UnknownClass(class))?;

        Ok(Self {
            key: class.to_string(),
            hp: scaled_stat(bird_data.hp, level),
            kind: UnitKind::Ally {
                bird,
                class,
                attack: scaled_stat(bird_data.attack, level),
                loadout: Box::new(Loadout {
                    attack: class_data.attack.clone(),
                    support: class_data.support.clone(),
                    charged: bird_data.charged.clone(),
                }),
            },
        })
    }

    pub fn enemy(name: &str, hp: i32, damage: i32) -> Self {
        Self {
            key: name.to_lowercase(),
            hp,
            kind: UnitKind::Enemy { damage },
        }
    }

    pub fn side(&self) -> Side {
        match self.kind {
            UnitKind::Ally { .. } => Side::Ally,
            UnitKind::Enemy { .. } => Side::Enemy,
        }
    }
}

/// A combatant on the battlefield.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    pub id: UnitId,
    pub key: String,
    hp: i32,
    total_hp: i32,
    pos_effects: Vec<Effect>,
    neg_effects: Vec<Effect>,
    pub kind: UnitKind,
}

impl Unit {
    pub fn new(id: UnitId, spec: UnitSpec) -> Self {
        Self {
            id,
            key: spec.key,
            hp: spec.hp,
            total_hp: spec.hp,
            pos_effects: Vec::new(),
            neg_effects: Vec::new(),
            kind: spec.kind,
        }
    }

    pub fn hp(&self) -> i32 {
        self.hp
    }

    pub fn total_hp(&self) -> i32 {
        self.total_hp
    }

    /// Health may go to or below zero, but never above `total_hp`.
    pub fn set_hp(&mut self, hp: i32) {
        self.hp = hp.min(self.total_hp);
    }

    pub fn set_total_hp(&mut self, total_hp: i32) {
        self.total_hp = total_hp;
        self.set_hp(self.hp);
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0
    }

    pub fn side(&self) -> Side {
        match self.kind {
            UnitKind::Ally { .. } => Side::Ally,
            UnitKind::Enemy { .. } => Side::Enemy,
        }
    }

    pub fn is_ally(&self) -> bool {
        self.side() == Side::Ally
    }

    /// Base attack for allies, flat damage for enemies.
    pub fn attack_stat(&self) -> i32 {
        match self.kind {
            UnitKind::Ally { attack, .. } => attack,
            UnitKind::Enemy { damage } => damage,
        }
    }

    pub fn loadout(&self) -> Option<&Loadout> {
        match &self.kind {
            UnitKind::Ally { loadout, .. } => Some(loadout),
            UnitKind::Enemy { .. } => None,
        }
    }

    /// Health as a whole percentage of total health.
    pub fn hp_percent(&self) -> i32 {
        if self.total_hp <= 0 {
            return 0;
        }
        self.hp * 100 / self.total_hp
    }

    pub fn pos_effects(&self) -> &[Effect] {
        &self.pos_effects
    }

    pub fn neg_effects(&self) -> &[Effect] {
        &self.neg_effects
    }

    /// Positive effects first, then negative ones, each in insertion order.
    pub fn effects(&self) -> impl Iterator<Item = &Effect> {
        self.pos_effects.iter().chain(self.neg_effects.iter())
    }

    pub fn effect_names(&self) -> Vec<String> {
        self.effects().map(|effect| effect.name.clone()).collect()
    }

    pub fn effect(&self, polarity: Polarity, name: &str) -> Option<&Effect> {
        self.collection(polarity)?
            .iter()
            .find(|effect| effect.name == name)
    }

    pub fn is_immune(&self) -> bool {
        self.effects().any(Effect::is_immunizing)
    }

    pub fn is_incapacitated(&self) -> bool {
        self.effects().any(Effect::is_incapacitating)
    }

    /// Names of the effects that currently forbid `action`.
    pub fn blocking_effects(&self, action: ActionKind) -> Vec<String> {
        self.effects()
            .filter(|effect| !effect.allows(action))
            .map(|effect| effect.name.clone())
            .collect()
    }

    /// Attaches `effects` as negative effects and returns the ones that stuck.
    ///
    /// An immune unit accepts nothing and the call returns an empty list. A positive
    /// effect anywhere in the batch is a contract violation and nothing is applied.
    pub fn add_negative_effects(
        &mut self,
        effects: Vec<Effect>,
    ) -> Result<Vec<Effect>, ContractViolation> {
        if self.is_immune() {
            return Ok(Vec::new());
        }

        if let Some(effect) = effects.iter().find(|e| e.natural_polarity() == Polarity::Positive) {
            return Err(ContractViolation::PositiveAsNegative(effect.name.clone()));
        }

        Ok(effects
            .into_iter()
            .map(|effect| self.attach(effect, Polarity::Negative))
            .collect())
    }

    /// Attaches `effects` as positive effects. A negative effect anywhere in the
    /// batch is a contract violation and nothing is applied.
    pub fn add_positive_effects(
        &mut self,
        effects: Vec<Effect>,
    ) -> Result<Vec<Effect>, ContractViolation> {
        if let Some(effect) = effects.iter().find(|e| e.natural_polarity() == Polarity::Negative) {
            return Err(ContractViolation::NegativeAsPositive(effect.name.clone()));
        }

        Ok(effects
            .into_iter()
            .map(|effect| self.attach(effect, Polarity::Positive))
            .collect())
    }

    fn attach(&mut self, mut effect: Effect, polarity: Polarity) -> Effect {
        effect.polarity = polarity;
        effect.wearer = Some(self.id);

        self.release(polarity, &effect.name, Release::Replaced);

        let boost = effect.on_enter(self.total_hp);
        let attached = effect.clone();
        if let Some(collection) = self.collection_mut(polarity) {
            collection.push(effect);
        }

        if boost != 0 {
            self.total_hp += boost;
            self.set_hp(self.hp + boost);
        }
        attached
    }

    /// Removes every cleansable negative effect and returns their names.
    pub fn cleanse(&mut self) -> Vec<String> {
        self.release_where(Polarity::Negative, Release::Cleansed, Effect::can_be_cleansed)
    }

    /// Removes every dispellable positive effect and returns their names.
    pub fn dispel(&mut self) -> Vec<String> {
        self.release_where(Polarity::Positive, Release::Dispelled, Effect::can_be_dispelled)
    }

    /// Counts down every effect of one polarity and returns the names that reached zero.
    /// The effects themselves stay attached until [`Unit::expire`] removes them.
    pub fn tick_effects(&mut self, polarity: Polarity) -> Vec<String> {
        let Some(collection) = self.collection_mut(polarity) else {
            return Vec::new();
        };

        collection
            .iter_mut()
            .filter_map(|effect| {
                effect.turns = effect.turns.saturating_sub(1);
                (effect.turns == 0).then(|| effect.name.clone())
            })
            .collect()
    }

    /// Fires the exit hook of an effect and removes it.
    pub fn expire(&mut self, polarity: Polarity, name: &str) -> bool {
        self.release(polarity, name, Release::Expired).is_some()
    }

    fn release_where(
        &mut self,
        polarity: Polarity,
        release: Release,
        allowed: fn(&Effect) -> bool,
    ) -> Vec<String> {
        let names: Vec<String> = self
            .collection(polarity)
            .map(|collection| {
                collection
                    .iter()
                    .filter(|effect| allowed(effect))
                    .map(|effect| effect.name.clone())
                    .collect()
            })
            .unwrap_or_default();

        names
            .into_iter()
            .filter(|name| self.release(polarity, name, release).is_some())
            .collect()
    }

    fn release(&mut self, polarity: Polarity, name: &str, release: Release) -> Option<Effect> {
        let collection = self.collection_mut(polarity)?;
        let index = collection.iter().position(|effect| effect.name == name)?;
        let effect = collection.remove(index);

        let shrink = effect.on_release(release);
        if shrink != 0 {
            self.set_total_hp(self.total_hp - shrink);
        }
        Some(effect)
    }

    fn collection(&self, polarity: Polarity) -> Option<&Vec<Effect>> {
        match polarity {
            Polarity::Positive => Some(&self.pos_effects),
            Polarity::Negative => Some(&self.neg_effects),
            Polarity::Undefined => None,
        }
    }

    fn collection_mut(&mut self, polarity: Polarity) -> Option<&mut Vec<Effect>> {
        match polarity {
            Polarity::Positive => Some(&mut self.pos_effects),
            Polarity::Negative => Some(&mut self.neg_effects),
            Polarity::Undefined => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::EffectKind;
    use pretty_assertions::assert_eq;

    fn dummy(hp: i32) -> Unit {
        Unit::new(UnitId(0), UnitSpec::enemy("Dummy", hp, 10))
    }

    #[test]
    fn hp_is_clamped_to_total_on_write() {
        let mut unit = dummy(100);
        unit.set_hp(150);
        assert_eq!(unit.hp(), 100);

        unit.set_hp(-20);
        assert_eq!(unit.hp(), -20);
        assert!(unit.is_dead());
    }

    #[test]
    fn lowering_total_hp_pulls_hp_down() {
        let mut unit = dummy(100);
        unit.set_total_hp(80);
        assert_eq!(unit.hp(), 80);
    }

    #[test]
    fn same_name_replaces_previous_instance() {
        let mut unit = dummy(100);
        unit.add_positive_effects(vec![Effect::new("Protect", 2, EffectKind::Shield { effectiveness: 55 })])
            .unwrap();
        unit.add_positive_effects(vec![Effect::new("Protect", 4, EffectKind::Counter { effectiveness: 80 })])
            .unwrap();

        assert_eq!(unit.pos_effects().len(), 1);
        assert_eq!(unit.pos_effects()[0].turns, 4);
        assert_eq!(unit.pos_effects()[0].kind, EffectKind::Counter { effectiveness: 80 });
    }

    #[test]
    fn undefined_polarity_adopts_collection() {
        let mut unit = dummy(100);
        let applied = unit
            .add_negative_effects(vec![Effect::new("Attack", 3, EffectKind::ForceTarget { target: UnitId(7) })])
            .unwrap();

        assert_eq!(applied[0].polarity, Polarity::Negative);
        assert_eq!(applied[0].wearer, Some(UnitId(0)));
        assert!(unit.effect(Polarity::Negative, "Attack").is_some());
    }

    #[test]
    fn wrong_polarity_applies_nothing() {
        let mut unit = dummy(100);
        let result = unit.add_negative_effects(vec![
            Effect::new("Volley", 3, EffectKind::Weaken { effectiveness: 35 }),
            Effect::new("Protect", 2, EffectKind::Shield { effectiveness: 55 }),
        ]);

        assert_eq!(result, Err(ContractViolation::PositiveAsNegative("Protect".to_string())));
        assert!(unit.neg_effects().is_empty());
    }

    #[test]
    fn tick_reports_only_finished_effects() {
        let mut unit = dummy(100);
        unit.add_negative_effects(vec![
            Effect::new("Heavy Metal", 1, EffectKind::Knock),
            Effect::new("Volley", 3, EffectKind::Weaken { effectiveness: 35 }),
        ])
        .unwrap();

        assert_eq!(unit.tick_effects(Polarity::Negative), vec!["Heavy Metal".to_string()]);
        assert!(unit.expire(Polarity::Negative, "Heavy Metal"));
        assert_eq!(unit.effect_names(), vec!["Volley".to_string()]);
        assert_eq!(unit.neg_effects()[0].turns, 2);
    }
}
