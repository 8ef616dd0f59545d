//! The damage and heal pipelines every ability, reaction and periodic effect
//! goes through.
//!
//! Hook loops walk a snapshot of `(wearer, polarity, name)` references and look
//! each effect up again right before calling it. A reaction fired by one hook may
//! add, replace or remove effects further down the list; removed ones are skipped
//! and replaced ones run with their new values.

use crate::battle::battlefield::{Battlefield, CHARGE_PER_HIT};
use crate::battle::state::BattleEvent;
use crate::effects::{Effect, Hit};
use crate::errors::BattleResult;
use crate::unit::UnitId;
use tracing::{debug, warn};

/// An amount of damage or healing before it is resolved to a whole number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Damage {
    Flat(i32),
    /// `multiplier`% of `base`, truncated.
    Percent { base: i32, multiplier: i32 },
}

impl Damage {
    pub fn of(base: i32, multiplier: i32) -> Self {
        Damage::Percent { base, multiplier }
    }

    pub fn amount(self) -> i32 {
        match self {
            Damage::Flat(amount) => amount,
            Damage::Percent { base, multiplier } => {
                let amount = i64::from(base) * i64::from(multiplier) / 100;
                i32::try_from(amount).unwrap_or(if amount < 0 { i32::MIN } else { i32::MAX })
            }
        }
    }

    /// `multiplier`% of this amount, resolved first.
    pub fn scale(self, multiplier: i32) -> Self {
        Damage::of(self.amount(), multiplier)
    }
}

impl From<i32> for Damage {
    fn from(amount: i32) -> Self {
        Damage::Flat(amount)
    }
}

impl Battlefield {
    /// Resolves one hit on `victim`.
    ///
    /// Unless `direct` is set, the victim may be swapped by redirecting effects first.
    /// Returns the hit as it finally landed, with only the effects that actually stuck.
    pub fn deal_damage(
        &mut self,
        victim: UnitId,
        damage: impl Into<Damage>,
        source: UnitId,
        effects: Vec<Effect>,
        direct: bool,
    ) -> BattleResult<Hit> {
        let damage = damage.into().amount();
        let victim = if direct { victim } else { self.get_target(victim, source) };
        self.require(victim)?;

        let mut hit = Hit { victim, source, damage, effects };
        debug!(victim = %hit.victim, source = %hit.source, damage = hit.damage, direct, "incoming hit");

        for effect_ref in self.effect_refs() {
            if let Some(effect) = self.resolve(&effect_ref) {
                hit = effect.on_hit(effect_ref.wearer, hit);
            }
        }
        debug!(victim = %hit.victim, damage = hit.damage, "hit after on-hit hooks");

        self.add_charge(CHARGE_PER_HIT);

        let unit = self.require_mut(hit.victim)?;
        unit.set_hp(unit.hp() - hit.damage);
        let remaining_hp = unit.hp();
        self.bus.push(BattleEvent::DamageDealt {
            source: hit.source,
            victim: hit.victim,
            damage: hit.damage,
            remaining_hp,
        });

        let effects = std::mem::take(&mut hit.effects);
        hit.effects = self.add_negative_effects(hit.victim, effects)?;

        for effect_ref in self.effect_refs() {
            if let Some(effect) = self.resolve(&effect_ref) {
                effect.after_hit(self, effect_ref.wearer, &hit)?;
            }
        }

        Ok(hit)
    }

    /// Heals `target`, letting every effect on the field rewrite the amount first.
    /// Returns the amount that was applied before clamping to total health.
    pub fn heal(&mut self, target: UnitId, heal: impl Into<Damage>) -> BattleResult<i32> {
        let mut heal = heal.into().amount();
        self.require(target)?;

        for effect_ref in self.effect_refs() {
            if let Some(effect) = self.resolve(&effect_ref) {
                heal = effect.on_heal(self, effect_ref.wearer, target, heal)?;
            }
        }

        let unit = self.require_mut(target)?;
        unit.set_hp(unit.hp() + heal);
        let new_hp = unit.hp();
        debug!(target = %target, heal, new_hp, "healed");
        self.bus.push(BattleEvent::Healed { target, amount: heal, new_hp });

        for effect_ref in self.effect_refs() {
            if let Some(effect) = self.resolve(&effect_ref) {
                effect.after_heal(self, effect_ref.wearer, target, heal)?;
            }
        }

        Ok(heal)
    }

    /// Works out who `attacker` really hits when aiming at `target`.
    ///
    /// The attacker's own effects get the first say, then the effects of whoever
    /// that picked. Within a pass the last effect to change the target wins.
    pub fn get_target(&mut self, target: UnitId, attacker: UnitId) -> UnitId {
        let first = self.redirect_pass(attacker, target, attacker);
        let resolved = self.redirect_pass(first, first, attacker);

        if resolved != target {
            debug!(attacker = %attacker, from = %target, to = %resolved, "attack redirected");
            self.bus.push(BattleEvent::Redirected { attacker, from: target, to: resolved });
        }
        resolved
    }

    fn redirect_pass(&self, owner: UnitId, target: UnitId, attacker: UnitId) -> UnitId {
        let mut resolved = target;
        for effect_ref in self.effect_refs_of(owner) {
            if let Some(effect) = self.resolve(&effect_ref) {
                resolved = effect.redirect(effect_ref.wearer, resolved, attacker);
            }
        }

        if resolved != target && self.unit(resolved).is_none() {
            warn!(from = %target, to = %resolved, "redirect to a unit no longer on the field ignored");
            return target;
        }
        resolved
    }

    /// An attack by `actor`: its own effects scale the damage, then the hit resolves.
    pub fn strike(
        &mut self,
        actor: UnitId,
        target: UnitId,
        damage: impl Into<Damage>,
        effects: Vec<Effect>,
        direct: bool,
    ) -> BattleResult<Hit> {
        let mut damage = damage.into().amount();
        for effect_ref in self.effect_refs_of(actor) {
            if let Some(effect) = self.resolve(&effect_ref) {
                damage = effect.on_attack(damage);
            }
        }
        self.deal_damage(target, damage, actor, effects, direct)
    }
}
