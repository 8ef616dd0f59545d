//! Timed status effects and the hooks through which they shape combat.
//!
//! Every effect is a variant of the closed [`EffectKind`] enum. The hooks below
//! match on the kind at the call site; an effect that does not care about a hook
//! passes its input through unchanged.

use crate::battle::battlefield::{Battlefield, ReactionLock};
use crate::battle::combat::Damage;
use crate::errors::BattleResult;
use crate::unit::{ActionKind, Side, UnitId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Polarity {
    /// Helps the wearer. Can be dispelled.
    Positive,
    /// Harms the wearer. Can be cleansed.
    Negative,
    /// Takes the polarity of whichever collection it is added to.
    Undefined,
}

/// How an effect left its wearer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    Expired,
    Cleansed,
    Dispelled,
    /// Evicted by a newer effect with the same name.
    Replaced,
}

/// Which half of the turn cycle just finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnEnd {
    AlliesTurnEnded,
    EnemiesTurnEnded,
}

/// How much a life drain heals the attacker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrainFormula {
    /// A percentage of the drained unit's total health.
    PercentOfVictimMaxHp(i32),
    /// A percentage of the damage that was dealt.
    PercentOfDamage(i32),
}

impl DrainFormula {
    pub fn amount(self, victim_total_hp: i32, damage: i32) -> i32 {
        match self {
            DrainFormula::PercentOfVictimMaxHp(percent) => Damage::of(victim_total_hp, percent).amount(),
            DrainFormula::PercentOfDamage(percent) => Damage::of(damage, percent).amount(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    /// Reduces damage taken by `effectiveness`%.
    Shield { effectiveness: i32 },
    /// The wearer can only attack `target`.
    ForceTarget { target: UnitId },
    /// Attackers take fixed damage back.
    ShockShield { damage: i32 },
    /// Attackers take `percentage`% of the damage back.
    ThornyShield { percentage: i32 },
    DamageBuff { effectiveness: i32 },
    DamageDebuff { effectiveness: i32 },
    /// Heals aimed at the wearer go to the weakest unit of the other side.
    Mimic,
    ToxicPoison { damage: i32 },
    ThornyPoison { damage: i32 },
    GooeyPoison { damage: i32 },
    Healing { healing: i32 },
    Knock,
    Freeze,
    /// Hits on the wearer land on `protector`; direct hits are shielded.
    Devotion { effectiveness: i32, protector: UnitId },
    Immunity,
    /// Heals the wearer's whole side by `effectiveness`% of damage taken.
    HealingShield { effectiveness: i32 },
    Weaken { effectiveness: i32 },
    ChargeBlock,
    /// Worn by the ambusher: hits aimed at it land on `decoy`, and hits on the
    /// decoy trigger a counter attack at `damage_percent`%.
    Ambush { decoy: UnitId, damage_percent: i32 },
    AncestralProtection { damage_decrease: i32, debuff_turns: u32 },
    Energize { charge_boost: u8, stun_chance: u32, stun_turns: u32 },
    /// The wearer repeats its attack at `attack_percent`% damage.
    Mirror { attack_percent: i32 },
    /// Damage to the wearer splashes onto its side at `shared_percent`%.
    ThunderStorm { shared_percent: i32 },
    LifeDrain { drain: DrainFormula },
    /// Heals on the wearer are shared with every unit linked under the same name.
    LinkedHeal,
    /// At the end of each turn the wearer loses `damage` and `steal_target` heals that much.
    LifeSteal { steal_target: UnitId, damage: i32 },
    /// Raises damage by `attack`% and total health by `health`%. `boost` is the exact
    /// health granted on entry, taken back on exit.
    GiantGrowth { attack: i32, health: i32, boost: i32 },
    Counter { effectiveness: i32 },
    /// Whenever the wearer hits an enemy, `bonus_attacker` attacks it too.
    GangUp { bonus_attacker: UnitId },
    FreezeBarrier { chance: u32, freeze_turns: u32 },
}

impl EffectKind {
    pub fn polarity(&self) -> Polarity {
        use EffectKind::*;

        match self {
            ForceTarget { .. } => Polarity::Undefined,
            DamageDebuff { .. } | Mimic | ToxicPoison { .. } | ThornyPoison { .. }
            | GooeyPoison { .. } | Knock | Freeze | Weaken { .. } | ChargeBlock
            | ThunderStorm { .. } | LifeDrain { .. } | LifeSteal { .. } => Polarity::Negative,
            Shield { .. } | ShockShield { .. } | ThornyShield { .. } | DamageBuff { .. }
            | Healing { .. } | Devotion { .. } | Immunity | HealingShield { .. } | Ambush { .. }
            | AncestralProtection { .. } | Energize { .. } | Mirror { .. } | LinkedHeal
            | GiantGrowth { .. } | Counter { .. } | GangUp { .. } | FreezeBarrier { .. } => {
                Polarity::Positive
            }
        }
    }
}

/// A status effect instance. The name is the ability that created it and is the
/// key it is stored under on its wearer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Effect {
    pub name: String,
    pub turns: u32,
    pub polarity: Polarity,
    /// Set when the effect is attached, never before.
    pub wearer: Option<UnitId>,
    pub kind: EffectKind,
}

impl Effect {
    pub fn new(name: impl Into<String>, turns: u32, kind: EffectKind) -> Self {
        Self {
            name: name.into(),
            turns,
            polarity: kind.polarity(),
            wearer: None,
            kind,
        }
    }

    /// The polarity fixed by the effect's kind, regardless of where it is stored.
    pub fn natural_polarity(&self) -> Polarity {
        self.kind.polarity()
    }

    // --- Flags ---

    pub fn can_attack(&self) -> bool {
        !self.is_stun()
    }

    pub fn can_support(&self) -> bool {
        !self.is_stun()
    }

    pub fn can_use_charge(&self) -> bool {
        !self.is_stun() && !matches!(self.kind, EffectKind::ChargeBlock)
    }

    pub fn can_be_dispelled(&self) -> bool {
        !matches!(self.kind, EffectKind::Immunity)
    }

    pub fn can_be_cleansed(&self) -> bool {
        true
    }

    pub fn is_immunizing(&self) -> bool {
        matches!(self.kind, EffectKind::Immunity)
    }

    pub fn is_incapacitating(&self) -> bool {
        !self.can_attack() && !self.can_support() && !self.can_use_charge()
    }

    pub fn allows(&self, action: ActionKind) -> bool {
        match action {
            ActionKind::Attack => self.can_attack(),
            ActionKind::Support => self.can_support(),
            ActionKind::Charged => self.can_use_charge(),
        }
    }

    fn is_stun(&self) -> bool {
        matches!(self.kind, EffectKind::Knock | EffectKind::Freeze)
    }

    // --- Pure hooks ---

    /// Lets the effect substitute the unit `attacker` is about to hit.
    pub fn redirect(&self, wearer: UnitId, target: UnitId, attacker: UnitId) -> UnitId {
        match self.kind {
            EffectKind::ForceTarget { target: forced } if attacker == wearer => forced,
            EffectKind::Devotion { protector, .. } if target == wearer => protector,
            EffectKind::Ambush { decoy, .. } if target == wearer => decoy,
            _ => target,
        }
    }

    /// Rewrites an incoming hit before it lands.
    pub fn on_hit(&self, wearer: UnitId, mut hit: Hit) -> Hit {
        if hit.victim != wearer {
            return hit;
        }

        match self.kind {
            EffectKind::Shield { effectiveness } | EffectKind::Devotion { effectiveness, .. } => {
                hit.damage = Damage::of(hit.damage, 100 - effectiveness).amount();
            }
            // Adds the reduced amount on top instead of scaling by it.
            EffectKind::Weaken { effectiveness } => {
                let extra = Damage::of(hit.damage, 100 - effectiveness).amount();
                hit.damage = hit.damage.saturating_add(extra);
            }
            _ => {}
        }
        hit
    }

    /// Scales damage the wearer is about to deal.
    pub fn on_attack(&self, damage: i32) -> i32 {
        match self.kind {
            EffectKind::DamageBuff { effectiveness }
            | EffectKind::GiantGrowth { attack: effectiveness, .. } => {
                Damage::of(damage, effectiveness.saturating_add(100)).amount()
            }
            EffectKind::DamageDebuff { effectiveness } => Damage::of(damage, 100 - effectiveness).amount(),
            _ => damage,
        }
    }

    /// Runs once the effect is attached. Returns the total health granted to the wearer.
    pub(crate) fn on_enter(&mut self, wearer_total_hp: i32) -> i32 {
        match &mut self.kind {
            EffectKind::GiantGrowth { health, boost, .. } => {
                *boost = wearer_total_hp / 100 * *health;
                *boost
            }
            _ => 0,
        }
    }

    /// Runs as the effect leaves its wearer. Returns the total health to take back.
    pub(crate) fn on_release(&self, release: Release) -> i32 {
        match self.kind {
            EffectKind::GiantGrowth { boost, .. } => {
                tracing::trace!(?release, boost, "giant growth released");
                boost
            }
            _ => 0,
        }
    }

    // --- Battlefield hooks ---

    /// Side effects after a hit has fully landed. Cannot change the hit.
    pub fn after_hit(&self, battlefield: &mut Battlefield, wearer: UnitId, hit: &Hit) -> BattleResult<()> {
        let hostile = battlefield.is_hostile(hit.source, hit.victim);

        match self.kind {
            // Reflections hold the wearer's lock, so two shields facing each other
            // bounce once and stop.
            EffectKind::ShockShield { damage } if hit.victim == wearer && hostile => {
                let lock = ReactionLock::Reaction(wearer, self.name.clone());
                battlefield.with_lock(lock, |battlefield| {
                    battlefield.deal_damage(hit.source, damage, wearer, Vec::new(), true).map(|_| ())
                })?;
            }
            EffectKind::ThornyShield { percentage } if hit.victim == wearer && hostile => {
                let reflected = Damage::of(hit.damage, percentage);
                let lock = ReactionLock::Reaction(wearer, self.name.clone());
                battlefield.with_lock(lock, |battlefield| {
                    battlefield.deal_damage(hit.source, reflected, wearer, Vec::new(), false).map(|_| ())
                })?;
            }
            EffectKind::HealingShield { effectiveness } if hit.victim == wearer => {
                let heal = Damage::of(hit.damage, effectiveness).amount();
                if let Some(side) = battlefield.side_of(wearer) {
                    for unit in battlefield.ids_on(side) {
                        battlefield.heal(unit, heal)?;
                    }
                }
            }
            EffectKind::Ambush { decoy, damage_percent } if hit.victim == decoy && hostile => {
                let lock = ReactionLock::Reaction(wearer, self.name.clone());
                battlefield.with_lock(lock, |battlefield| {
                    battlefield.reattack(wearer, hit.source, damage_percent)
                })?;
            }
            EffectKind::AncestralProtection { damage_decrease, debuff_turns }
                if hit.victim == wearer && hostile =>
            {
                let debuff = Effect::new(
                    self.name.clone(),
                    debuff_turns,
                    EffectKind::DamageDebuff { effectiveness: damage_decrease },
                );
                battlefield.add_negative_effects(hit.source, vec![debuff])?;
            }
            EffectKind::Energize { charge_boost, stun_chance, stun_turns } if hit.victim == wearer && hostile => {
                battlefield.add_charge(charge_boost);
                if battlefield.rng.chance(stun_chance)? {
                    let stun = Effect::new(self.name.clone(), stun_turns, EffectKind::Knock);
                    battlefield.add_negative_effects(hit.source, vec![stun])?;
                }
            }
            EffectKind::Mirror { attack_percent } if hit.source == wearer && hostile => {
                if battlefield.side_of(wearer) == Some(Side::Ally) {
                    let lock = ReactionLock::Reaction(wearer, self.name.clone());
                    battlefield.with_lock(lock, |battlefield| {
                        battlefield.reattack(wearer, hit.victim, attack_percent)
                    })?;
                }
            }
            // Shared damage never sets off another storm on the same side.
            EffectKind::ThunderStorm { shared_percent } if hit.victim == wearer => {
                let shared = Damage::of(hit.damage, shared_percent).amount();
                if let Some(side) = battlefield.side_of(wearer) {
                    let lock = ReactionLock::Link(side, self.name.clone());
                    battlefield.with_lock(lock, |battlefield| {
                        for unit in battlefield.ids_on(side) {
                            if unit != wearer {
                                battlefield.deal_damage(unit, shared, wearer, Vec::new(), true)?;
                            }
                        }
                        Ok(())
                    })?;
                }
            }
            EffectKind::LifeDrain { drain } if hit.victim == wearer && hostile => {
                let victim_total_hp = battlefield.unit(wearer).map_or(0, |unit| unit.total_hp());
                let heal = drain.amount(victim_total_hp, hit.damage);
                battlefield.heal(hit.source, heal)?;
            }
            EffectKind::Counter { effectiveness } if hit.victim == wearer && hostile => {
                let lock = ReactionLock::Reaction(wearer, self.name.clone());
                battlefield.with_lock(lock, |battlefield| {
                    battlefield.reattack(wearer, hit.source, effectiveness)
                })?;
            }
            EffectKind::GangUp { bonus_attacker } if hit.source == wearer && hostile => {
                let lock = ReactionLock::Reaction(wearer, self.name.clone());
                battlefield.with_lock(lock, |battlefield| {
                    battlefield.reattack(bonus_attacker, hit.victim, 100)
                })?;
            }
            EffectKind::FreezeBarrier { chance, freeze_turns } if hit.victim == wearer && hostile => {
                if battlefield.rng.chance(chance)? {
                    let freeze = Effect::new(self.name.clone(), freeze_turns, EffectKind::Freeze);
                    battlefield.add_negative_effects(hit.source, vec![freeze])?;
                }
            }
            _ => {}
        }

        Ok(())
    }

    /// Rewrites a heal before it is applied. Returns the amount `target` receives.
    pub fn on_heal(
        &self,
        battlefield: &mut Battlefield,
        wearer: UnitId,
        target: UnitId,
        heal: i32,
    ) -> BattleResult<i32> {
        match self.kind {
            EffectKind::Mimic if target == wearer => {
                let thief = battlefield
                    .side_of(target)
                    .and_then(|side| battlefield.lowest_hp(side.opposite()));
                if let Some(thief) = thief {
                    battlefield.heal(thief, heal)?;
                }
                Ok(0)
            }
            _ => Ok(heal),
        }
    }

    /// Side effects after a heal has been applied.
    pub fn after_heal(
        &self,
        battlefield: &mut Battlefield,
        wearer: UnitId,
        target: UnitId,
        heal: i32,
    ) -> BattleResult<()> {
        if let EffectKind::LinkedHeal = self.kind {
            if target != wearer || heal <= 0 {
                return Ok(());
            }
            let Some(side) = battlefield.side_of(wearer) else {
                return Ok(());
            };

            let lock = ReactionLock::Link(side, self.name.clone());
            battlefield.with_lock(lock, |battlefield| {
                let partners: Vec<UnitId> = battlefield
                    .units_on(side)
                    .iter()
                    .filter(|unit| unit.id != wearer)
                    .filter(|unit| unit.effect(Polarity::Positive, &self.name).is_some())
                    .map(|unit| unit.id)
                    .collect();

                for partner in partners {
                    battlefield.heal(partner, heal)?;
                }
                Ok(())
            })?;
        }

        Ok(())
    }

    /// Periodic effects. Each one only fires on the half of the turn cycle that
    /// matches its wearer's side.
    pub fn end_of_turn(&self, battlefield: &mut Battlefield, wearer: UnitId, phase: TurnEnd) -> BattleResult<()> {
        let Some(side) = battlefield.side_of(wearer) else {
            return Ok(());
        };

        // Harmful ticks land once the wearer's own side has finished its turn,
        // helpful ones once the opposing side has.
        let harm_ticks = matches!(
            (phase, side),
            (TurnEnd::EnemiesTurnEnded, Side::Enemy) | (TurnEnd::AlliesTurnEnded, Side::Ally)
        );

        match self.kind {
            EffectKind::ToxicPoison { damage }
            | EffectKind::ThornyPoison { damage }
            | EffectKind::GooeyPoison { damage }
                if harm_ticks =>
            {
                battlefield.deal_damage(wearer, damage, wearer, Vec::new(), true)?;
            }
            EffectKind::Healing { healing } if !harm_ticks => {
                battlefield.heal(wearer, healing)?;
            }
            EffectKind::LifeSteal { steal_target, damage } if !harm_ticks => {
                let hit = battlefield.deal_damage(wearer, damage, wearer, Vec::new(), true)?;
                if battlefield.unit(steal_target).is_some() {
                    battlefield.heal(steal_target, hit.damage)?;
                }
            }
            _ => {}
        }

        Ok(())
    }
}

/// One damage resolution as it flows through the hooks: who is hit, by whom, for
/// how much, and which effects ride along.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    pub victim: UnitId,
    pub source: UnitId,
    pub damage: i32,
    pub effects: Vec<Effect>,
}
