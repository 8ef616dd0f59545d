// In: src/battle/abilities/mod.rs

// --- 1. DECLARE HELPER MODULES ---
mod attacks;
mod charged;
mod supports;

// --- 2. IMPORTS ---
use crate::battle::battlefield::Battlefield;
use crate::battle::combat::Damage;
use crate::battle::state::BattleEvent;
use crate::errors::BattleResult;
use crate::unit::{UnitId, UnitKind};
use schema::{AttackAbility, ChargedAbility, SupportAbility};

// --- 3. ABILITY CONTEXT ---
/// Who is using an ability, on whom, and the stat its damage percentages are taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbilityContext {
    pub actor: UnitId,
    pub target: UnitId,
    pub base_attack: i32,
}

impl AbilityContext {
    /// `percent`% of the actor's base attack.
    pub fn damage(&self, percent: i32) -> Damage {
        Damage::of(self.base_attack, percent)
    }
}

// --- 4. THE PUBLIC EXTENSION TRAIT ---
/// Runs an ability's effect on the battlefield. Blocking and charge checks happen
/// before this is called.
pub trait AbilityExt {
    fn execute(&self, ctx: &AbilityContext, battlefield: &mut Battlefield) -> BattleResult<()>;
}

impl AbilityExt for AttackAbility {
    fn execute(&self, ctx: &AbilityContext, battlefield: &mut Battlefield) -> BattleResult<()> {
        use attacks::*;

        match *self {
            AttackAbility::Attack { damage, force_turns } => {
                force_attack(self.name(), ctx, battlefield, damage, force_turns)
            }
            AttackAbility::Overpower { damage, debuff, debuff_turns } => {
                debuff_strike(self.name(), ctx, battlefield, damage, 1, debuff, debuff_turns)
            }
            AttackAbility::DragonStrike { damage, slice } => multi_strike(ctx, battlefield, damage, slice),
            AttackAbility::Revenge { damage } => revenge(ctx, battlefield, damage),
            AttackAbility::HolyStrike { damage, heal } => holy_strike(ctx, battlefield, damage, heal),
            AttackAbility::FeralAssault { damage, slice, bonus } => {
                feral_assault(ctx, battlefield, damage, slice, bonus)
            }
            AttackAbility::Storm { damage } => storm(ctx, battlefield, damage),
            AttackAbility::EnergyDrain { damage, dispel_chance } => {
                energy_drain(ctx, battlefield, damage, dispel_chance)
            }
            AttackAbility::AcidRain { damage, poison, poison_turns } => {
                acid_rain(self.name(), ctx, battlefield, damage, poison, poison_turns)
            }
            AttackAbility::ChainLightning { damage, damage1, damage2, damage3 } => {
                chain_lightning(self.name(), ctx, battlefield, [damage, damage1, damage2, damage3])
            }
            AttackAbility::Thunderclap { damage, weaken, weaken_turns } => {
                thunderclap(self.name(), ctx, battlefield, damage, weaken, weaken_turns)
            }
            AttackAbility::DancingSpark { damage, shared_damage, storm_turns } => {
                dancing_spark(self.name(), ctx, battlefield, damage, shared_damage, storm_turns)
            }
            AttackAbility::HealingStrike { damage, heal } => healing_strike(ctx, battlefield, damage, heal),
            AttackAbility::ThornyVine { damage, poison, poison_turns } => {
                thorny_vine(self.name(), ctx, battlefield, damage, poison, poison_turns)
            }
            AttackAbility::RoyalOrder { damage, force_turns } => {
                royal_order(self.name(), ctx, battlefield, damage, force_turns)
            }
            AttackAbility::AngelicTouch { damage, slice, heal, drain_turns } => {
                angelic_touch(self.name(), ctx, battlefield, damage, slice, heal, drain_turns)
            }
            AttackAbility::HeavyMetal { damage, stun_chance, stun_turns } => {
                heavy_metal(self.name(), ctx, battlefield, damage, stun_chance, stun_turns)
            }
            AttackAbility::SinisterSmite { damage, steal, steal_turns } => {
                sinister_smite(self.name(), ctx, battlefield, damage, steal, steal_turns)
            }
            AttackAbility::Pummel { damage } => multi_strike(ctx, battlefield, damage, 1),
            AttackAbility::CoverFire { damage, slice, debuff, debuff_turns } => {
                debuff_strike(self.name(), ctx, battlefield, damage, slice, debuff, debuff_turns)
            }
            AttackAbility::Enrage { damage } => enrage(ctx, battlefield, damage),
            AttackAbility::Raid { damage } => raid(ctx, battlefield, damage),
            AttackAbility::HulkSmash { damage } => hulk_smash(ctx, battlefield, damage),
            AttackAbility::FrostStrike { damage, bonus } => frost_strike(ctx, battlefield, damage, bonus),
            AttackAbility::Volley { damage, slice, weaken, weaken_turns } => {
                volley(self.name(), ctx, battlefield, damage, slice, weaken, weaken_turns)
            }
        }
    }
}

impl AbilityExt for SupportAbility {
    fn execute(&self, ctx: &AbilityContext, battlefield: &mut Battlefield) -> BattleResult<()> {
        supports::apply(self, ctx, battlefield)
    }
}

impl AbilityExt for ChargedAbility {
    fn execute(&self, ctx: &AbilityContext, battlefield: &mut Battlefield) -> BattleResult<()> {
        charged::apply(self, ctx, battlefield)
    }
}

// --- 5. BATTLEFIELD ENTRY POINTS ---
impl Battlefield {
    /// `actor` attacks `target` at `percent`% strength. Allies run their class attack,
    /// enemies their basic attack.
    pub fn attack_with(&mut self, actor: UnitId, target: UnitId, percent: i32) -> BattleResult<()> {
        let kind = self.require(actor)?.kind.clone();

        match kind {
            UnitKind::Ally { attack, loadout, .. } => {
                let ability = if percent == 100 { loadout.attack } else { loadout.attack.scaled(percent) };
                self.bus.push(BattleEvent::AbilityUsed {
                    unit: actor,
                    ability: ability.name().to_string(),
                    target: Some(target),
                });
                let ctx = AbilityContext { actor, target, base_attack: attack };
                ability.execute(&ctx, self)
            }
            UnitKind::Enemy { damage } => {
                self.strike(actor, target, Damage::of(damage, percent), Vec::new(), false)?;
                Ok(())
            }
        }
    }

    /// A follow-up attack triggered by an effect. Does nothing if either unit has
    /// already left the field.
    pub fn reattack(&mut self, unit: UnitId, target: UnitId, percent: i32) -> BattleResult<()> {
        if self.unit(unit).is_none() || self.unit(target).is_none() {
            tracing::debug!(unit = %unit, target = %target, "re-attack skipped, unit gone");
            return Ok(());
        }
        self.attack_with(unit, target, percent)
    }

    pub fn use_support(&mut self, actor: UnitId, target: UnitId) -> BattleResult<()> {
        let unit = self.require(actor)?;
        let (Some(loadout), base_attack) = (unit.loadout(), unit.attack_stat()) else {
            return Ok(());
        };
        let ability = loadout.support.clone();

        self.bus.push(BattleEvent::AbilityUsed {
            unit: actor,
            ability: ability.name().to_string(),
            target: Some(target),
        });
        ability.execute(&AbilityContext { actor, target, base_attack }, self)
    }

    /// Fires `actor`'s charged ability and empties the charge meter.
    pub fn use_charged(&mut self, actor: UnitId) -> BattleResult<()> {
        let unit = self.require(actor)?;
        let (Some(loadout), base_attack) = (unit.loadout(), unit.attack_stat()) else {
            return Ok(());
        };
        let ability = loadout.charged.clone();

        self.bus.push(BattleEvent::AbilityUsed {
            unit: actor,
            ability: ability.name().to_string(),
            target: None,
        });
        ability.execute(&AbilityContext { actor, target: actor, base_attack }, self)?;
        self.set_charge(0);
        Ok(())
    }
}
