// In: src/battle/abilities/supports.rs

// --- IMPORTS ---
use super::AbilityContext;
use crate::battle::battlefield::Battlefield;
use crate::battle::combat::Damage;
use crate::effects::{Effect, EffectKind};
use crate::errors::BattleResult;
use crate::unit::{Side, UnitId};
use schema::SupportAbility;

/// Applies a support ability. `ctx.target` is always an ally, defaulting to the actor.
pub(super) fn apply(ability: &SupportAbility, ctx: &AbilityContext, battlefield: &mut Battlefield) -> BattleResult<()> {
    let name = ability.name();
    let caster_hp = battlefield.require(ctx.actor)?.total_hp();

    match *ability {
        SupportAbility::Protect { effectiveness, turns } => {
            give(battlefield, ctx.target, name, turns, EffectKind::Shield { effectiveness })
        }
        SupportAbility::AuraOfFortitude { effectiveness, turns } => {
            give_all(battlefield, name, turns, |_| EffectKind::Shield { effectiveness })
        }
        SupportAbility::DefensiveFormation { main, others, turns } => give_all(battlefield, name, turns, |ally| {
            let effectiveness = if ally == ctx.target { main } else { others };
            EffectKind::Shield { effectiveness }
        }),
        SupportAbility::IDareYou { shield, turns } => {
            give(battlefield, ctx.target, name, turns, EffectKind::Shield { effectiveness: shield })?;
            for enemy in battlefield.ids_on(Side::Enemy) {
                let taunt = Effect::new(name, turns, EffectKind::ForceTarget { target: ctx.target });
                battlefield.add_negative_effects(enemy, vec![taunt])?;
            }
            Ok(())
        }
        SupportAbility::Devotion { effectiveness, turns } => give(
            battlefield,
            ctx.target,
            name,
            turns,
            EffectKind::Devotion { effectiveness, protector: ctx.actor },
        ),
        SupportAbility::AncestralProtection { damage_decrease, debuff_turns, turns } => give(
            battlefield,
            ctx.target,
            name,
            turns,
            EffectKind::AncestralProtection { damage_decrease, debuff_turns },
        ),
        SupportAbility::ShockShield { damage, turns } => {
            let damage = ctx.damage(damage).amount();
            give(battlefield, ctx.target, name, turns, EffectKind::ShockShield { damage })
        }
        SupportAbility::LightningFast => {
            let enemies = battlefield.ids_on(Side::Enemy);
            if enemies.is_empty() {
                return Ok(());
            }
            let enemy = enemies[battlefield.rng.pick_index(enemies.len())];
            battlefield.attack_with(ctx.target, enemy, 100)
        }
        SupportAbility::HealingRain { heal } => {
            battlefield.cleanse(ctx.target);
            heal_all(battlefield, Damage::of(caster_hp, heal))
        }
        SupportAbility::Energize { charge_boost, stun_chance, stun_turns, turns } => give(
            battlefield,
            ctx.target,
            name,
            turns,
            EffectKind::Energize { charge_boost, stun_chance, stun_turns },
        ),
        SupportAbility::RageOfThunder { damage, turns } => {
            let damage = ctx.damage(damage).amount();
            give_all(battlefield, name, turns, |_| EffectKind::ShockShield { damage })
        }
        SupportAbility::MirrorImage { super_atk_damage, turns } => give(
            battlefield,
            ctx.target,
            name,
            turns,
            EffectKind::Mirror { attack_percent: super_atk_damage },
        ),
        SupportAbility::HealingShield { heal, turns } => {
            give_all(battlefield, name, turns, |_| EffectKind::HealingShield { effectiveness: heal })
        }
        SupportAbility::Regrowth { heal, others } => {
            battlefield.heal(ctx.target, Damage::of(caster_hp, heal))?;
            for ally in battlefield.ids_on(Side::Ally) {
                if ally != ctx.target {
                    battlefield.heal(ally, Damage::of(caster_hp, others))?;
                }
            }
            Ok(())
        }
        SupportAbility::RoyalAid { heal } => {
            battlefield.cleanse(ctx.target);
            battlefield.heal(ctx.target, Damage::of(caster_hp, heal))?;
            Ok(())
        }
        SupportAbility::SpiritLink { turns } => {
            if ctx.target == ctx.actor {
                return Ok(());
            }
            give(battlefield, ctx.actor, name, turns, EffectKind::LinkedHeal)?;
            give(battlefield, ctx.target, name, turns, EffectKind::LinkedHeal)
        }
        SupportAbility::SoothingSong { main_heal, side_heal, turns } => give_all(battlefield, name, turns, |ally| {
            let percent = if ally == ctx.target { main_heal } else { side_heal };
            EffectKind::Healing { healing: Damage::of(caster_hp, percent).amount() }
        }),
        SupportAbility::GiantGrowth { attack, health, turns } => give(
            battlefield,
            ctx.target,
            name,
            turns,
            EffectKind::GiantGrowth { attack, health, boost: 0 },
        ),
        SupportAbility::Arrr { buff, turns } => {
            give_all(battlefield, name, turns, |_| EffectKind::DamageBuff { effectiveness: buff })
        }
        SupportAbility::Counter { effectiveness, turns } => {
            give(battlefield, ctx.target, name, turns, EffectKind::Counter { effectiveness })
        }
        SupportAbility::Frenzy { sacrifice } => {
            let damage = Damage::of(battlefield.require(ctx.target)?.total_hp(), sacrifice).amount();
            lose_hp(battlefield, ctx.target, damage)?;
            for enemy in battlefield.ids_on(Side::Enemy) {
                battlefield.deal_damage(enemy, damage, ctx.actor, Vec::new(), true)?;
            }
            Ok(())
        }
        SupportAbility::WhipUp { deplete, buff, turns } => {
            let cost = Damage::of(battlefield.require(ctx.target)?.total_hp(), deplete).amount();
            lose_hp(battlefield, ctx.target, cost)?;
            give(battlefield, ctx.target, name, turns, EffectKind::DamageBuff { effectiveness: buff })
        }
        SupportAbility::GangUp { turns } => give(
            battlefield,
            ctx.target,
            name,
            turns,
            EffectKind::GangUp { bonus_attacker: ctx.actor },
        ),
        SupportAbility::FreezingBarrier { chance, freeze_turns, turns } => {
            give_all(battlefield, name, turns, |_| EffectKind::FreezeBarrier { chance, freeze_turns })
        }
        // Worn by the actor; the chosen ally becomes the decoy.
        SupportAbility::Ambush { damage, turns } => give(
            battlefield,
            ctx.actor,
            name,
            turns,
            EffectKind::Ambush { decoy: ctx.target, damage_percent: damage },
        ),
    }
}

fn give(battlefield: &mut Battlefield, target: UnitId, name: &str, turns: u32, kind: EffectKind) -> BattleResult<()> {
    battlefield.add_positive_effects(target, vec![Effect::new(name, turns, kind)])?;
    Ok(())
}

fn give_all(
    battlefield: &mut Battlefield,
    name: &str,
    turns: u32,
    kind: impl Fn(UnitId) -> EffectKind,
) -> BattleResult<()> {
    for ally in battlefield.ids_on(Side::Ally) {
        give(battlefield, ally, name, turns, kind(ally))?;
    }
    Ok(())
}

fn heal_all(battlefield: &mut Battlefield, heal: Damage) -> BattleResult<()> {
    for ally in battlefield.ids_on(Side::Ally) {
        battlefield.heal(ally, heal)?;
    }
    Ok(())
}

/// Health paid as a cost. Bypasses the damage pipeline entirely.
fn lose_hp(battlefield: &mut Battlefield, target: UnitId, amount: i32) -> BattleResult<()> {
    let unit = battlefield.require_mut(target)?;
    unit.set_hp(unit.hp() - amount);
    Ok(())
}
