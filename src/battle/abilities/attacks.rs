// In: src/battle/abilities/attacks.rs

// --- IMPORTS ---
use super::AbilityContext;
use crate::battle::battlefield::Battlefield;
use crate::battle::combat::Damage;
use crate::effects::{DrainFormula, Effect, EffectKind};
use crate::errors::{BattleResult, ContractViolation};
use crate::unit::{Side, UnitId};

// These functions are `pub(super)` to be visible only to the parent `mod.rs`.
// Percentages in their arguments come straight from the ability table.

/// Hit the target and force it to attack the actor.
pub(super) fn force_attack(
    name: &str,
    ctx: &AbilityContext,
    battlefield: &mut Battlefield,
    damage: i32,
    force_turns: u32,
) -> BattleResult<()> {
    let force = Effect::new(name, force_turns, EffectKind::ForceTarget { target: ctx.actor });
    battlefield.strike(ctx.actor, ctx.target, ctx.damage(damage), vec![force], false)?;
    Ok(())
}

/// `slice` hits, each applying a damage debuff.
pub(super) fn debuff_strike(
    name: &str,
    ctx: &AbilityContext,
    battlefield: &mut Battlefield,
    damage: i32,
    slice: u32,
    debuff: i32,
    debuff_turns: u32,
) -> BattleResult<()> {
    for _ in 0..slice {
        let effect = Effect::new(name, debuff_turns, EffectKind::DamageDebuff { effectiveness: debuff });
        battlefield.strike(ctx.actor, ctx.target, ctx.damage(damage), vec![effect], false)?;
    }
    Ok(())
}

/// `slice` plain hits of the full damage each.
pub(super) fn multi_strike(
    ctx: &AbilityContext,
    battlefield: &mut Battlefield,
    damage: i32,
    slice: u32,
) -> BattleResult<()> {
    for _ in 0..slice {
        battlefield.strike(ctx.actor, ctx.target, ctx.damage(damage), Vec::new(), false)?;
    }
    Ok(())
}

/// Gains 2% damage for every percent of health the actor is missing.
pub(super) fn revenge(ctx: &AbilityContext, battlefield: &mut Battlefield, damage: i32) -> BattleResult<()> {
    let hp_percent = battlefield.require(ctx.actor)?.hp_percent();
    let multiplier = 100 + (hp_percent - 100).abs() * 2;

    let damage = ctx.damage(damage).scale(multiplier);
    battlefield.strike(ctx.actor, ctx.target, damage, Vec::new(), false)?;
    Ok(())
}

/// Hit, then heal the most wounded ally by a share of the damage dealt.
/// When every ally is at full health the actor takes the heal.
pub(super) fn holy_strike(
    ctx: &AbilityContext,
    battlefield: &mut Battlefield,
    damage: i32,
    heal: i32,
) -> BattleResult<()> {
    let hit = battlefield.strike(ctx.actor, ctx.target, ctx.damage(damage), Vec::new(), false)?;
    let heal = Damage::of(hit.damage, heal);

    let all_full = battlefield.allies().iter().all(|ally| ally.hp() == ally.total_hp());
    let receiver = if all_full {
        ctx.actor
    } else {
        battlefield.lowest_hp_percent(Side::Ally).unwrap_or(ctx.actor)
    };
    battlefield.heal(receiver, heal)?;
    Ok(())
}

/// `slice` hits; each one against a unit carrying negative effects deals `bonus`%.
pub(super) fn feral_assault(
    ctx: &AbilityContext,
    battlefield: &mut Battlefield,
    damage: i32,
    slice: u32,
    bonus: i32,
) -> BattleResult<()> {
    for _ in 0..slice {
        let victim = battlefield.get_target(ctx.target, ctx.actor);
        let debuffed = !battlefield.require(victim)?.neg_effects().is_empty();

        let damage = if debuffed { ctx.damage(damage).scale(bonus) } else { ctx.damage(damage) };
        battlefield.strike(ctx.actor, victim, damage, Vec::new(), true)?;
    }
    Ok(())
}

/// Hit every enemy.
pub(super) fn storm(ctx: &AbilityContext, battlefield: &mut Battlefield, damage: i32) -> BattleResult<()> {
    for enemy in battlefield.ids_on(Side::Enemy) {
        battlefield.strike(ctx.actor, enemy, ctx.damage(damage), Vec::new(), true)?;
    }
    Ok(())
}

/// Hit every enemy, each one rolling to lose its positive effects first.
pub(super) fn energy_drain(
    ctx: &AbilityContext,
    battlefield: &mut Battlefield,
    damage: i32,
    dispel_chance: u32,
) -> BattleResult<()> {
    for enemy in battlefield.ids_on(Side::Enemy) {
        if battlefield.rng.chance(dispel_chance)? {
            battlefield.dispel(enemy);
        }
        battlefield.strike(ctx.actor, enemy, ctx.damage(damage), Vec::new(), true)?;
    }
    Ok(())
}

/// Hit and poison every enemy.
pub(super) fn acid_rain(
    name: &str,
    ctx: &AbilityContext,
    battlefield: &mut Battlefield,
    damage: i32,
    poison: i32,
    poison_turns: u32,
) -> BattleResult<()> {
    let poison = ctx.damage(poison).amount();

    for enemy in battlefield.ids_on(Side::Enemy) {
        let effect = Effect::new(name, poison_turns, EffectKind::ToxicPoison { damage: poison });
        battlefield.strike(ctx.actor, enemy, ctx.damage(damage), vec![effect], true)?;
    }
    Ok(())
}

/// Lightning jumps from the target to its neighbours in roster order, each jump
/// weaker than the last.
///
/// A target at either end of the roster chains inwards. A target in the middle
/// hits right, then left, then one more step right if there is room, else left.
pub(super) fn chain_lightning(
    name: &'static str,
    ctx: &AbilityContext,
    battlefield: &mut Battlefield,
    tiers: [i32; 4],
) -> BattleResult<()> {
    let enemies = battlefield.ids_on(Side::Enemy);
    let count = enemies.len();
    let index = enemies
        .iter()
        .position(|&enemy| enemy == ctx.target)
        .ok_or(ContractViolation::UnitNotOnField(ctx.target))?;

    let chain: Vec<UnitId> = if count == 1 {
        vec![enemies[0]]
    } else if index == 0 {
        enemies.iter().copied().take(tiers.len()).collect()
    } else if index == count - 1 {
        enemies.iter().rev().copied().take(tiers.len()).collect()
    } else {
        let missing = || ContractViolation::MissingNeighbours { ability: name, expected: 3, found: count };
        let right = *enemies.get(index + 1).ok_or_else(missing)?;
        let left = *enemies.get(index - 1).ok_or_else(missing)?;

        let mut chain = vec![ctx.target, right, left];
        if let Some(&far_right) = enemies.get(index + 2) {
            chain.push(far_right);
        } else if index >= 2 {
            chain.push(enemies[index - 2]);
        }
        chain
    };

    for (enemy, tier) in chain.into_iter().zip(tiers) {
        battlefield.strike(ctx.actor, enemy, ctx.damage(tier), Vec::new(), true)?;
    }
    Ok(())
}

/// Hit every enemy and weaken the chosen one.
pub(super) fn thunderclap(
    name: &str,
    ctx: &AbilityContext,
    battlefield: &mut Battlefield,
    damage: i32,
    weaken: i32,
    weaken_turns: u32,
) -> BattleResult<()> {
    for enemy in battlefield.ids_on(Side::Enemy) {
        let effects = if enemy == ctx.target {
            vec![Effect::new(name, weaken_turns, EffectKind::Weaken { effectiveness: weaken })]
        } else {
            Vec::new()
        };
        battlefield.strike(ctx.actor, enemy, ctx.damage(damage), effects, true)?;
    }
    Ok(())
}

pub(super) fn dancing_spark(
    name: &str,
    ctx: &AbilityContext,
    battlefield: &mut Battlefield,
    damage: i32,
    shared_damage: i32,
    storm_turns: u32,
) -> BattleResult<()> {
    let storm = Effect::new(name, storm_turns, EffectKind::ThunderStorm { shared_percent: shared_damage });
    battlefield.strike(ctx.actor, ctx.target, ctx.damage(damage), vec![storm], false)?;
    Ok(())
}

/// Hit, then heal every ally by a share of the damage dealt.
pub(super) fn healing_strike(
    ctx: &AbilityContext,
    battlefield: &mut Battlefield,
    damage: i32,
    heal: i32,
) -> BattleResult<()> {
    let hit = battlefield.strike(ctx.actor, ctx.target, ctx.damage(damage), Vec::new(), false)?;
    let heal = Damage::of(hit.damage, heal);

    for ally in battlefield.ids_on(Side::Ally) {
        battlefield.heal(ally, heal)?;
    }
    Ok(())
}

pub(super) fn thorny_vine(
    name: &str,
    ctx: &AbilityContext,
    battlefield: &mut Battlefield,
    damage: i32,
    poison: i32,
    poison_turns: u32,
) -> BattleResult<()> {
    let poison = Effect::new(
        name,
        poison_turns,
        EffectKind::ThornyPoison { damage: ctx.damage(poison).amount() },
    );
    battlefield.strike(ctx.actor, ctx.target, ctx.damage(damage), vec![poison], false)?;
    Ok(())
}

/// Hit, then force every enemy to attack the healthiest ally.
pub(super) fn royal_order(
    name: &str,
    ctx: &AbilityContext,
    battlefield: &mut Battlefield,
    damage: i32,
    force_turns: u32,
) -> BattleResult<()> {
    battlefield.strike(ctx.actor, ctx.target, ctx.damage(damage), Vec::new(), false)?;

    let Some(guard) = battlefield.healthiest(Side::Ally) else {
        return Ok(());
    };
    for enemy in battlefield.ids_on(Side::Enemy) {
        let force = Effect::new(name, force_turns, EffectKind::ForceTarget { target: guard });
        battlefield.add_negative_effects(enemy, vec![force])?;
    }
    Ok(())
}

/// `slice` hits, each one letting attackers of the target drain its health.
pub(super) fn angelic_touch(
    name: &str,
    ctx: &AbilityContext,
    battlefield: &mut Battlefield,
    damage: i32,
    slice: u32,
    heal: i32,
    drain_turns: u32,
) -> BattleResult<()> {
    for _ in 0..slice {
        let drain = Effect::new(
            name,
            drain_turns,
            EffectKind::LifeDrain { drain: DrainFormula::PercentOfVictimMaxHp(heal) },
        );
        battlefield.strike(ctx.actor, ctx.target, ctx.damage(damage), vec![drain], false)?;
    }
    Ok(())
}

pub(super) fn heavy_metal(
    name: &str,
    ctx: &AbilityContext,
    battlefield: &mut Battlefield,
    damage: i32,
    stun_chance: u32,
    stun_turns: u32,
) -> BattleResult<()> {
    let mut effects = Vec::new();
    if battlefield.rng.chance(stun_chance)? {
        effects.push(Effect::new(name, stun_turns, EffectKind::Knock));
    }
    battlefield.strike(ctx.actor, ctx.target, ctx.damage(damage), effects, false)?;
    Ok(())
}

/// Hit and curse the target: every turn it loses `steal`% of this hit's base
/// damage and the actor gains what it lost.
pub(super) fn sinister_smite(
    name: &str,
    ctx: &AbilityContext,
    battlefield: &mut Battlefield,
    damage: i32,
    steal: i32,
    steal_turns: u32,
) -> BattleResult<()> {
    let damage = ctx.damage(damage);
    let curse = Effect::new(
        name,
        steal_turns,
        EffectKind::LifeSteal { steal_target: ctx.actor, damage: damage.scale(steal).amount() },
    );
    battlefield.strike(ctx.actor, ctx.target, damage, vec![curse], false)?;
    Ok(())
}

/// Grows with the charge meter: half a percent per point of charge.
pub(super) fn enrage(ctx: &AbilityContext, battlefield: &mut Battlefield, damage: i32) -> BattleResult<()> {
    let multiplier = 100 + i32::from(battlefield.charge()) / 2;
    let damage = ctx.damage(damage).scale(multiplier);
    battlefield.strike(ctx.actor, ctx.target, damage, Vec::new(), false)?;
    Ok(())
}

/// Strip the target's positive effects, then hit it.
pub(super) fn raid(ctx: &AbilityContext, battlefield: &mut Battlefield, damage: i32) -> BattleResult<()> {
    battlefield.dispel(ctx.target);
    battlefield.strike(ctx.actor, ctx.target, ctx.damage(damage), Vec::new(), false)?;
    Ok(())
}

/// Gains 1% damage for every percent of health the actor is missing.
pub(super) fn hulk_smash(ctx: &AbilityContext, battlefield: &mut Battlefield, damage: i32) -> BattleResult<()> {
    let missing = 100 - battlefield.require(ctx.actor)?.hp_percent();
    let damage = ctx.damage(damage).scale(100 + missing);
    battlefield.strike(ctx.actor, ctx.target, damage, Vec::new(), false)?;
    Ok(())
}

/// Deals `bonus`% against a unit that cannot act.
pub(super) fn frost_strike(
    ctx: &AbilityContext,
    battlefield: &mut Battlefield,
    damage: i32,
    bonus: i32,
) -> BattleResult<()> {
    let victim = battlefield.get_target(ctx.target, ctx.actor);
    let frozen = battlefield.require(victim)?.is_incapacitated();

    let damage = if frozen { ctx.damage(damage).scale(bonus) } else { ctx.damage(damage) };
    battlefield.strike(ctx.actor, victim, damage, Vec::new(), true)?;
    Ok(())
}

pub(super) fn volley(
    name: &str,
    ctx: &AbilityContext,
    battlefield: &mut Battlefield,
    damage: i32,
    slice: u32,
    weaken: i32,
    weaken_turns: u32,
) -> BattleResult<()> {
    for _ in 0..slice {
        let effect = Effect::new(name, weaken_turns, EffectKind::Weaken { effectiveness: weaken });
        battlefield.strike(ctx.actor, ctx.target, ctx.damage(damage), vec![effect], false)?;
    }
    Ok(())
}
