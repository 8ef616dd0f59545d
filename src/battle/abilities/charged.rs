// In: src/battle/abilities/charged.rs

// --- IMPORTS ---
use super::AbilityContext;
use crate::battle::battlefield::Battlefield;
use crate::battle::combat::Damage;
use crate::effects::{Effect, EffectKind};
use crate::errors::BattleResult;
use crate::unit::{Side, UnitId};
use schema::ChargedAbility;
use tracing::debug;

pub(super) fn apply(ability: &ChargedAbility, ctx: &AbilityContext, battlefield: &mut Battlefield) -> BattleResult<()> {
    match *ability {
        // Always goes for the healthiest enemy.
        ChargedAbility::HeroicStrike { damage } => {
            if let Some(target) = battlefield.healthiest(Side::Enemy) {
                battlefield.strike(ctx.actor, target, ctx.damage(damage), Vec::new(), false)?;
            }
            Ok(())
        }
        ChargedAbility::SpeedOfLight { supers } => speed_of_light(battlefield, supers),
        ChargedAbility::MatildasMedicine { heal } => {
            let allies = battlefield.ids_on(Side::Ally);
            // Every ally is cleansed before anyone is healed.
            for &ally in &allies {
                battlefield.cleanse(ally);
            }
            for ally in allies {
                let total_hp = battlefield.require(ally)?.total_hp();
                battlefield.heal(ally, Damage::of(total_hp, heal))?;
            }
            Ok(())
        }
        ChargedAbility::Explode { damage } => {
            for enemy in battlefield.ids_on(Side::Enemy) {
                battlefield.strike(ctx.actor, enemy, ctx.damage(damage), Vec::new(), false)?;
            }
            Ok(())
        }
        ChargedAbility::EggSurprise { damage, stun_turns } => {
            if let Some(enemy) = random_enemy(battlefield) {
                battlefield.dispel(enemy);
            }
            if let Some(enemy) = random_enemy(battlefield) {
                battlefield.strike(ctx.actor, enemy, ctx.damage(damage), Vec::new(), true)?;
            }
            if let Some(enemy) = random_enemy(battlefield) {
                let stun = Effect::new(ability.name(), stun_turns, EffectKind::Knock);
                battlefield.add_negative_effects(enemy, vec![stun])?;
            }
            Ok(())
        }
    }
}

/// Allies take turns attacking random enemies at full strength, cycling through
/// the roster. Stops early once the ally whose turn it is has fallen or no enemy
/// is left standing.
fn speed_of_light(battlefield: &mut Battlefield, supers: u32) -> BattleResult<()> {
    let allies = battlefield.ids_on(Side::Ally);
    if allies.is_empty() {
        return Ok(());
    }

    for (ally, _) in allies.iter().cycle().zip(0..supers) {
        let standing = battlefield.unit(*ally).is_some_and(|unit| !unit.is_dead());
        if !standing {
            debug!(ally = %ally, "speed of light cancelled, ally down");
            return Ok(());
        }

        let Some(enemy) = random_living_enemy(battlefield) else {
            return Ok(());
        };
        battlefield.attack_with(*ally, enemy, 100)?;
    }
    Ok(())
}

fn random_enemy(battlefield: &mut Battlefield) -> Option<UnitId> {
    let enemies = battlefield.ids_on(Side::Enemy);
    if enemies.is_empty() {
        return None;
    }
    Some(enemies[battlefield.rng.pick_index(enemies.len())])
}

fn random_living_enemy(battlefield: &mut Battlefield) -> Option<UnitId> {
    let enemies: Vec<UnitId> = battlefield
        .enemies()
        .iter()
        .filter(|enemy| !enemy.is_dead())
        .map(|enemy| enemy.id)
        .collect();
    if enemies.is_empty() {
        return None;
    }
    Some(enemies[battlefield.rng.pick_index(enemies.len())])
}
