use serde::{Deserialize, Serialize};

// Damage fields are percentages of the bird's base attack unless noted otherwise.
// Heal fields are percentages of the caster's total health unless noted otherwise.

/// Parameters for every class attack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackAbility {
    /// Knight: hit and force the target to attack the knight.
    Attack { damage: i32, force_turns: u32 },
    /// Guardian: hit and lower the target's damage.
    Overpower { damage: i32, debuff: i32, debuff_turns: u32 },
    /// Samurai: `slice` separate hits.
    DragonStrike { damage: i32, slice: u32 },
    /// Avenger: more damage the more health the avenger is missing.
    Revenge { damage: i32 },
    /// Paladin: hit, then heal `heal`% of the damage dealt.
    HolyStrike { damage: i32, heal: i32 },
    /// Stone guard: `slice` hits, `bonus`% damage against debuffed targets.
    FeralAssault { damage: i32, slice: u32, bonus: i32 },
    /// Mage: hit every enemy.
    Storm { damage: i32 },
    /// Lightning bird: hit every enemy, each may be dispelled.
    EnergyDrain { damage: i32, dispel_chance: u32 },
    /// Rainbird: hit and poison every enemy. `poison` is a damage percentage.
    AcidRain { damage: i32, poison: i32, poison_turns: u32 },
    /// Wizard: chain through the target and its neighbours with falling damage.
    ChainLightning { damage: i32, damage1: i32, damage2: i32, damage3: i32 },
    /// Thunderbird: hit every enemy, weaken the chosen one.
    Thunderclap { damage: i32, weaken: i32, weaken_turns: u32 },
    /// Illusionist: hit and spread a shared-damage storm on the target.
    DancingSpark { damage: i32, shared_damage: i32, storm_turns: u32 },
    /// Cleric: hit, then heal every ally `heal`% of the damage dealt.
    HealingStrike { damage: i32, heal: i32 },
    /// Druid: hit and poison. `poison` is a damage percentage.
    ThornyVine { damage: i32, poison: i32, poison_turns: u32 },
    /// Princess: hit, then force every enemy onto the healthiest ally.
    RoyalOrder { damage: i32, force_turns: u32 },
    /// Priestess: `slice` hits, attackers of the target drain `heal`% of its total health.
    AngelicTouch { damage: i32, slice: u32, heal: i32, drain_turns: u32 },
    /// Bard: hit with a chance to knock the target out.
    HeavyMetal { damage: i32, stun_chance: u32, stun_turns: u32 },
    /// Witch: hit and curse the target to feed the witch every turn.
    SinisterSmite { damage: i32, steal: i32, steal_turns: u32 },
    /// Pirate: a plain hit.
    Pummel { damage: i32 },
    /// Cannoneer: `slice` hits, each lowering the target's damage.
    CoverFire { damage: i32, slice: u32, debuff: i32, debuff_turns: u32 },
    /// Berserker: grows with the charge meter.
    Enrage { damage: i32 },
    /// Capt'n: dispel the target, then hit.
    Raid { damage: i32 },
    /// Sea dog: grows with the sea dog's missing health.
    HulkSmash { damage: i32 },
    /// Frost savage: `bonus`% damage against incapacitated targets.
    FrostStrike { damage: i32, bonus: i32 },
    /// Marksmen: `slice` hits, each weakening the target.
    Volley { damage: i32, slice: u32, weaken: i32, weaken_turns: u32 },
}

impl AttackAbility {
    /// Display name, also the key of every effect this attack applies.
    pub fn name(&self) -> &'static str {
        match self {
            AttackAbility::Attack { .. } => "Attack",
            AttackAbility::Overpower { .. } => "Overpower",
            AttackAbility::DragonStrike { .. } => "Dragon Strike",
            AttackAbility::Revenge { .. } => "Revenge",
            AttackAbility::HolyStrike { .. } => "Holy Strike",
            AttackAbility::FeralAssault { .. } => "Feral Assault",
            AttackAbility::Storm { .. } => "Storm",
            AttackAbility::EnergyDrain { .. } => "Energy Drain",
            AttackAbility::AcidRain { .. } => "Acid Rain",
            AttackAbility::ChainLightning { .. } => "Chain Lightning",
            AttackAbility::Thunderclap { .. } => "Thunderclap",
            AttackAbility::DancingSpark { .. } => "Dancing Spark",
            AttackAbility::HealingStrike { .. } => "Healing Strike",
            AttackAbility::ThornyVine { .. } => "Thorny Vine",
            AttackAbility::RoyalOrder { .. } => "Royal Order",
            AttackAbility::AngelicTouch { .. } => "Angelic Touch",
            AttackAbility::HeavyMetal { .. } => "Heavy Metal",
            AttackAbility::SinisterSmite { .. } => "Sinister Smite",
            AttackAbility::Pummel { .. } => "Pummel",
            AttackAbility::CoverFire { .. } => "Cover Fire",
            AttackAbility::Enrage { .. } => "Enrage",
            AttackAbility::Raid { .. } => "Raid",
            AttackAbility::HulkSmash { .. } => "Hulk Smash",
            AttackAbility::FrostStrike { .. } => "Frost Strike",
            AttackAbility::Volley { .. } => "Volley",
        }
    }

    /// Attacks that hit every enemy and therefore do not need a chosen target.
    pub fn targets_all(&self) -> bool {
        matches!(
            self,
            AttackAbility::Storm { .. }
                | AttackAbility::EnergyDrain { .. }
                | AttackAbility::AcidRain { .. }
        )
    }

    /// A copy of this attack with every damage field scaled to `percent`%.
    /// Used by reactions that re-run an attack at reduced strength.
    pub fn scaled(&self, percent: i32) -> AttackAbility {
        let scale = |damage: i32| damage * percent / 100;
        let mut scaled = self.clone();

        match &mut scaled {
            AttackAbility::ChainLightning { damage, damage1, damage2, damage3 } => {
                *damage = scale(*damage);
                *damage1 = scale(*damage1);
                *damage2 = scale(*damage2);
                *damage3 = scale(*damage3);
            }
            AttackAbility::Attack { damage, .. }
            | AttackAbility::Overpower { damage, .. }
            | AttackAbility::DragonStrike { damage, .. }
            | AttackAbility::Revenge { damage }
            | AttackAbility::HolyStrike { damage, .. }
            | AttackAbility::FeralAssault { damage, .. }
            | AttackAbility::Storm { damage }
            | AttackAbility::EnergyDrain { damage, .. }
            | AttackAbility::AcidRain { damage, .. }
            | AttackAbility::Thunderclap { damage, .. }
            | AttackAbility::DancingSpark { damage, .. }
            | AttackAbility::HealingStrike { damage, .. }
            | AttackAbility::ThornyVine { damage, .. }
            | AttackAbility::RoyalOrder { damage, .. }
            | AttackAbility::AngelicTouch { damage, .. }
            | AttackAbility::HeavyMetal { damage, .. }
            | AttackAbility::SinisterSmite { damage, .. }
            | AttackAbility::Pummel { damage }
            | AttackAbility::CoverFire { damage, .. }
            | AttackAbility::Enrage { damage }
            | AttackAbility::Raid { damage }
            | AttackAbility::HulkSmash { damage }
            | AttackAbility::FrostStrike { damage, .. }
            | AttackAbility::Volley { damage, .. } => *damage = scale(*damage),
        }

        scaled
    }
}

/// Parameters for every class support ability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupportAbility {
    Protect { effectiveness: i32, turns: u32 },
    AuraOfFortitude { effectiveness: i32, turns: u32 },
    DefensiveFormation { main: i32, others: i32, turns: u32 },
    IDareYou { shield: i32, turns: u32 },
    Devotion { effectiveness: i32, turns: u32 },
    AncestralProtection { damage_decrease: i32, debuff_turns: u32, turns: u32 },
    /// `damage` is a percentage of the bird's base attack.
    ShockShield { damage: i32, turns: u32 },
    LightningFast,
    HealingRain { heal: i32 },
    Energize { charge_boost: u8, stun_chance: u32, stun_turns: u32, turns: u32 },
    /// `damage` is a percentage of the bird's base attack.
    RageOfThunder { damage: i32, turns: u32 },
    MirrorImage { super_atk_damage: i32, turns: u32 },
    /// `heal` is a percentage of damage taken.
    HealingShield { heal: i32, turns: u32 },
    Regrowth { heal: i32, others: i32 },
    RoyalAid { heal: i32 },
    SpiritLink { turns: u32 },
    SoothingSong { main_heal: i32, side_heal: i32, turns: u32 },
    GiantGrowth { attack: i32, health: i32, turns: u32 },
    Arrr { buff: i32, turns: u32 },
    Counter { effectiveness: i32, turns: u32 },
    /// `sacrifice` is a percentage of the target's total health.
    Frenzy { sacrifice: i32 },
    /// `deplete` is a percentage of the target's total health.
    WhipUp { deplete: i32, buff: i32, turns: u32 },
    GangUp { turns: u32 },
    FreezingBarrier { chance: u32, freeze_turns: u32, turns: u32 },
    /// `damage` is the percentage of the ambusher's attack used in the ambush.
    Ambush { damage: i32, turns: u32 },
}

impl SupportAbility {
    /// Display name, also the key of every effect this support applies.
    pub fn name(&self) -> &'static str {
        match self {
            SupportAbility::Protect { .. } => "Protect",
            SupportAbility::AuraOfFortitude { .. } => "Aura Of Fortitude",
            SupportAbility::DefensiveFormation { .. } => "Defensive Formation",
            SupportAbility::IDareYou { .. } => "I Dare You!",
            SupportAbility::Devotion { .. } => "Devotion",
            SupportAbility::AncestralProtection { .. } => "Ancestral Protection",
            SupportAbility::ShockShield { .. } => "Shock Shield",
            SupportAbility::LightningFast => "Lightning Fast",
            SupportAbility::HealingRain { .. } => "Healing Rain",
            SupportAbility::Energize { .. } => "Energize",
            SupportAbility::RageOfThunder { .. } => "Rage Of Thunder",
            SupportAbility::MirrorImage { .. } => "Mirror Image",
            SupportAbility::HealingShield { .. } => "Healing Shield",
            SupportAbility::Regrowth { .. } => "Regrowth",
            SupportAbility::RoyalAid { .. } => "Royal Aid",
            SupportAbility::SpiritLink { .. } => "Spirit Link",
            SupportAbility::SoothingSong { .. } => "Soothing Song",
            SupportAbility::GiantGrowth { .. } => "Giant Growth",
            SupportAbility::Arrr { .. } => "Arrr!",
            SupportAbility::Counter { .. } => "Counter",
            SupportAbility::Frenzy { .. } => "Frenzy",
            SupportAbility::WhipUp { .. } => "Whip Up",
            SupportAbility::GangUp { .. } => "Gang Up",
            SupportAbility::FreezingBarrier { .. } => "Freezing Barrier",
            SupportAbility::Ambush { .. } => "Ambush",
        }
    }
}

/// Parameters for each bird's charged ability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargedAbility {
    /// Red: hit the healthiest enemy.
    HeroicStrike { damage: i32 },
    /// Chuck: allies take turns attacking random enemies `supers` times.
    SpeedOfLight { supers: u32 },
    /// Matilda: cleanse and heal every ally by `heal`% of their total health.
    MatildasMedicine { heal: i32 },
    /// Bomb: hit every enemy.
    Explode { damage: i32 },
    /// Blues: dispel, hit and knock out random enemies.
    EggSurprise { damage: i32, stun_turns: u32 },
}

impl ChargedAbility {
    pub fn name(&self) -> &'static str {
        match self {
            ChargedAbility::HeroicStrike { .. } => "Heroic Strike",
            ChargedAbility::SpeedOfLight { .. } => "Speed Of Light",
            ChargedAbility::MatildasMedicine { .. } => "Matilda's Medicine",
            ChargedAbility::Explode { .. } => "Explode",
            ChargedAbility::EggSurprise { .. } => "Egg Surprise",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaling_truncates_every_damage_field() {
        let chain = AttackAbility::ChainLightning { damage: 100, damage1: 67, damage2: 45, damage3: 30 };
        assert_eq!(
            chain.scaled(50),
            AttackAbility::ChainLightning { damage: 50, damage1: 33, damage2: 22, damage3: 15 }
        );
    }

    #[test]
    fn scaling_keeps_auxiliary_fields() {
        let volley = AttackAbility::Volley { damage: 50, slice: 2, weaken: 35, weaken_turns: 3 };
        assert_eq!(
            volley.scaled(80),
            AttackAbility::Volley { damage: 40, slice: 2, weaken: 35, weaken_turns: 3 }
        );
    }
}
