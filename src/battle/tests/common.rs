use crate::battle::battlefield::{BattleConfig, Battlefield};
use crate::battle::state::{BattleEvent, BattleRng};
use crate::unit::{Loadout, UnitId, UnitKind, UnitSpec};
use schema::{AbilityTable, AttackAbility, ChargedAbility, ClassName, SupportAbility};

pub fn table() -> AbilityTable {
    AbilityTable::builtin().expect("builtin ability table should parse")
}

/// A builder for test allies, starting from the built-in table values.
///
/// # Example
/// ```
/// let knight = TestAllyBuilder::new(ClassName::Knight)
///     .with_hp(50)
///     .with_support(SupportAbility::Protect { effectiveness: 100, turns: 1 })
///     .build();
/// ```
pub struct TestAllyBuilder {
    class: ClassName,
    hp: Option<i32>,
    attack: Option<i32>,
    attack_ability: Option<AttackAbility>,
    support: Option<SupportAbility>,
    charged: Option<ChargedAbility>,
}

impl TestAllyBuilder {
    pub fn new(class: ClassName) -> Self {
        Self {
            class,
            hp: None,
            attack: None,
            attack_ability: None,
            support: None,
            charged: None,
        }
    }

    pub fn with_hp(mut self, hp: i32) -> Self {
        self.hp = Some(hp);
        self
    }

    pub fn with_attack(mut self, attack: i32) -> Self {
        self.attack = Some(attack);
        self
    }

    pub fn with_attack_ability(mut self, ability: AttackAbility) -> Self {
        self.attack_ability = Some(ability);
        self
    }

    pub fn with_support(mut self, ability: SupportAbility) -> Self {
        self.support = Some(ability);
        self
    }

    pub fn with_charged(mut self, ability: ChargedAbility) -> Self {
        self.charged = Some(ability);
        self
    }

    pub fn build(self) -> UnitSpec {
        let mut spec = match UnitSpec::ally(self.class, &table(), 0) {
            Ok(spec) => spec,
            Err(err) => panic!("Failed to build ally {}: {}", self.class, err),
        };

        if let Some(hp) = self.hp {
            spec.hp = hp;
        }
        if let UnitKind::Ally { attack, loadout, .. } = &mut spec.kind {
            if let Some(value) = self.attack {
                *attack = value;
            }
            let Loadout { attack: attack_ability, support, charged } = loadout.as_mut();
            if let Some(ability) = self.attack_ability {
                *attack_ability = ability;
            }
            if let Some(ability) = self.support {
                *support = ability;
            }
            if let Some(ability) = self.charged {
                *charged = ability;
            }
        }
        spec
    }
}

pub fn ally(class: ClassName) -> UnitSpec {
    TestAllyBuilder::new(class).build()
}

pub fn enemy(name: &str, hp: i32, damage: i32) -> UnitSpec {
    UnitSpec::enemy(name, hp, damage)
}

/// Assembles a battlefield. Rolls default to a fixed seed unless scripted.
pub struct TestBattleBuilder {
    allies: Vec<UnitSpec>,
    waves: Vec<Vec<UnitSpec>>,
    config: BattleConfig,
    rng: BattleRng,
}

impl TestBattleBuilder {
    pub fn new() -> Self {
        Self {
            allies: Vec::new(),
            waves: Vec::new(),
            config: BattleConfig::default(),
            rng: BattleRng::seeded(42),
        }
    }

    pub fn ally(mut self, spec: UnitSpec) -> Self {
        self.allies.push(spec);
        self
    }

    pub fn wave(mut self, wave: Vec<UnitSpec>) -> Self {
        self.waves.push(wave);
        self
    }

    pub fn starting_charge(mut self, charge: u8) -> Self {
        self.config.starting_charge = charge;
        self
    }

    /// Replays these 1-100 outcomes for every chance roll and random pick.
    pub fn rolls(mut self, outcomes: Vec<u8>) -> Self {
        self.rng = BattleRng::scripted(outcomes);
        self
    }

    /// The battlefield before the first turn has started.
    pub fn build(self) -> Battlefield {
        match Battlefield::new(self.allies, self.waves, &self.config, self.rng) {
            Ok(battlefield) => battlefield,
            Err(err) => panic!("Failed to build battlefield: {}", err),
        }
    }

    /// The battlefield at the start of turn one, with setup events cleared.
    pub fn started(self) -> Battlefield {
        let mut battlefield = self.build();
        battlefield.start().expect("first turn should start");
        battlefield.bus.drain();
        battlefield
    }
}

pub fn id(battlefield: &Battlefield, key: &str) -> UnitId {
    match battlefield.find(key) {
        Some(unit) => unit.id,
        None => panic!("no unit '{}' on the field", key),
    }
}

pub fn hp(battlefield: &Battlefield, key: &str) -> i32 {
    battlefield.require(id(battlefield, key)).map(|unit| unit.hp()).unwrap_or_default()
}

pub fn damage_events(events: &[BattleEvent]) -> Vec<(UnitId, UnitId, i32)> {
    events
        .iter()
        .filter_map(|event| match event {
            BattleEvent::DamageDealt { source, victim, damage, .. } => Some((*source, *victim, *damage)),
            _ => None,
        })
        .collect()
}
