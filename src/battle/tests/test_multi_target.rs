#[cfg(test)]
mod tests {
    use crate::battle::battlefield::Battlefield;
    use crate::battle::commands::{Command, CommandOutcome};
    use crate::battle::tests::common::{ally, enemy, id, TestBattleBuilder};
    use crate::effects::{Effect, EffectKind};
    use crate::unit::Side;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use schema::ClassName;

    fn field_with(class: ClassName, enemies: usize) -> Battlefield {
        let wave = (0..enemies).map(|i| enemy(&format!("e{}", i), 100, 10)).collect();
        TestBattleBuilder::new()
            .ally(ally(class))
            .ally(ally(ClassName::Knight))
            .wave(wave)
            .started()
    }

    fn losses(battlefield: &Battlefield) -> Vec<i32> {
        battlefield.enemies().iter().map(|unit| 100 - unit.hp()).collect()
    }

    // Tiers are 100%, 67%, 45% and 30% of 20.
    #[rstest]
    #[case(1, 0, vec![20])]
    #[case(2, 1, vec![13, 20])]
    #[case(5, 0, vec![20, 13, 9, 6, 0])]
    #[case(5, 4, vec![0, 6, 9, 13, 20])]
    #[case(5, 2, vec![0, 9, 20, 13, 6])]
    #[case(5, 3, vec![0, 6, 9, 20, 13])]
    #[case(3, 1, vec![9, 20, 13])]
    fn test_chain_lightning_jumps(#[case] enemies: usize, #[case] target: usize, #[case] expected: Vec<i32>) {
        let mut battlefield = field_with(ClassName::Wizard, enemies);
        let wizard = id(&battlefield, "wizard");
        let target = battlefield.ids_on(Side::Enemy)[target];

        battlefield.attack_with(wizard, target, 100).unwrap();

        assert_eq!(losses(&battlefield), expected);
    }

    #[test]
    fn test_storm_needs_no_target() {
        let mut battlefield = field_with(ClassName::Mage, 3);

        let outcome = battlefield.execute(Command::Attack { ally: "mage".into(), target: None }).unwrap();

        assert_eq!(outcome, CommandOutcome::Resolved);
        // 55% of 20 on everyone.
        assert_eq!(losses(&battlefield), vec![11, 11, 11]);
    }

    #[test]
    fn test_acid_rain_poisons_every_enemy() {
        let mut battlefield = field_with(ClassName::Rainbird, 2);

        battlefield.execute(Command::Attack { ally: "rainbird".into(), target: None }).unwrap();

        assert_eq!(losses(&battlefield), vec![4, 4]);
        assert!(battlefield.enemies().iter().all(|unit| unit.neg_effects().len() == 1));
    }

    #[test]
    fn test_energy_drain_dispels_on_successful_roll() {
        let mut battlefield = TestBattleBuilder::new()
            .ally(ally(ClassName::LightningBird))
            .wave(vec![enemy("pig", 100, 10), enemy("rat", 100, 10)])
            .rolls(vec![10, 90])
            .started();
        let bird = id(&battlefield, "lightning-bird");
        let pig = id(&battlefield, "pig");
        let rat = id(&battlefield, "rat");
        for enemy in [pig, rat] {
            let shield = Effect::new("Protect", 2, EffectKind::Shield { effectiveness: 0 });
            battlefield.add_positive_effects(enemy, vec![shield]).unwrap();
        }

        battlefield.attack_with(bird, pig, 100).unwrap();

        assert!(battlefield.require(pig).unwrap().pos_effects().is_empty());
        assert_eq!(battlefield.require(rat).unwrap().pos_effects().len(), 1);
        assert_eq!(losses(&battlefield), vec![9, 9]);
    }

    #[test]
    fn test_thunderclap_weakens_only_chosen_target() {
        let mut battlefield = field_with(ClassName::Thunderbird, 3);
        let thunderbird = id(&battlefield, "thunderbird");
        let chosen = battlefield.ids_on(Side::Enemy)[1];

        battlefield.attack_with(thunderbird, chosen, 100).unwrap();

        assert_eq!(losses(&battlefield), vec![10, 10, 10]);
        let weakened: Vec<bool> = battlefield.enemies().iter().map(|unit| !unit.neg_effects().is_empty()).collect();
        assert_eq!(weakened, vec![false, true, false]);
    }
}
