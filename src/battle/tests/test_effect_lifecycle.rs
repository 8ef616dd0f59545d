#[cfg(test)]
mod tests {
    use crate::battle::battlefield::Battlefield;
    use crate::battle::commands::Command;
    use crate::battle::state::BattleEvent;
    use crate::battle::tests::common::{ally, enemy, hp, id, TestBattleBuilder};
    use crate::effects::{Effect, EffectKind, Polarity};
    use pretty_assertions::assert_eq;
    use schema::ClassName;

    fn total_hp(battlefield: &Battlefield, key: &str) -> i32 {
        battlefield.require(id(battlefield, key)).unwrap().total_hp()
    }

    #[test]
    fn test_giant_growth_grows_and_shrinks_on_dispel() {
        let mut battlefield = TestBattleBuilder::new()
            .ally(ally(ClassName::Witch))
            .ally(ally(ClassName::Knight))
            .wave(vec![enemy("pig", 1000, 10)])
            .started();
        let witch = id(&battlefield, "witch");

        battlefield.execute(Command::Support { ally: "witch".into(), target: None }).unwrap();
        assert_eq!(total_hp(&battlefield, "witch"), 240);
        assert_eq!(hp(&battlefield, "witch"), 240);

        assert_eq!(battlefield.dispel(witch), vec!["Giant Growth".to_string()]);
        assert_eq!(total_hp(&battlefield, "witch"), 200);
        assert_eq!(hp(&battlefield, "witch"), 200);
    }

    #[test]
    fn test_giant_growth_expires_after_its_turns() {
        let mut battlefield = TestBattleBuilder::new()
            .ally(ally(ClassName::Witch))
            .wave(vec![enemy("pig", 10_000, 0)])
            .started();
        let attack = || Command::Attack { ally: "witch".into(), target: Some("pig".into()) };

        battlefield.execute(Command::Support { ally: "witch".into(), target: None }).unwrap();
        assert_eq!(battlefield.turn(), 2);
        battlefield.execute(attack()).unwrap();
        assert_eq!(total_hp(&battlefield, "witch"), 240);

        battlefield.execute(attack()).unwrap();
        assert_eq!(battlefield.turn(), 4);
        assert_eq!(total_hp(&battlefield, "witch"), 200);
        assert!(battlefield.bus.events().contains(&BattleEvent::EffectExpired {
            target: id(&battlefield, "witch"),
            effect: "Giant Growth".to_string(),
        }));
    }

    #[test]
    fn test_giant_growth_boosts_damage() {
        let mut battlefield = TestBattleBuilder::new()
            .ally(ally(ClassName::Witch))
            .ally(ally(ClassName::Knight))
            .wave(vec![enemy("pig", 1000, 10)])
            .started();
        let knight = id(&battlefield, "knight");
        let pig = id(&battlefield, "pig");
        let growth = EffectKind::GiantGrowth { attack: 20, health: 20, boost: 0 };
        battlefield
            .add_positive_effects(knight, vec![Effect::new("Giant Growth", 3, growth)])
            .unwrap();

        let hit = battlefield.strike(knight, pig, 23, Vec::new(), false).unwrap();
        assert_eq!(hit.damage, 27);
        // The boost is taken in whole hundreds of total health: 230 grows by 2 * 20.
        assert_eq!(total_hp(&battlefield, "knight"), 270);
    }

    #[test]
    fn test_immune_unit_rejects_negative_effects() {
        let mut battlefield = TestBattleBuilder::new()
            .ally(ally(ClassName::Knight))
            .wave(vec![enemy("pig", 1000, 10)])
            .started();
        let knight = id(&battlefield, "knight");
        battlefield
            .add_positive_effects(knight, vec![Effect::new("Aura Mist", 3, EffectKind::Immunity)])
            .unwrap();
        battlefield.bus.drain();

        let applied = battlefield
            .add_negative_effects(knight, vec![Effect::new("Heavy Metal", 1, EffectKind::Knock)])
            .unwrap();

        assert!(applied.is_empty());
        assert!(battlefield.require(knight).unwrap().neg_effects().is_empty());
        assert!(battlefield.bus.is_empty());

        // Immunity itself survives a dispel.
        assert!(battlefield.dispel(knight).is_empty());
        assert!(battlefield.require(knight).unwrap().is_immune());
    }

    #[test]
    fn test_cleanse_removes_every_negative_effect() {
        let mut battlefield = TestBattleBuilder::new()
            .ally(ally(ClassName::Knight))
            .wave(vec![enemy("pig", 1000, 10)])
            .started();
        let knight = id(&battlefield, "knight");
        battlefield
            .add_negative_effects(
                knight,
                vec![
                    Effect::new("Heavy Metal", 1, EffectKind::Knock),
                    Effect::new("Volley", 3, EffectKind::Weaken { effectiveness: 35 }),
                ],
            )
            .unwrap();
        battlefield
            .add_positive_effects(knight, vec![Effect::new("Protect", 2, EffectKind::Shield { effectiveness: 55 })])
            .unwrap();
        battlefield.bus.drain();

        let removed = battlefield.cleanse(knight);

        assert_eq!(removed, vec!["Heavy Metal".to_string(), "Volley".to_string()]);
        let unit = battlefield.require(knight).unwrap();
        assert!(unit.neg_effects().is_empty());
        assert!(unit.effect(Polarity::Positive, "Protect").is_some());
        assert_eq!(
            battlefield.bus.events(),
            &[
                BattleEvent::EffectCleansed { target: knight, effect: "Heavy Metal".to_string() },
                BattleEvent::EffectCleansed { target: knight, effect: "Volley".to_string() },
            ]
        );
    }

    #[test]
    fn test_matildas_medicine_cleanses_then_heals() {
        let mut battlefield = TestBattleBuilder::new()
            .ally(ally(ClassName::Cleric))
            .ally(ally(ClassName::Knight))
            .wave(vec![enemy("pig", 1000, 10)])
            .starting_charge(100)
            .started();
        let knight = id(&battlefield, "knight");
        battlefield.require_mut(knight).unwrap().set_hp(100);
        battlefield
            .add_negative_effects(knight, vec![Effect::new("Acid Rain", 3, EffectKind::ToxicPoison { damage: 7 })])
            .unwrap();

        battlefield.execute(Command::Charged { ally: "cleric".into() }).unwrap();

        // 35% of the knight's 230 total health.
        assert_eq!(hp(&battlefield, "knight"), 180);
        assert!(battlefield.require(knight).unwrap().neg_effects().is_empty());
        assert_eq!(battlefield.charge(), 0);
    }
}
