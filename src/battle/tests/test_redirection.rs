#[cfg(test)]
mod tests {
    use crate::battle::battlefield::Battlefield;
    use crate::battle::state::BattleEvent;
    use crate::battle::tests::common::{ally, enemy, hp, id, TestBattleBuilder};
    use crate::effects::{Effect, EffectKind};
    use crate::unit::UnitId;
    use pretty_assertions::assert_eq;
    use schema::ClassName;

    fn field() -> Battlefield {
        TestBattleBuilder::new()
            .ally(ally(ClassName::Knight))
            .ally(ally(ClassName::Mage))
            .ally(ally(ClassName::Marksmen))
            .wave(vec![enemy("pig", 1000, 10), enemy("rat", 1000, 10)])
            .started()
    }

    fn devotion(protector: UnitId) -> Effect {
        Effect::new("Devotion", 3, EffectKind::Devotion { effectiveness: 40, protector })
    }

    #[test]
    fn test_mutual_devotion_resolves_in_two_passes() {
        let mut battlefield = field();
        let knight = id(&battlefield, "knight");
        let mage = id(&battlefield, "mage");
        let pig = id(&battlefield, "pig");

        battlefield
            .add_negative_effects(pig, vec![Effect::new("Attack", 3, EffectKind::ForceTarget { target: knight })])
            .unwrap();
        battlefield.add_positive_effects(knight, vec![devotion(mage)]).unwrap();
        battlefield.add_positive_effects(mage, vec![devotion(knight)]).unwrap();

        // Taunted onto the knight, whose devotion sends it on to the mage. The mage's
        // own devotion is never consulted.
        assert_eq!(battlefield.get_target(mage, pig), mage);
        assert_eq!(battlefield.get_target(knight, pig), mage);
    }

    #[test]
    fn test_redirect_to_missing_unit_is_ignored() {
        let mut battlefield = field();
        let mage = id(&battlefield, "mage");
        let pig = id(&battlefield, "pig");
        battlefield
            .add_negative_effects(pig, vec![Effect::new("Attack", 3, EffectKind::ForceTarget { target: UnitId(99) })])
            .unwrap();
        battlefield.bus.drain();

        assert_eq!(battlefield.get_target(mage, pig), mage);
        assert!(battlefield.bus.is_empty());
    }

    #[test]
    fn test_direct_hits_skip_redirection() {
        let mut battlefield = field();
        let knight = id(&battlefield, "knight");
        let mage = id(&battlefield, "mage");
        let pig = id(&battlefield, "pig");
        battlefield.add_positive_effects(mage, vec![devotion(knight)]).unwrap();

        let hit = battlefield.deal_damage(mage, 50, pig, Vec::new(), true).unwrap();

        assert_eq!(hit.victim, mage);
        assert_eq!(hp(&battlefield, "knight"), 230);
    }

    #[test]
    fn test_ambush_pulls_hits_onto_decoy_and_strikes_back() {
        let mut battlefield = field();
        let knight = id(&battlefield, "knight");
        let marksmen = id(&battlefield, "marksmen");
        let pig = id(&battlefield, "pig");

        // Marksmen ambushes from behind the knight.
        battlefield.use_support(marksmen, knight).unwrap();
        battlefield.bus.drain();

        let hit = battlefield.strike(pig, marksmen, 10, Vec::new(), false).unwrap();

        assert_eq!(hit.victim, knight);
        assert_eq!(hp(&battlefield, "knight"), 220);
        assert_eq!(hp(&battlefield, "marksmen"), 120);
        // Volley at half strength: two hits of 25% of 20, the second one weakened.
        assert_eq!(hp(&battlefield, "pig"), 1000 - 5 - 8);
        assert!(battlefield
            .bus
            .events()
            .contains(&BattleEvent::Redirected { attacker: pig, from: marksmen, to: knight }));
    }
}
