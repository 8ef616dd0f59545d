#[cfg(test)]
mod tests {
    use crate::battle::battlefield::Battlefield;
    use crate::battle::commands::{Command, CommandOutcome, InputError, UnitStatus, HELP_TEXT};
    use crate::battle::state::BattleOutcome;
    use crate::battle::tests::common::{ally, enemy, id, TestBattleBuilder};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use schema::ClassName;

    fn field() -> Battlefield {
        TestBattleBuilder::new()
            .ally(ally(ClassName::Knight))
            .ally(ally(ClassName::Mage))
            .wave(vec![enemy("dummy1", 100, 0), enemy("dummy10", 100, 0)])
            .started()
    }

    fn attack(ally: &str, target: Option<&str>) -> Command {
        Command::Attack { ally: ally.to_string(), target: target.map(str::to_string) }
    }

    #[rstest]
    #[case("dummy1", "dummy1")]
    #[case("dummy10", "dummy10")]
    #[case("k", "knight")]
    #[case("ma", "mage")]
    fn test_exact_name_wins_over_prefix(#[case] reference: &str, #[case] expected: &str) {
        let battlefield = field();
        assert_eq!(battlefield.resolve_unit(reference), Ok(id(&battlefield, expected)));
    }

    #[test]
    fn test_ambiguous_and_unknown_references() {
        let battlefield = field();

        assert_eq!(
            battlefield.resolve_unit("dum"),
            Err(InputError::AmbiguousUnit {
                reference: "dum".to_string(),
                candidates: vec!["dummy1".to_string(), "dummy10".to_string()],
            })
        );
        assert_eq!(battlefield.resolve_unit("pig"), Err(InputError::UnknownUnit("pig".to_string())));
    }

    #[test]
    fn test_wrong_side_is_rejected_without_using_the_action() {
        let mut battlefield = field();
        let knight = id(&battlefield, "knight");

        let outcome = battlefield.execute(attack("knight", Some("mage"))).unwrap();
        assert_eq!(outcome, CommandOutcome::Rejected(InputError::NotAnEnemy("mage".to_string())));
        assert!(!battlefield.has_acted(knight));

        let outcome = battlefield.execute(Command::Support { ally: "dummy1".into(), target: None }).unwrap();
        assert_eq!(outcome, CommandOutcome::Rejected(InputError::NotAnAlly("dummy1".to_string())));
    }

    #[test]
    fn test_each_ally_acts_once_per_turn() {
        let mut battlefield = field();

        assert_eq!(battlefield.execute(attack("knight", Some("dummy1"))).unwrap(), CommandOutcome::Resolved);
        let outcome = battlefield.execute(attack("kn", Some("dummy1"))).unwrap();

        assert_eq!(outcome, CommandOutcome::Rejected(InputError::AlreadyActed("knight".to_string())));
        assert_eq!(battlefield.turn(), 1);
    }

    #[test]
    fn test_single_target_attacks_need_a_target() {
        let mut battlefield = field();

        let outcome = battlefield.execute(attack("knight", None)).unwrap();

        assert_eq!(outcome, CommandOutcome::Rejected(InputError::TargetRequired("Attack".to_string())));
        assert_eq!(outcome.describe(), Some("Attack needs a target".to_string()));
    }

    #[test]
    fn test_turns_lists_allies_still_to_act() {
        let mut battlefield = field();
        let mage = id(&battlefield, "mage");

        battlefield.execute(attack("knight", Some("dummy10"))).unwrap();
        let outcome = battlefield.execute(Command::Turns).unwrap();

        assert_eq!(
            outcome,
            CommandOutcome::Unacted(vec![UnitStatus {
                id: mage,
                name: "mage".to_string(),
                hp: 170,
                total_hp: 170,
                effects: Vec::new(),
            }])
        );
        assert_eq!(outcome.describe(), Some("  mage: 170/170 hp".to_string()));
    }

    #[test]
    fn test_stat_shows_health_and_effects() {
        let mut battlefield = field();

        battlefield.execute(attack("knight", Some("dummy10"))).unwrap();
        let outcome = battlefield.execute(Command::Stat { unit: "dummy10".into() }).unwrap();

        let CommandOutcome::Status(status) = outcome else {
            panic!("expected a status, got {:?}", outcome);
        };
        assert_eq!(status.hp, 100 - 23);
        assert_eq!(status.effects, vec![("Attack".to_string(), 3)]);
        assert_eq!(status.to_string(), "dummy10: 77/100 hp [Attack (3)]");
    }

    #[test]
    fn test_help_and_abort_flow() {
        let mut battlefield = field();

        let help = battlefield.execute(Command::Help).unwrap();
        assert_eq!(help.describe(), Some(HELP_TEXT.to_string()));

        assert_eq!(
            battlefield.execute(Command::Abort { confirmed: false }).unwrap(),
            CommandOutcome::AbortCancelled
        );
        assert!(!battlefield.is_finished());

        assert_eq!(
            battlefield.execute(Command::Abort { confirmed: true }).unwrap(),
            CommandOutcome::Finished(BattleOutcome::Aborted)
        );
        // Nothing else is accepted once the battle is over.
        assert_eq!(
            battlefield.execute(attack("knight", Some("dummy1"))).unwrap(),
            CommandOutcome::Finished(BattleOutcome::Aborted)
        );
    }
}
