#[cfg(test)]
mod tests {
    use crate::battle::commands::{Command, CommandOutcome};
    use crate::battle::state::{BattleEvent, BattleOutcome, GameState};
    use crate::battle::tests::common::{ally, enemy, id, TestAllyBuilder, TestBattleBuilder};
    use crate::unit::{Side, UnitId};
    use pretty_assertions::assert_eq;
    use schema::ClassName;

    fn attack(ally: &str, target: &str) -> Command {
        Command::Attack { ally: ally.to_string(), target: Some(target.to_string()) }
    }

    #[test]
    fn test_clearing_a_wave_brings_the_next_with_fresh_ids() {
        let mut battlefield = TestBattleBuilder::new()
            .ally(ally(ClassName::Knight))
            .wave(vec![enemy("pig", 1, 10)])
            .wave(vec![enemy("rat", 1, 10), enemy("crow", 1, 10)])
            .started();
        let knight = id(&battlefield, "knight");
        assert_eq!(id(&battlefield, "pig"), UnitId(2));

        let outcome = battlefield.execute(attack("knight", "pig")).unwrap();

        assert_eq!(outcome, CommandOutcome::Resolved);
        assert_eq!(battlefield.wave(), 2);
        assert_eq!(battlefield.ids_on(Side::Enemy), vec![UnitId(3), UnitId(4)]);
        assert!(battlefield.find("pig").is_none());
        // The new wave gives every ally a fresh action.
        assert_eq!(battlefield.state(), GameState::AwaitingAllyInput);
        assert!(!battlefield.has_acted(knight));

        let events = battlefield.bus.events();
        assert!(events.contains(&BattleEvent::UnitDied { unit: UnitId(2) }));
        assert!(events.contains(&BattleEvent::WaveCleared { wave: 1 }));
        assert!(events.contains(&BattleEvent::WaveStarted { wave: 2 }));
        // Names of the fallen stay available for narration.
        assert_eq!(battlefield.name_of(UnitId(2)), "pig");
    }

    #[test]
    fn test_last_wave_cleared_wins() {
        let mut battlefield = TestBattleBuilder::new()
            .ally(ally(ClassName::Knight))
            .wave(vec![enemy("pig", 1, 10)])
            .wave(vec![enemy("rat", 1, 10)])
            .started();

        battlefield.execute(attack("knight", "pig")).unwrap();
        let outcome = battlefield.execute(attack("knight", "rat")).unwrap();

        assert_eq!(outcome, CommandOutcome::Finished(BattleOutcome::Won));
        assert_eq!(battlefield.state(), GameState::Won);
        assert_eq!(
            battlefield.bus.events().last(),
            Some(&BattleEvent::BattleEnded { outcome: BattleOutcome::Won })
        );

        // Nothing else happens once the battle is over.
        let after = battlefield.execute(Command::Turns).unwrap();
        assert_eq!(after, CommandOutcome::Finished(BattleOutcome::Won));
    }

    #[test]
    fn test_losing_every_ally_loses() {
        let mut battlefield = TestBattleBuilder::new()
            .ally(TestAllyBuilder::new(ClassName::Knight).with_hp(10).build())
            .wave(vec![enemy("pig", 1000, 100)])
            .started();

        let outcome = battlefield
            .execute(Command::Support { ally: "knight".into(), target: None })
            .unwrap();

        assert_eq!(outcome, CommandOutcome::Finished(BattleOutcome::Lost));
        assert!(battlefield.allies().is_empty());
    }

    #[test]
    fn test_mutual_destruction_counts_as_loss() {
        let mut battlefield = TestBattleBuilder::new()
            .ally(ally(ClassName::Knight))
            .wave(vec![enemy("pig", 10, 10)])
            .started();
        let knight = id(&battlefield, "knight");
        let pig = id(&battlefield, "pig");

        battlefield.require_mut(knight).unwrap().set_hp(0);
        battlefield.require_mut(pig).unwrap().set_hp(-5);

        assert_eq!(battlefield.death_check(), Some(BattleOutcome::Lost));
        assert_eq!(battlefield.outcome(), Some(BattleOutcome::Lost));
    }

    #[test]
    fn test_abort_ends_battle_at_any_time() {
        let mut battlefield = TestBattleBuilder::new()
            .ally(ally(ClassName::Knight))
            .wave(vec![enemy("pig", 10, 10)])
            .started();

        assert_eq!(
            battlefield.execute(Command::Abort { confirmed: false }).unwrap(),
            CommandOutcome::AbortCancelled
        );
        assert!(!battlefield.is_finished());

        assert_eq!(
            battlefield.execute(Command::Abort { confirmed: true }).unwrap(),
            CommandOutcome::Finished(BattleOutcome::Aborted)
        );
        assert_eq!(battlefield.state(), GameState::Aborted);
    }
}
