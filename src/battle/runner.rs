//! The outer battle loop: builds a battlefield, feeds it commands from a
//! `CommandSource` and hands every batch of events back for display.

use crate::battle::battlefield::{BattleConfig, Battlefield};
use crate::battle::commands::{Command, CommandOutcome};
use crate::battle::state::{BattleEvent, BattleOutcome, BattleRng};
use crate::errors::{BattleResult, SetupError};
use crate::unit::UnitSpec;
use schema::{AbilityTable, ClassName};
use std::collections::VecDeque;
use std::io::{BufRead, Write};
use tracing::{info, warn};

/// Where battle commands come from and where their results go.
pub trait CommandSource {
    /// The next raw command line, or `None` once input is exhausted.
    fn next_command(&mut self, battlefield: &Battlefield) -> Option<String>;

    /// Called after setup and after every command with the events it produced.
    fn report(&mut self, battlefield: &Battlefield, events: &[BattleEvent], outcome: Option<&CommandOutcome>);
}

/// Builds one ally per class, scaled to `level`.
pub fn build_allies(roster: &[ClassName], table: &AbilityTable, level: u32) -> Result<Vec<UnitSpec>, SetupError> {
    roster.iter().map(|&class| UnitSpec::ally(class, table, level)).collect()
}

/// Builds a battlefield and runs it to completion.
pub fn run_battle(
    roster: &[ClassName],
    waves: Vec<Vec<UnitSpec>>,
    config: &BattleConfig,
    table: &AbilityTable,
    rng: BattleRng,
    source: &mut dyn CommandSource,
) -> BattleResult<BattleOutcome> {
    let allies = build_allies(roster, table, config.level)?;
    let mut battlefield = Battlefield::new(allies, waves, config, rng)?;
    info!(allies = roster.len(), waves = battlefield.remaining_waves() + 1, "battle started");

    battlefield.start()?;
    let events = battlefield.bus.drain();
    source.report(&battlefield, &events, None);

    loop {
        if let Some(outcome) = battlefield.outcome() {
            return Ok(outcome);
        }

        let outcome = match source.next_command(&battlefield) {
            Some(line) => match Command::parse(&line) {
                Ok(command) => battlefield.execute(command)?,
                Err(error) => CommandOutcome::Rejected(error),
            },
            None => {
                info!("input exhausted, aborting battle");
                battlefield.execute(Command::Abort { confirmed: true })?
            }
        };

        let events = battlefield.bus.drain();
        source.report(&battlefield, &events, Some(&outcome));
    }
}

/// Practice waves: seven weak dummies, then `count - 1` waves of seven growing ones.
/// Each later dummy's health and damage land 20 either side of ten times its wave
/// level, or right on it.
pub fn dummy_waves(count: usize, rng: &mut BattleRng) -> Vec<Vec<UnitSpec>> {
    const SPREAD: i32 = 20;
    const WAVE_SIZE: usize = 7;

    let mut waves = Vec::with_capacity(count);
    if count == 0 {
        return waves;
    }
    waves.push((0..WAVE_SIZE).map(|i| UnitSpec::enemy(&format!("dummy{}", i), 10, 10)).collect());

    for level in (5..).take(count - 1) {
        let base = level * 10;
        let choices = [base - SPREAD, base, base + SPREAD];
        let wave = (0..WAVE_SIZE)
            .map(|slot| {
                let hp = choices[rng.pick_index(choices.len())];
                let damage = choices[rng.pick_index(choices.len())];
                UnitSpec::enemy(&format!("dummy{}{}", slot, level), hp, damage)
            })
            .collect();
        waves.push(wave);
    }
    waves
}

/// Replays a fixed list of command lines and records everything reported back.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    commands: VecDeque<String>,
    pub events: Vec<BattleEvent>,
    pub outcomes: Vec<CommandOutcome>,
}

impl ScriptedSource {
    pub fn new<I, S>(commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            commands: commands.into_iter().map(Into::into).collect(),
            events: Vec::new(),
            outcomes: Vec::new(),
        }
    }
}

impl CommandSource for ScriptedSource {
    fn next_command(&mut self, _battlefield: &Battlefield) -> Option<String> {
        self.commands.pop_front()
    }

    fn report(&mut self, _battlefield: &Battlefield, events: &[BattleEvent], outcome: Option<&CommandOutcome>) {
        self.events.extend_from_slice(events);
        self.outcomes.extend(outcome.cloned());
    }
}

/// Interactive source reading commands line by line and printing narration.
pub struct ConsoleSource<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ConsoleSource<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn emit(&mut self, text: &str) {
        if let Err(error) = writeln!(self.output, "{}", text) {
            warn!(%error, "failed to write battle output");
        }
    }
}

impl<R: BufRead, W: Write> CommandSource for ConsoleSource<R, W> {
    fn next_command(&mut self, battlefield: &Battlefield) -> Option<String> {
        let prompt = format!(
            "[turn {} | wave {} | chili {}%] > ",
            battlefield.turn(),
            battlefield.wave(),
            battlefield.charge()
        );
        if write!(self.output, "{}", prompt).and_then(|_| self.output.flush()).is_err() {
            return None;
        }

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim().to_string()),
            Err(error) => {
                warn!(%error, "failed to read command");
                None
            }
        }
    }

    fn report(&mut self, battlefield: &Battlefield, events: &[BattleEvent], outcome: Option<&CommandOutcome>) {
        for event in events {
            if let Some(text) = event.format(battlefield) {
                self.emit(&text);
            }
        }
        if let Some(text) = outcome.and_then(CommandOutcome::describe) {
            self.emit(&text);
        }
    }
}
