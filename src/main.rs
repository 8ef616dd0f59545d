use bird_battle::battle::runner::ConsoleSource;
use bird_battle::progression::level_from_xp;
use bird_battle::{
    dummy_waves, run_battle, AbilityTable, BattleConfig, BattleOutcome, BattleResult, BattleRng, ClassName,
};
use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Fight waves of practice dummies with up to three birds.
#[derive(Debug, Parser)]
#[command(name = "bird-battle", version)]
struct Args {
    /// Class to bring into battle. Repeat for each ally.
    #[arg(long = "ally", required = true)]
    allies: Vec<ClassName>,

    /// Number of enemy waves.
    #[arg(long, default_value_t = 5)]
    waves: usize,

    /// Seed for every random roll. Uses OS entropy when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Ability table to load instead of the built-in one.
    #[arg(long)]
    data: Option<PathBuf>,

    /// Level every ally is scaled to.
    #[arg(long, default_value_t = 0, conflicts_with = "xp")]
    level: u32,

    /// Derive the level from accumulated experience instead.
    #[arg(long)]
    xp: Option<u64>,

    /// Experience needed for the first level when using --xp.
    #[arg(long, default_value_t = 100)]
    level_scale: u64,

    /// Charge the chili meter starts at.
    #[arg(long, default_value_t = 0)]
    starting_charge: u8,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bird_battle=info")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(outcome) => {
            info!(?outcome, "battle finished");
            match outcome {
                BattleOutcome::Won | BattleOutcome::Aborted => ExitCode::SUCCESS,
                BattleOutcome::Lost => ExitCode::from(1),
            }
        }
        Err(err) => {
            error!(error = %err, "battle failed");
            eprintln!("Error: {}", err);
            ExitCode::from(2)
        }
    }
}

fn run(args: Args) -> BattleResult<BattleOutcome> {
    let table = match &args.data {
        Some(path) => AbilityTable::load(path)?,
        None => AbilityTable::builtin()?,
    };

    let level = args.xp.map_or(args.level, |xp| level_from_xp(xp, args.level_scale));
    let config = BattleConfig {
        starting_charge: args.starting_charge,
        level,
        ..BattleConfig::default()
    };

    let mut rng = match args.seed {
        Some(seed) => BattleRng::seeded(seed),
        None => BattleRng::from_entropy(),
    };
    let waves = dummy_waves(args.waves, &mut rng);

    println!("Battle started! Type 'help' for a list of commands.");
    let stdin = io::stdin();
    let mut source = ConsoleSource::new(stdin.lock(), io::stdout());
    run_battle(&args.allies, waves, &config, &table, rng, &mut source)
}
