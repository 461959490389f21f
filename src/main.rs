//! Sky Hop entry point
//!
//! The browser build is driven from JS through `sky_hop::web`. Natively this
//! runs a headless match, handy for checking seeds and arena tables.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;
    use std::process::ExitCode;

    use clap::Parser;
    use env_logger::{Builder, Env};
    use log::LevelFilter;
    use serde::Serialize;

    use sky_hop::arena::{ArenaTable, Difficulty};
    use sky_hop::error::ConfigError;
    use sky_hop::game::Game;
    use sky_hop::settings::Settings;
    use sky_hop::sim::{GamePhase, MatchParams};

    /// Run a Sky Hop match without a renderer
    #[derive(Parser, Debug)]
    #[command(author, version, about, long_about = None)]
    struct Args {
        /// Match seed (random when omitted)
        #[arg(long)]
        seed: Option<u32>,

        /// Arena id
        #[arg(long, default_value = "2")]
        arena: String,

        /// easy, normal or hard
        #[arg(long, value_parser = parse_difficulty)]
        difficulty: Option<Difficulty>,

        /// Platform slots (overrides the difficulty's count)
        #[arg(long)]
        platforms: Option<usize>,

        /// Give up after this many ticks
        #[arg(long, default_value_t = 20_000)]
        max_ticks: u64,

        /// Extra arenas as a JSON object keyed by id
        #[arg(long)]
        arenas: Option<PathBuf>,

        /// Settings file; supplies the difficulty when none is given
        #[arg(long)]
        settings: Option<PathBuf>,

        #[arg(long, default_value_t = 1)]
        user_id: u64,

        /// Let the simulation play itself
        #[arg(long)]
        autopilot: bool,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    }

    fn parse_difficulty(s: &str) -> Result<Difficulty, String> {
        Difficulty::from_str(s).ok_or_else(|| format!("unknown difficulty `{s}`"))
    }

    /// Printed as JSON when the run ends
    #[derive(Debug, Serialize)]
    struct Summary {
        seed: u32,
        arena: String,
        phase: GamePhase,
        ticks: u64,
        score: u64,
        relaxed_placements: u32,
    }

    fn init_logging(verbose: bool) {
        let level = if verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        };

        let env = Env::default().default_filter_or(level.to_string());
        let _ = Builder::from_env(env).try_init();
    }

    fn run(args: &Args) -> Result<Summary, ConfigError> {
        let mut arenas = ArenaTable::builtin();
        if let Some(path) = &args.arenas {
            let extra = ArenaTable::load(path)?;
            log::info!("Loaded {} arenas from {}", extra.len(), path.display());
            arenas.extend(extra);
        }

        let settings = match &args.settings {
            Some(path) => Settings::load_from(path)?,
            None => Settings::default(),
        };
        let difficulty = args.difficulty.unwrap_or(settings.difficulty);

        let seed = args.seed.unwrap_or_else(rand::random);
        let arena = arenas.get(&args.arena)?.with_difficulty(difficulty);
        let platform_count = args
            .platforms
            .unwrap_or_else(|| difficulty.platform_count());
        log::info!(
            "Seed {} on arena {} ({})",
            seed,
            arena.id,
            difficulty.as_str()
        );

        let params =
            MatchParams::new(seed, args.user_id, arena).with_platform_count(platform_count);
        let mut game = Game::new(params)?;
        game.set_autopilot(args.autopilot);

        while !game.is_stopped() && game.state().time_ticks < args.max_ticks {
            game.step();
            for message in game.shell_messages() {
                log::debug!("-> {}", message.to_relay().to_json());
            }
        }
        if !game.is_over() {
            log::info!("Tick limit reached");
            game.stop();
        }

        let state = game.state();
        Ok(Summary {
            seed,
            arena: state.arena().id.clone(),
            phase: state.phase,
            ticks: state.time_ticks,
            score: state.score,
            relaxed_placements: state.relaxed_placements,
        })
    }

    pub fn main() -> ExitCode {
        let args = Args::parse();
        init_logging(args.verbose);
        log::info!("Sky Hop (headless) starting...");

        match run(&args) {
            Ok(summary) => {
                match serde_json::to_string_pretty(&summary) {
                    Ok(json) => println!("{json}"),
                    Err(e) => log::error!("Could not encode summary: {e}"),
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                log::error!("{e}");
                ExitCode::FAILURE
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    headless::main()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is sky_hop::web::start, this is just to satisfy the compiler
}
