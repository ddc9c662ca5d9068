//! Salt Droppee headless simulator
//!
//! The browser build drives the core through `salt_droppee::web`. Natively
//! there is no window: this binary plays seeded runs with a simple autoplay
//! bot and prints the run results as JSON. Handy for tuning config tables.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::fs;
    use std::path::{Path, PathBuf};

    use anyhow::{Context, Result};
    use clap::Parser;
    use serde::Serialize;

    use salt_droppee::consts::DEFAULT_DT;
    use salt_droppee::persistence::{MemorySink, Progress};
    use salt_droppee::sim::{Game, GameEvent, GamePhase, ItemKind, TickInput, tick};
    use salt_droppee::{Config, HighScores, ResultSink, RunResult};

    #[derive(Parser, Debug)]
    #[command(name = "salt-droppee")]
    #[command(about = "Play seeded Salt Droppee runs headless and print the results")]
    pub struct Cli {
        /// Run seed
        #[arg(long, default_value_t = 1)]
        seed: u64,
        /// JSON config file (defaults to the built-in table)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Stop after this many levels
        #[arg(long, default_value_t = 10)]
        max_levels: u32,
        /// Play one Legend run once it unlocks
        #[arg(long)]
        legend: bool,
        /// Safety cap on simulated seconds per run (endless Legend)
        #[arg(long, default_value_t = 600.0)]
        max_run_sec: f32,
        /// Pretty-print the JSON report
        #[arg(long)]
        pretty: bool,
    }

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Report {
        seed: u64,
        results: Vec<RunResult>,
        progress: Progress,
        high_scores: HighScores,
    }

    /// Chase the lowest good item, sidestep hazards about to land
    pub fn autoplay(game: &Game) -> TickInput {
        let wallet = game.wallet();
        let reach = wallet.width;

        let threat = game
            .items()
            .iter()
            .filter(|i| i.kind() == ItemKind::Bad && i.progress > 0.7)
            .filter(|i| (i.pos.x - wallet.x).abs() < reach)
            .max_by(|a, b| a.progress.total_cmp(&b.progress));

        let target = game
            .items()
            .iter()
            .filter(|i| i.kind() != ItemKind::Bad)
            .max_by(|a, b| a.progress.total_cmp(&b.progress))
            .map(|i| i.pos.x);

        let raw = match (threat, target) {
            (Some(bad), _) => {
                if bad.pos.x >= wallet.x {
                    -1.0
                } else {
                    1.0
                }
            }
            (None, Some(x)) => ((x - wallet.x) / 40.0).clamp(-1.0, 1.0),
            (None, None) => 0.0,
        };

        TickInput {
            axis: game.effective_axis(raw),
            dash: threat.is_some(),
            pause: false,
        }
    }

    /// Tick until the current run leaves Playing or hits the cap
    fn play_run(game: &mut Game, max_run_sec: f32) -> Vec<GameEvent> {
        let max_frames = (max_run_sec / DEFAULT_DT).ceil() as u64;
        let mut events = Vec::new();
        let mut frames = 0;
        while game.phase() == GamePhase::Playing && frames < max_frames {
            let input = autoplay(game);
            tick(game, &input, DEFAULT_DT);
            events.extend(game.drain_events());
            frames += 1;
        }
        if game.phase() == GamePhase::Playing {
            log::warn!("Run capped after {max_run_sec:.0}s of play");
            game.to_title();
        }
        events
    }

    fn load_config(path: &Path) -> Result<Config> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Config::from_json_str(&json).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn run(cli: Cli) -> Result<()> {
        let config = match &cli.config {
            Some(path) => load_config(path)?,
            None => Config::default(),
        };
        let mut game = Game::new(config, cli.seed).context("invalid config")?;
        let mut results = MemorySink::default();
        let mut progress = Progress::default();
        let mut high_scores = HighScores::new();

        log::info!("Headless run, seed {}", cli.seed);
        game.start_run()?;
        let mut levels_played = 0;
        loop {
            for event in play_run(&mut game, cli.max_run_sec) {
                match event {
                    GameEvent::RunEnded { result } => {
                        let sinks: [&mut dyn ResultSink; 3] =
                            [&mut results, &mut progress, &mut high_scores];
                        for sink in sinks {
                            sink.submit(&result);
                        }
                    }
                    GameEvent::LegendUnlocked => {
                        progress.unlock_legend();
                    }
                    _ => {}
                }
            }
            levels_played += 1;

            match game.phase() {
                GamePhase::InterLevel if levels_played < cli.max_levels => game.next_level()?,
                _ => break,
            }
        }

        if cli.legend && game.legend_unlocked() {
            game.start_legend()?;
            for event in play_run(&mut game, cli.max_run_sec) {
                if let GameEvent::RunEnded { result } = event {
                    let sinks: [&mut dyn ResultSink; 3] =
                        [&mut results, &mut progress, &mut high_scores];
                    for sink in sinks {
                        sink.submit(&result);
                    }
                }
            }
        }

        let report = Report {
            seed: cli.seed,
            results: results.results,
            progress,
            high_scores,
        };
        let json = if cli.pretty {
            serde_json::to_string_pretty(&report)
        } else {
            serde_json::to_string(&report)
        }
        .context("encoding report")?;
        println!("{json}");
        Ok(())
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use clap::Parser;

    env_logger::init();
    headless::run(headless::Cli::parse())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser entry point is `salt_droppee::web::start`
}
