use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use clap::Parser;
use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use tracing::{debug, error, info, warn};

use lemmings_core::{
    ChannelInput, FeedbackSinks, LevelCatalog, PlayerIntent, Simulation, SimulationConfig,
    TracingSink,
};
use lemmings_runtime::{parse_command_line, CommandPayload};

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless lemmings simulation driven from stdin", long_about = None)]
struct Cli {
    /// Override the world seed used for terrain generation.
    #[arg(long)]
    seed: Option<u64>,
    /// Simulated milliseconds per frame.
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,
    /// Zero-based level to start on.
    #[arg(long, default_value_t = 0)]
    level: usize,
    /// JSON simulation config; defaults to `LEMMINGS_CONFIG_PATH` or built-ins.
    #[arg(long)]
    config: Option<PathBuf>,
    /// JSON level catalog; defaults to `LEMMINGS_LEVELS_PATH` or built-ins.
    #[arg(long)]
    levels: Option<PathBuf>,
    /// Stop after this many frames.
    #[arg(long)]
    max_frames: Option<u64>,
    /// Run frames back to back instead of pacing them in real time.
    #[arg(long)]
    fast: bool,
}

#[derive(Debug)]
enum Control {
    Status,
    Quit,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(target: "lemmings::server", error = %err, "headless.failed");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => SimulationConfig::from_file(path)?,
        None => SimulationConfig::load_from_env(),
    };
    if let Some(seed) = cli.seed {
        config.world_seed = seed;
    }
    let catalog = match &cli.levels {
        Some(path) => LevelCatalog::from_file(path)?,
        None => LevelCatalog::load_from_env(),
    };

    let (intent_tx, intent_rx) = unbounded::<PlayerIntent>();
    let control_rx = spawn_stdin_reader(intent_tx);

    let sinks = FeedbackSinks::new(TracingSink, TracingSink);
    let mut sim = Simulation::starting_at(config, catalog, sinks, cli.level)?
        .with_input(ChannelInput::new(intent_rx));

    let frame = Duration::from_millis(cli.frame_ms.max(1));
    info!(
        target: "lemmings::server",
        level = cli.level,
        frame_ms = frame.as_millis() as u64,
        "headless.ready"
    );

    let mut frames = 0u64;
    loop {
        match control_rx.try_recv() {
            Ok(Control::Status) => log_status(&sim),
            Ok(Control::Quit) => {
                info!(target: "lemmings::server", "headless.quit_requested");
                break;
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => {}
        }

        sim.tick(frame);
        frames += 1;

        if sim.is_over() {
            break;
        }
        if cli.max_frames.is_some_and(|max| frames >= max) {
            info!(target: "lemmings::server", frames, "headless.frame_limit_reached");
            break;
        }
        if !cli.fast {
            thread::sleep(frame);
        }
    }

    log_status(&sim);
    Ok(())
}

fn spawn_stdin_reader(intents: Sender<PlayerIntent>) -> Receiver<Control> {
    let (control_tx, control_rx) = unbounded::<Control>();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    warn!(target: "lemmings::server", error = %err, "stdin.read_failed");
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            let payload = match parse_command_line(&line) {
                Ok(payload) => payload,
                Err(err) => {
                    warn!(target: "lemmings::server", input = %line, error = %err, "command.rejected");
                    continue;
                }
            };
            debug!(target: "lemmings::server", command = payload.name(), "command.received");
            let delivered = match PlayerIntent::try_from(payload) {
                Ok(intent) => intents.send(intent).is_ok(),
                Err(CommandPayload::Quit) => control_tx.send(Control::Quit).is_ok(),
                Err(_) => control_tx.send(Control::Status).is_ok(),
            };
            if !delivered {
                break;
            }
        }
    });
    control_rx
}

fn log_status(sim: &Simulation) {
    let metrics = sim.metrics();
    let remaining: Vec<String> = sim
        .ledger()
        .iter()
        .map(|(skill, count)| format!("{skill}={count}"))
        .collect();
    info!(
        target: "lemmings::server",
        phase = ?sim.phase(),
        outcome = ?sim.outcome(),
        level = metrics.level,
        ticks = metrics.ticks,
        active = metrics.active_agents,
        saved = metrics.saved,
        lost = metrics.lost,
        total_saved = metrics.total_saved,
        total_lost = metrics.total_lost,
        time_remaining_secs = metrics.time_remaining_secs,
        skills = %remaining.join(","),
        "session.status"
    );
}
