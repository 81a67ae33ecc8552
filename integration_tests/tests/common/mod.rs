#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Once;
use std::time::Duration;

use lemmings_core::{FeedbackSinks, LevelCatalog, Simulation, SimulationConfig, CONFIG_PATH_ENV};

static INIT: Once = Once::new();

pub const FRAME: Duration = Duration::from_millis(100);

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn ensure_test_config() {
    INIT.call_once(|| {
        let config_path = fixture("test_simulation_config.json");

        debug_assert!(
            config_path.exists(),
            "missing test simulation config at {}",
            config_path.display()
        );

        std::env::set_var(CONFIG_PATH_ENV, &config_path);
    });
}

/// Hazard-free config from the fixture file.
pub fn test_config() -> SimulationConfig {
    SimulationConfig::from_file(&fixture("test_simulation_config.json"))
        .expect("test simulation config should parse")
}

pub fn single_level_catalog() -> LevelCatalog {
    LevelCatalog::from_file(&fixture("single_level.json"))
        .expect("single level fixture should parse")
}

pub fn simulation(sinks: FeedbackSinks) -> Simulation {
    Simulation::new(test_config(), LevelCatalog::builtin(), sinks).expect("simulation should build")
}

/// Tick until `done` holds or `limit` frames have run. Returns frames run.
pub fn run_until(
    sim: &mut Simulation,
    dt: Duration,
    limit: usize,
    mut done: impl FnMut(&Simulation) -> bool,
) -> usize {
    for frame in 0..limit {
        if done(sim) {
            return frame;
        }
        sim.tick(dt);
    }
    limit
}
