mod common;

use std::time::Duration;

use lemmings_core::{
    FeedbackSinks, GameOutcome, Level, LevelCatalog, SimPhase, Simulation, SimulationConfig,
    SkillAllotment,
};

const QUARTER: Duration = Duration::from_millis(250);

#[test]
fn session_ends_exactly_when_time_runs_out() {
    let config = SimulationConfig {
        spawn_interval_ms: 3_600_000,
        ..common::test_config()
    };
    let catalog = LevelCatalog::new(vec![Level {
        required_survivors: 5,
        time_limit_secs: 120.0,
        skills: SkillAllotment::uniform(3),
    }])
    .expect("catalog is valid");
    let mut sim = Simulation::new(config, catalog, FeedbackSinks::silent()).expect("builds");

    for _ in 0..479 {
        sim.tick(QUARTER);
    }
    assert_eq!(sim.phase(), SimPhase::Playing);
    assert_eq!(sim.time_remaining(), QUARTER);
    assert_eq!(sim.outcome(), None);

    sim.tick(QUARTER);
    assert_eq!(sim.phase(), SimPhase::Over);
    assert_eq!(sim.outcome(), Some(GameOutcome::TimedOut));
    assert_eq!(sim.time_remaining(), Duration::ZERO);
    assert_eq!(sim.ticks(), 480);
    assert!(sim.agents().is_empty());
    assert_eq!(sim.saved(), 0);

    // Over is final.
    sim.tick(QUARTER);
    assert_eq!(sim.ticks(), 480);
    assert_eq!(sim.toggle_pause(), SimPhase::Over);
}

#[test]
fn paused_time_does_not_count_down() {
    let mut sim = common::simulation(FeedbackSinks::silent());
    sim.tick(QUARTER);
    let remaining = sim.time_remaining();
    sim.toggle_pause();
    for _ in 0..1_000 {
        sim.tick(QUARTER);
    }
    assert_eq!(sim.time_remaining(), remaining);
    assert_eq!(sim.phase(), SimPhase::Paused);
}
