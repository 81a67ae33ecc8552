//! Core simulation crate for the headless lemmings prototype.
//!
//! Agents walk a destructible height field toward an exit while the player
//! spends a per-level skill budget on individual agents. The per-tick work is
//! a chain of Bevy systems built by [`build_headless_app`]; most callers drive
//! it through the [`Simulation`] facade instead.

mod agent;
mod animation;
mod hashing;
mod hazards;
mod heightfield;
mod intents;
mod levels;
pub mod metrics;
mod resources;
mod simulation;
mod sinks;
mod skills;
mod systems;

use bevy::{ecs::schedule::ExecutorKind, prelude::*};

pub use agent::{Agent, AgentId, AgentState, AgentTuning};
pub use hashing::{level_seed, FnvHasher};
pub use hazards::{overlaps_strictly, Hazard, HazardKind, HazardSet, HazardSpec};
pub use heightfield::{HeightField, EXIT_CORRIDOR, TERRAIN_STEP};
pub use intents::{ChannelInput, InputSource, PlayerIntent};
pub use lemmings_runtime::SkillKind;
pub use levels::{
    Level, LevelCatalog, LevelConfigError, SkillAllotment, BUILTIN_LEVELS, LEVELS_PATH_ENV,
};
pub use metrics::SimulationMetrics;
pub use resources::{
    AgentRoster, FrameDelta, GameOutcome, Session, SimPhase, SimulationConfig,
    SimulationConfigError, SimulationTick, CONFIG_PATH_ENV,
};
pub use simulation::{build_headless_simulation, IntentOutcome, Simulation, SimulationSetupError};
pub use sinks::{
    EffectBurst, EffectColor, EffectSink, FeedbackSinks, NullSink, RecordingSink, SoundCue,
    SoundSink, TracingSink,
};
pub use skills::{AssignError, SkillLedger, SkillSet};
pub use systems::generate_level_terrain;

/// Construct a Bevy [`App`] holding a fresh session at `level_index`.
///
/// Per frame the chained systems advance the clock, spawn, animate hazards,
/// update agents, sweep finished agents and check level completion, all
/// gated on the session being in play. Metrics are collected every frame.
pub fn build_headless_app(
    config: SimulationConfig,
    catalog: LevelCatalog,
    sinks: FeedbackSinks,
    level_index: usize,
) -> Result<App, LevelConfigError> {
    let level = catalog.level(level_index)?.clone();
    let terrain = generate_level_terrain(&config, level_index);
    let hazards = HazardSet::from_specs(&config.hazards);

    let mut app = App::new();
    app.insert_resource(terrain)
        .insert_resource(hazards)
        .insert_resource(SkillLedger::from_allotment(&level.skills))
        .insert_resource(Session::new(level_index, level.time_limit()))
        .insert_resource(AgentRoster::default())
        .insert_resource(FrameDelta::default())
        .insert_resource(SimulationTick::default())
        .insert_resource(SimulationMetrics::default())
        .insert_resource(sinks)
        .insert_resource(catalog)
        .insert_resource(config)
        .add_systems(
            Update,
            (
                (
                    systems::advance_clock,
                    systems::spawn_agents,
                    systems::animate_hazards,
                    systems::update_agents,
                    systems::sweep_finished_agents,
                    systems::check_level_completion,
                )
                    .chain()
                    .distributive_run_if(systems::simulation_playing),
                metrics::collect_metrics,
            )
                .chain(),
        );
    // Agent order and terrain mutation must stay deterministic.
    app.edit_schedule(Update, |schedule| {
        schedule.set_executor_kind(ExecutorKind::SingleThreaded);
    });

    tracing::info!(
        target: "lemmings::session",
        level = level_index,
        required = level.required_survivors,
        time_limit_secs = level.time_limit_secs,
        "simulation.started"
    );
    Ok(app)
}

/// Execute a single frame of `dt` on an app built by [`build_headless_app`].
pub fn run_frame(app: &mut App, dt: std::time::Duration) {
    app.world.insert_resource(FrameDelta(dt));
    app.update();
}
