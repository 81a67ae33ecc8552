use std::time::Duration;

use bevy::{math::Vec2, prelude::*};
use lemmings_runtime::SkillKind;
use log::debug;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::{
    agent::{AgentId, AgentState},
    hashing::level_seed,
    hazards::HazardSet,
    heightfield::HeightField,
    levels::LevelCatalog,
    resources::{
        AgentRoster, FrameDelta, GameOutcome, Session, SimPhase, SimulationConfig, SimulationTick,
    },
    sinks::{EffectColor, FeedbackSinks, SoundCue},
    skills::{AssignError, SkillLedger},
};

/// Run condition gating every per-tick system.
pub fn simulation_playing(session: Res<Session>) -> bool {
    session.is_playing()
}

/// Fresh terrain for `level_index`, seeded from the world seed so replays match.
pub fn generate_level_terrain(config: &SimulationConfig, level_index: usize) -> HeightField {
    let mut rng = ChaCha8Rng::seed_from_u64(level_seed(config.world_seed, level_index));
    HeightField::generate(config.field_width, config.field_height, &mut rng)
}

pub fn advance_clock(
    delta: Res<FrameDelta>,
    mut tick: ResMut<SimulationTick>,
    mut session: ResMut<Session>,
) {
    tick.0 += 1;
    session.time_remaining = session.time_remaining.saturating_sub(delta.0);
    if session.time_remaining.is_zero() {
        session.finish(GameOutcome::TimedOut);
        tracing::info!(
            target: "lemmings::session",
            tick = tick.0,
            level = session.level_index,
            saved = session.saved,
            lost = session.lost,
            "game.timed_out"
        );
    }
}

pub fn spawn_agents(
    delta: Res<FrameDelta>,
    config: Res<SimulationConfig>,
    mut session: ResMut<Session>,
    mut roster: ResMut<AgentRoster>,
) {
    session.spawn_timer += delta.0;
    if session.spawn_timer < config.spawn_interval() {
        return;
    }
    session.spawn_timer = Duration::ZERO;
    let id = roster.spawn(config.spawn_position(), &config.agent);
    tracing::debug!(
        target: "lemmings::spawn",
        agent = %id,
        active = roster.len(),
        "agent.spawned"
    );
}

pub fn animate_hazards(delta: Res<FrameDelta>, mut hazards: ResMut<HazardSet>) {
    hazards.update(delta.0);
}

/// Agents update in spawn order against the shared terrain.
pub fn update_agents(
    delta: Res<FrameDelta>,
    config: Res<SimulationConfig>,
    hazards: Res<HazardSet>,
    mut terrain: ResMut<HeightField>,
    mut roster: ResMut<AgentRoster>,
    mut sinks: ResMut<FeedbackSinks>,
) {
    let terrain = terrain.as_mut();
    let sound = sinks.sound.as_mut();
    for agent in roster.iter_mut() {
        agent.update(terrain, &hazards, &config.agent, delta.0, sound);
    }
    debug!("updated {} agents", roster.len());
}

/// Tally, burst and remove every agent that reached a terminal state.
pub fn sweep_finished_agents(
    config: Res<SimulationConfig>,
    mut session: ResMut<Session>,
    mut roster: ResMut<AgentRoster>,
    mut sinks: ResMut<FeedbackSinks>,
) {
    let mut finished = 0usize;
    for agent in roster.iter() {
        let color = match agent.state() {
            AgentState::Exited => {
                session.saved += 1;
                session.total_saved += 1;
                EffectColor::Gold
            }
            AgentState::Dead => {
                session.lost += 1;
                session.total_lost += 1;
                EffectColor::Red
            }
            _ => continue,
        };
        finished += 1;
        sinks
            .effects
            .emit(agent.position, color, config.effect_particles);
    }
    if finished == 0 {
        return;
    }

    roster.retain(|agent| agent.is_alive());
    if let Some(selected) = session.selected {
        if roster.get(selected).is_none() {
            session.selected = None;
        }
    }
    debug!(
        "swept {} agents (saved {}, lost {})",
        finished, session.saved, session.lost
    );
}

/// Move to the next level once the survivor quota is met, or end the game
/// after the last one.
pub fn check_level_completion(
    config: Res<SimulationConfig>,
    catalog: Res<LevelCatalog>,
    mut session: ResMut<Session>,
    mut roster: ResMut<AgentRoster>,
    mut terrain: ResMut<HeightField>,
    mut ledger: ResMut<SkillLedger>,
) {
    let Some(level) = catalog.get(session.level_index) else {
        return;
    };
    if session.saved < level.required_survivors {
        return;
    }

    let next_index = session.level_index + 1;
    let Some(next) = catalog.get(next_index) else {
        session.finish(GameOutcome::Victory);
        tracing::info!(
            target: "lemmings::session",
            levels = catalog.len(),
            total_saved = session.total_saved,
            total_lost = session.total_lost,
            "game.victory"
        );
        return;
    };

    *terrain = generate_level_terrain(&config, next_index);
    roster.clear();
    ledger.reset(&next.skills);
    session.enter_level(next_index, next.time_limit());
    tracing::info!(
        target: "lemmings::session",
        level = next_index,
        required = next.required_survivors,
        time_limit_secs = next.time_limit_secs,
        "level.advanced"
    );
}

/// Select the first agent under `point`. Ignored unless playing.
pub fn select_agent_intent(
    In(point): In<Vec2>,
    mut session: ResMut<Session>,
    roster: Res<AgentRoster>,
    mut sinks: ResMut<FeedbackSinks>,
) -> Option<AgentId> {
    if !session.is_playing() {
        return None;
    }
    let selected = roster.agent_at(point).map(|agent| agent.id);
    session.selected = selected;
    if let Some(id) = selected {
        sinks.sound.play(SoundCue::Select);
        tracing::debug!(target: "lemmings::input", agent = %id, "agent.selected");
    }
    selected
}

pub fn assign_skill_intent(
    In(skill): In<SkillKind>,
    session: Res<Session>,
    mut roster: ResMut<AgentRoster>,
    mut ledger: ResMut<SkillLedger>,
    mut sinks: ResMut<FeedbackSinks>,
) -> Result<u32, AssignError> {
    if !session.is_playing() {
        return Err(AssignError::NotPlaying);
    }
    let agent = session.selected.and_then(|id| roster.get_mut(id));
    ledger.try_assign(skill, agent, sinks.sound.as_mut())
}

/// Flip between playing and paused. A finished game stays finished.
pub fn toggle_pause_intent(mut session: ResMut<Session>) -> SimPhase {
    session.phase = match session.phase {
        SimPhase::Playing => SimPhase::Paused,
        SimPhase::Paused => SimPhase::Playing,
        SimPhase::Over => SimPhase::Over,
    };
    tracing::info!(target: "lemmings::session", phase = ?session.phase, "session.phase_changed");
    session.phase
}
