use bevy::prelude::*;

use crate::resources::{AgentRoster, Session, SimulationTick};

/// Snapshot of session counters, refreshed at the end of every frame.
#[derive(Resource, Default, Debug, Clone, PartialEq)]
pub struct SimulationMetrics {
    pub ticks: u64,
    pub level: usize,
    pub active_agents: usize,
    pub saved: u32,
    pub lost: u32,
    pub total_saved: u32,
    pub total_lost: u32,
    pub time_remaining_secs: f32,
}

pub fn collect_metrics(
    tick: Res<SimulationTick>,
    session: Res<Session>,
    roster: Res<AgentRoster>,
    mut metrics: ResMut<SimulationMetrics>,
) {
    metrics.ticks = tick.0;
    metrics.level = session.level_index;
    metrics.active_agents = roster.len();
    metrics.saved = session.saved;
    metrics.lost = session.lost;
    metrics.total_saved = session.total_saved;
    metrics.total_lost = session.total_lost;
    metrics.time_remaining_secs = session.time_remaining.as_secs_f32();
}
