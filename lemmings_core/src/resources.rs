use std::{
    env, fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use bevy::{math::Vec2, prelude::*};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    agent::{Agent, AgentId, AgentTuning},
    hazards::{HazardKind, HazardSpec},
};

/// Environment variable pointing at a JSON override for [`SimulationConfig`].
pub const CONFIG_PATH_ENV: &str = "LEMMINGS_CONFIG_PATH";

/// Global configuration for a headless session. Defaults describe the classic
/// 800x600 playfield.
#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub field_width: u32,
    pub field_height: f32,
    pub world_seed: u64,
    pub spawn_interval_ms: u64,
    pub spawn_point: (f32, f32),
    /// Particles per exit/death burst.
    pub effect_particles: u32,
    pub agent: AgentTuning,
    pub hazards: Vec<HazardSpec>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            field_width: 800,
            field_height: 600.0,
            world_seed: 0x1E44_1265,
            spawn_interval_ms: 2_000,
            spawn_point: (50.0, 0.0),
            effect_particles: 5,
            agent: AgentTuning::default(),
            hazards: vec![
                HazardSpec {
                    kind: HazardKind::Water,
                    x: 400.0,
                    y: 400.0,
                    width: 100.0,
                    height: 50.0,
                },
                HazardSpec {
                    kind: HazardKind::Trap,
                    x: 300.0,
                    y: 300.0,
                    width: 50.0,
                    height: 20.0,
                },
                HazardSpec {
                    kind: HazardKind::Trap,
                    x: 500.0,
                    y: 200.0,
                    width: 50.0,
                    height: 20.0,
                },
            ],
        }
    }
}

#[derive(Debug, Error)]
pub enum SimulationConfigError {
    #[error("failed to parse simulation config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read simulation config from {path:?}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid simulation config: {0}")]
    Invalid(&'static str),
}

impl SimulationConfig {
    pub fn from_json_str(json: &str) -> Result<Self, SimulationConfigError> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, SimulationConfigError> {
        let contents =
            fs::read_to_string(path).map_err(|source| SimulationConfigError::ReadFailed {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_json_str(&contents)
    }

    /// Config named by `LEMMINGS_CONFIG_PATH`, or the defaults when it is unset
    /// or unusable.
    pub fn load_from_env() -> Self {
        let Some(path) = env::var_os(CONFIG_PATH_ENV).map(PathBuf::from) else {
            return Self::default();
        };
        match Self::from_file(&path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(
                    target: "lemmings::config",
                    path = %path.display(),
                    error = %err,
                    "simulation_config.load_failed"
                );
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), SimulationConfigError> {
        if self.field_width == 0 {
            return Err(SimulationConfigError::Invalid("field_width must be positive"));
        }
        if !self.field_height.is_finite() || self.field_height <= 0.0 {
            return Err(SimulationConfigError::Invalid(
                "field_height must be a positive number",
            ));
        }
        if self.spawn_interval_ms == 0 {
            return Err(SimulationConfigError::Invalid(
                "spawn_interval_ms must be positive",
            ));
        }
        if self.agent.width <= 0.0 || self.agent.height <= 0.0 {
            return Err(SimulationConfigError::Invalid(
                "agent body must have a positive size",
            ));
        }
        Ok(())
    }

    pub fn spawn_interval(&self) -> Duration {
        Duration::from_millis(self.spawn_interval_ms)
    }

    pub fn spawn_position(&self) -> Vec2 {
        Vec2::new(self.spawn_point.0, self.spawn_point.1)
    }
}

/// Tracks total simulation ticks processed while playing.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationTick(pub u64);

/// Elapsed time handed to the current tick.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameDelta(pub Duration);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimPhase {
    Playing,
    Paused,
    Over,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameOutcome {
    /// The final level's survivor quota was met.
    Victory,
    TimedOut,
}

/// Mutable state of the running game: level progress, tallies and selection.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct Session {
    pub level_index: usize,
    pub time_remaining: Duration,
    pub saved: u32,
    pub lost: u32,
    pub total_saved: u32,
    pub total_lost: u32,
    pub phase: SimPhase,
    pub outcome: Option<GameOutcome>,
    pub spawn_timer: Duration,
    /// Weak reference: the agent may already be gone.
    pub selected: Option<AgentId>,
}

impl Session {
    pub fn new(level_index: usize, time_limit: Duration) -> Self {
        Self {
            level_index,
            time_remaining: time_limit,
            saved: 0,
            lost: 0,
            total_saved: 0,
            total_lost: 0,
            phase: SimPhase::Playing,
            outcome: None,
            spawn_timer: Duration::ZERO,
            selected: None,
        }
    }

    /// Reset per-level state for `level_index`. Cumulative totals survive.
    pub fn enter_level(&mut self, level_index: usize, time_limit: Duration) {
        self.level_index = level_index;
        self.time_remaining = time_limit;
        self.saved = 0;
        self.lost = 0;
        self.spawn_timer = Duration::ZERO;
        self.selected = None;
    }

    pub fn finish(&mut self, outcome: GameOutcome) {
        self.phase = SimPhase::Over;
        self.outcome = Some(outcome);
    }

    pub fn is_playing(&self) -> bool {
        self.phase == SimPhase::Playing
    }
}

/// Live agents in spawn order. Update order follows this order.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct AgentRoster {
    agents: Vec<Agent>,
    next_id: u64,
}

impl AgentRoster {
    pub fn spawn(&mut self, position: Vec2, tuning: &AgentTuning) -> AgentId {
        let id = AgentId(self.next_id);
        self.next_id += 1;
        self.agents.push(Agent::new(id, position, tuning));
        id
    }

    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.iter().find(|agent| agent.id == id)
    }

    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|agent| agent.id == id)
    }

    /// First agent, in spawn order, whose body contains `point` (edges inclusive).
    pub fn agent_at(&self, point: Vec2) -> Option<&Agent> {
        self.agents
            .iter()
            .find(|agent| agent.bounds().contains(point))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Agent> {
        self.agents.iter_mut()
    }

    pub fn retain(&mut self, keep: impl FnMut(&Agent) -> bool) {
        self.agents.retain(keep);
    }

    /// Drop every agent. Ids keep counting up so stale selections never alias.
    pub fn clear(&mut self) {
        self.agents.clear();
    }

    pub fn as_slice(&self) -> &[Agent] {
        &self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
