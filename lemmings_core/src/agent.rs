use std::{fmt, time::Duration};

use bevy::math::{Rect, Vec2};
use lemmings_runtime::SkillKind;
use serde::Deserialize;

use crate::{
    animation::AnimationClock,
    hazards::HazardSet,
    heightfield::HeightField,
    sinks::{SoundCue, SoundSink},
    skills::SkillSet,
};

const WALK_FRAMES: u8 = 4;
const WALK_PERIOD: Duration = Duration::from_millis(100);
/// Agents never turn; every walk step and climb probe goes toward +x.
const WALK_DIRECTION: f32 = 1.0;

/// Stable identifier handed out in spawn order. Used as a weak selection key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(pub u64);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What an agent is doing. Skills decide which states are reachable; the state
/// decides how the agent moves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AgentState {
    Walking,
    /// Frozen in place for the rest of the level.
    Blocking,
    Climbing {
        progress: f32,
    },
    /// Carves the column under its feet every tick. Never stops on its own.
    Digging,
    /// Raises the column under its feet every tick. Never stops on its own.
    Building,
    Dead,
    Exited,
}

impl AgentState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AgentState::Dead | AgentState::Exited)
    }

    /// Frozen agents skip every per-tick update.
    pub fn is_frozen(&self) -> bool {
        matches!(
            self,
            AgentState::Blocking | AgentState::Dead | AgentState::Exited
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentState::Walking => "walking",
            AgentState::Blocking => "blocking",
            AgentState::Climbing { .. } => "climbing",
            AgentState::Digging => "digging",
            AgentState::Building => "building",
            AgentState::Dead => "dead",
            AgentState::Exited => "exited",
        }
    }
}

/// Movement constants shared by every agent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AgentTuning {
    pub width: f32,
    pub height: f32,
    pub walk_speed: f32,
    pub fall_step: f32,
    pub climb_step: f32,
    pub max_climb: f32,
    /// Half extent of the square around the exit point that counts as arrival.
    pub exit_radius: f32,
}

impl Default for AgentTuning {
    fn default() -> Self {
        Self {
            width: 20.0,
            height: 20.0,
            walk_speed: 2.0,
            fall_step: 2.0,
            climb_step: 2.0,
            max_climb: 100.0,
            exit_radius: 20.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    pub id: AgentId,
    /// Top-left corner of the body.
    pub position: Vec2,
    pub size: Vec2,
    skills: SkillSet,
    state: AgentState,
    animation: AnimationClock,
}

impl Agent {
    pub fn new(id: AgentId, position: Vec2, tuning: &AgentTuning) -> Self {
        Self {
            id,
            position,
            size: Vec2::new(tuning.width, tuning.height),
            skills: SkillSet::empty(),
            state: AgentState::Walking,
            animation: AnimationClock::new(WALK_FRAMES, WALK_PERIOD),
        }
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    pub fn skills(&self) -> SkillSet {
        self.skills
    }

    pub fn has_skill(&self, kind: SkillKind) -> bool {
        self.skills.has(kind)
    }

    pub fn is_alive(&self) -> bool {
        !self.state.is_terminal()
    }

    pub fn frame(&self) -> u8 {
        self.animation.frame()
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_corners(self.position, self.position + self.size)
    }

    /// Grants are permanent; nothing ever clears a skill.
    pub fn grant(&mut self, kind: SkillKind) {
        self.skills.insert(SkillSet::of(kind));
    }

    pub fn start_blocking(&mut self) {
        if !self.state.is_terminal() {
            self.state = AgentState::Blocking;
        }
    }

    /// Advance this agent by one tick.
    ///
    /// Terrain changes made here are visible to agents updated later in the
    /// same tick.
    pub fn update(
        &mut self,
        terrain: &mut HeightField,
        hazards: &HazardSet,
        tuning: &AgentTuning,
        dt: Duration,
        sound: &mut dyn SoundSink,
    ) {
        if self.state.is_frozen() {
            return;
        }

        self.animation.advance(dt);

        if let Some(hazard) = hazards.first_hit(&self.bounds()) {
            tracing::debug!(
                target: "lemmings::agent",
                agent = %self.id,
                hazard = hazard.kind.as_str(),
                state = self.state.as_str(),
                "agent.hazard_contact"
            );
            self.die(sound);
            return;
        }

        if self.state == AgentState::Walking {
            self.position.x += tuning.walk_speed * WALK_DIRECTION;
        }

        if !matches!(
            self.state,
            AgentState::Climbing { .. } | AgentState::Digging
        ) {
            self.position.y += tuning.fall_step;
        }

        if let AgentState::Climbing { progress } = &mut self.state {
            *progress += tuning.climb_step;
            if *progress >= tuning.max_climb {
                self.state = AgentState::Walking;
            }
        }

        self.resolve_terrain(terrain, sound);
        if self.state.is_terminal() {
            return;
        }

        let offset = (self.position - terrain.exit).abs();
        if offset.x <= tuning.exit_radius && offset.y <= tuning.exit_radius {
            self.state = AgentState::Exited;
            sound.play(SoundCue::Exit);
        }
    }

    fn resolve_terrain(&mut self, terrain: &mut HeightField, sound: &mut dyn SoundSink) {
        let surface = terrain.height_at(self.position.x);
        if self.position.y + self.size.y > surface {
            self.position.y = surface - self.size.y;
            self.on_ground(terrain, sound);
        }

        let feet = self.position.y + self.size.y;
        match self.state {
            AgentState::Digging => terrain.dig(self.position.x, feet),
            AgentState::Building => terrain.build(self.position.x, feet),
            _ => {}
        }

        if self.position.y > terrain.height {
            self.die(sound);
        }
    }

    /// Skill triggers, checked whenever the body rests on the surface.
    /// Digging wins over building, and building over climbing.
    fn on_ground(&mut self, terrain: &HeightField, sound: &mut dyn SoundSink) {
        if self.has_skill(SkillKind::Digger) && self.state != AgentState::Digging {
            self.state = AgentState::Digging;
            sound.play(SoundCue::Dig);
        } else if self.has_skill(SkillKind::Builder)
            && !matches!(self.state, AgentState::Building | AgentState::Digging)
        {
            self.state = AgentState::Building;
            sound.play(SoundCue::Build);
        } else if self.has_skill(SkillKind::Climber) && self.state == AgentState::Walking {
            let ahead = terrain.height_at(self.position.x + WALK_DIRECTION * self.size.x);
            if ahead > self.position.y + self.size.y {
                self.state = AgentState::Climbing { progress: 0.0 };
            }
        }
    }

    fn die(&mut self, sound: &mut dyn SoundSink) {
        self.state = AgentState::Dead;
        sound.play(SoundCue::Death);
    }
}
