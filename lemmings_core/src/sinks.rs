//! Outbound collaborator contracts.
//!
//! The simulation never plays audio or draws particles itself. It reports
//! cues to a [`SoundSink`] and particle bursts to an [`EffectSink`]; both are
//! fire-and-forget and never feed back into simulation state.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bevy::{math::Vec2, prelude::*};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    Dig,
    Build,
    Select,
    Exit,
    Death,
}

impl SoundCue {
    pub fn as_str(self) -> &'static str {
        match self {
            SoundCue::Dig => "dig",
            SoundCue::Build => "build",
            SoundCue::Select => "select",
            SoundCue::Exit => "exit",
            SoundCue::Death => "death",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectColor {
    /// Agent reached the exit.
    Gold,
    /// Agent died.
    Red,
}

/// One particle burst request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectBurst {
    pub position: Vec2,
    pub color: EffectColor,
    pub count: u32,
}

pub trait SoundSink: Send + Sync + 'static {
    fn play(&mut self, cue: SoundCue);
}

pub trait EffectSink: Send + Sync + 'static {
    fn emit(&mut self, position: Vec2, color: EffectColor, count: u32);
}

/// Both sinks, stored as a single resource so systems can borrow them together.
#[derive(Resource)]
pub struct FeedbackSinks {
    pub sound: Box<dyn SoundSink>,
    pub effects: Box<dyn EffectSink>,
}

impl FeedbackSinks {
    pub fn new(sound: impl SoundSink, effects: impl EffectSink) -> Self {
        Self {
            sound: Box::new(sound),
            effects: Box::new(effects),
        }
    }

    /// Sinks that drop everything.
    pub fn silent() -> Self {
        Self::new(NullSink, NullSink)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl SoundSink for NullSink {
    fn play(&mut self, _cue: SoundCue) {}
}

impl EffectSink for NullSink {
    fn emit(&mut self, _position: Vec2, _color: EffectColor, _count: u32) {}
}

/// Forwards cues and bursts to `tracing` at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl SoundSink for TracingSink {
    fn play(&mut self, cue: SoundCue) {
        tracing::debug!(target: "lemmings::feedback", cue = cue.as_str(), "sound.play");
    }
}

impl EffectSink for TracingSink {
    fn emit(&mut self, position: Vec2, color: EffectColor, count: u32) {
        tracing::debug!(
            target: "lemmings::feedback",
            x = position.x,
            y = position.y,
            color = ?color,
            count,
            "effect.emit"
        );
    }
}

/// Keeps every cue and burst in memory. Clones share the same log, so a test
/// can hand one clone to the simulation and inspect another.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    sounds: Arc<Mutex<Vec<SoundCue>>>,
    effects: Arc<Mutex<Vec<EffectBurst>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sounds(&self) -> Vec<SoundCue> {
        lock(&self.sounds).clone()
    }

    pub fn effects(&self) -> Vec<EffectBurst> {
        lock(&self.effects).clone()
    }

    pub fn count(&self, cue: SoundCue) -> usize {
        self.sounds().into_iter().filter(|c| *c == cue).count()
    }

    pub fn clear(&self) {
        lock(&self.sounds).clear();
        lock(&self.effects).clear();
    }

    /// A sink pair wired to this recorder.
    pub fn sinks(&self) -> FeedbackSinks {
        FeedbackSinks::new(self.clone(), self.clone())
    }
}

impl SoundSink for RecordingSink {
    fn play(&mut self, cue: SoundCue) {
        lock(&self.sounds).push(cue);
    }
}

impl EffectSink for RecordingSink {
    fn emit(&mut self, position: Vec2, color: EffectColor, count: u32) {
        lock(&self.effects).push(EffectBurst {
            position,
            color,
            count,
        });
    }
}

/// Lock a recorder log, recovering the guard if another holder panicked.
fn lock<T>(log: &Mutex<T>) -> MutexGuard<'_, T> {
    log.lock().unwrap_or_else(PoisonError::into_inner)
}
