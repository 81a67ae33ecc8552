use std::time::Duration;

use bevy::{math::Vec2, prelude::*};
use bevy_ecs::system::RunSystemOnce;
use lemmings_runtime::SkillKind;
use thiserror::Error;

use crate::{
    agent::{Agent, AgentId},
    build_headless_app,
    hazards::HazardSet,
    heightfield::HeightField,
    intents::{InputSource, PlayerIntent},
    levels::{LevelCatalog, LevelConfigError},
    metrics::SimulationMetrics,
    resources::{
        AgentRoster, GameOutcome, Session, SimPhase, SimulationConfig, SimulationConfigError,
        SimulationTick,
    },
    run_frame,
    sinks::FeedbackSinks,
    skills::{AssignError, SkillLedger},
    systems,
};

#[derive(Debug, Error)]
pub enum SimulationSetupError {
    #[error(transparent)]
    Config(#[from] SimulationConfigError),
    #[error(transparent)]
    Levels(#[from] LevelConfigError),
}

/// What applying a single intent did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IntentOutcome {
    Selected(Option<AgentId>),
    Assigned(Result<u32, AssignError>),
    PhaseChanged(SimPhase),
}

/// A running game: the Bevy app plus an optional intent source drained at the
/// start of every tick.
pub struct Simulation {
    app: App,
    input: Option<Box<dyn InputSource>>,
}

impl Simulation {
    pub fn new(
        config: SimulationConfig,
        catalog: LevelCatalog,
        sinks: FeedbackSinks,
    ) -> Result<Self, SimulationSetupError> {
        Self::starting_at(config, catalog, sinks, 0)
    }

    pub fn starting_at(
        config: SimulationConfig,
        catalog: LevelCatalog,
        sinks: FeedbackSinks,
        level_index: usize,
    ) -> Result<Self, SimulationSetupError> {
        config.validate()?;
        let app = build_headless_app(config, catalog, sinks, level_index)?;
        Ok(Self { app, input: None })
    }

    pub fn with_input(mut self, input: impl InputSource) -> Self {
        self.input = Some(Box::new(input));
        self
    }

    pub fn set_input(&mut self, input: Box<dyn InputSource>) {
        self.input = Some(input);
    }

    /// Drain pending intents, then run one frame of `dt`.
    pub fn tick(&mut self, dt: Duration) {
        if let Some(mut input) = self.input.take() {
            while let Some(intent) = input.next_intent() {
                self.apply_intent(intent);
            }
            self.input = Some(input);
        }
        run_frame(&mut self.app, dt);
    }

    pub fn apply_intent(&mut self, intent: PlayerIntent) -> IntentOutcome {
        let outcome = match intent {
            PlayerIntent::SelectAt { x, y } => {
                IntentOutcome::Selected(self.select_agent_at(Vec2::new(x, y)))
            }
            PlayerIntent::AssignSkill(skill) => IntentOutcome::Assigned(self.assign_skill(skill)),
            PlayerIntent::TogglePause => IntentOutcome::PhaseChanged(self.toggle_pause()),
        };
        tracing::debug!(
            target: "lemmings::input",
            intent = intent.name(),
            outcome = ?outcome,
            "intent.applied"
        );
        outcome
    }

    pub fn select_agent_at(&mut self, point: Vec2) -> Option<AgentId> {
        self.app
            .world
            .run_system_once_with(point, systems::select_agent_intent)
    }

    pub fn assign_skill(&mut self, skill: SkillKind) -> Result<u32, AssignError> {
        self.app
            .world
            .run_system_once_with(skill, systems::assign_skill_intent)
    }

    pub fn toggle_pause(&mut self) -> SimPhase {
        self.app.world.run_system_once(systems::toggle_pause_intent)
    }

    /// Place an agent directly, bypassing the spawn timer.
    pub fn spawn_agent_at(&mut self, position: Vec2) -> AgentId {
        let tuning = self.config().agent.clone();
        self.app
            .world
            .resource_mut::<AgentRoster>()
            .spawn(position, &tuning)
    }

    pub fn session(&self) -> &Session {
        self.app.world.resource::<Session>()
    }

    pub fn phase(&self) -> SimPhase {
        self.session().phase
    }

    pub fn is_over(&self) -> bool {
        self.phase() == SimPhase::Over
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.session().outcome
    }

    pub fn level_index(&self) -> usize {
        self.session().level_index
    }

    pub fn saved(&self) -> u32 {
        self.session().saved
    }

    pub fn lost(&self) -> u32 {
        self.session().lost
    }

    pub fn time_remaining(&self) -> Duration {
        self.session().time_remaining
    }

    pub fn selected(&self) -> Option<AgentId> {
        self.session().selected
    }

    pub fn agents(&self) -> &[Agent] {
        self.app.world.resource::<AgentRoster>().as_slice()
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.app.world.resource::<AgentRoster>().get(id)
    }

    pub fn terrain(&self) -> &HeightField {
        self.app.world.resource::<HeightField>()
    }

    pub fn hazards(&self) -> &HazardSet {
        self.app.world.resource::<HazardSet>()
    }

    pub fn ledger(&self) -> &SkillLedger {
        self.app.world.resource::<SkillLedger>()
    }

    pub fn config(&self) -> &SimulationConfig {
        self.app.world.resource::<SimulationConfig>()
    }

    pub fn catalog(&self) -> &LevelCatalog {
        self.app.world.resource::<LevelCatalog>()
    }

    pub fn metrics(&self) -> &SimulationMetrics {
        self.app.world.resource::<SimulationMetrics>()
    }

    /// Frames processed while playing.
    pub fn ticks(&self) -> u64 {
        self.app.world.resource::<SimulationTick>().0
    }
}

/// Build a simulation from the environment overrides, falling back to the
/// built-in config and levels.
pub fn build_headless_simulation(sinks: FeedbackSinks) -> Result<Simulation, SimulationSetupError> {
    Simulation::new(
        SimulationConfig::load_from_env(),
        LevelCatalog::load_from_env(),
        sinks,
    )
}
