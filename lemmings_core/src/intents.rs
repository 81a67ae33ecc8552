use std::collections::VecDeque;

use crossbeam_channel::{Receiver, TryRecvError};
use lemmings_runtime::{CommandPayload, SkillKind};

/// Player requests the simulation understands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerIntent {
    /// Select the agent under a point in field coordinates.
    SelectAt { x: f32, y: f32 },
    AssignSkill(SkillKind),
    TogglePause,
}

impl PlayerIntent {
    pub fn name(&self) -> &'static str {
        match self {
            PlayerIntent::SelectAt { .. } => "select",
            PlayerIntent::AssignSkill(_) => "assign_skill",
            PlayerIntent::TogglePause => "toggle_pause",
        }
    }
}

/// Pull-based source of player intents, drained at the start of every tick.
pub trait InputSource: Send + Sync + 'static {
    fn next_intent(&mut self) -> Option<PlayerIntent>;
}

impl InputSource for VecDeque<PlayerIntent> {
    fn next_intent(&mut self) -> Option<PlayerIntent> {
        self.pop_front()
    }
}

/// Intents arriving from another thread, typically a stdin reader.
#[derive(Debug, Clone)]
pub struct ChannelInput {
    receiver: Receiver<PlayerIntent>,
}

impl ChannelInput {
    pub fn new(receiver: Receiver<PlayerIntent>) -> Self {
        Self { receiver }
    }
}

impl InputSource for ChannelInput {
    fn next_intent(&mut self) -> Option<PlayerIntent> {
        match self.receiver.try_recv() {
            Ok(intent) => Some(intent),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}

/// Control commands (`status`, `quit`) are not intents and come back as the error.
impl TryFrom<CommandPayload> for PlayerIntent {
    type Error = CommandPayload;

    fn try_from(payload: CommandPayload) -> Result<Self, Self::Error> {
        match payload {
            CommandPayload::Select { x, y } => Ok(PlayerIntent::SelectAt { x, y }),
            CommandPayload::AssignSkill { skill } => Ok(PlayerIntent::AssignSkill(skill)),
            CommandPayload::TogglePause => Ok(PlayerIntent::TogglePause),
            other @ (CommandPayload::Status | CommandPayload::Quit) => Err(other),
        }
    }
}
