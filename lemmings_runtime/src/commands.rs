use serde::{Deserialize, Serialize};

use crate::SkillKind;

/// Supported command payloads accepted by headless front-ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum CommandPayload {
    /// Select the first agent whose bounds contain the point.
    Select { x: f32, y: f32 },
    /// Grant a skill to the currently selected agent.
    AssignSkill { skill: SkillKind },
    TogglePause,
    /// Log the current session summary.
    Status,
    Quit,
}

impl CommandPayload {
    pub fn name(&self) -> &'static str {
        match self {
            CommandPayload::Select { .. } => "select",
            CommandPayload::AssignSkill { .. } => "skill",
            CommandPayload::TogglePause => "pause",
            CommandPayload::Status => "status",
            CommandPayload::Quit => "quit",
        }
    }
}
