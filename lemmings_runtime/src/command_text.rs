use std::num::ParseFloatError;

use thiserror::Error;

use crate::{CommandPayload, SkillKind};

#[derive(Debug, Error)]
pub enum CommandParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),
    #[error("invalid float '{value}' for {context}: {source}")]
    InvalidFloat {
        value: String,
        context: &'static str,
        source: ParseFloatError,
    },
    #[error("unknown skill '{0}'")]
    UnknownSkill(String),
}

/// Parse one line of the text command surface.
///
/// A bare skill hotkey (`d`, `b`, `c`, `x`) is accepted as shorthand for
/// `skill <key>`.
pub fn parse_command_line(input: &str) -> Result<CommandPayload, CommandParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(CommandParseError::Empty);
    }

    let mut parts = trimmed.split_whitespace();
    let verb = parts
        .next()
        .map(|v| v.to_ascii_lowercase())
        .ok_or(CommandParseError::Empty)?;

    match verb.as_str() {
        "select" | "click" => {
            let x_str = parts
                .next()
                .ok_or(CommandParseError::MissingArgument("x"))?;
            let y_str = parts
                .next()
                .ok_or(CommandParseError::MissingArgument("y"))?;
            let x = parse_f32(x_str, "select x")?;
            let y = parse_f32(y_str, "select y")?;
            Ok(CommandPayload::Select { x, y })
        }
        "skill" | "assign" => {
            let token = parts
                .next()
                .ok_or(CommandParseError::MissingArgument("skill"))?;
            let skill = SkillKind::from_token(token)
                .ok_or_else(|| CommandParseError::UnknownSkill(token.to_string()))?;
            Ok(CommandPayload::AssignSkill { skill })
        }
        "pause" | "resume" | "escape" | "esc" => Ok(CommandPayload::TogglePause),
        "status" => Ok(CommandPayload::Status),
        "quit" | "exit" => Ok(CommandPayload::Quit),
        other => match SkillKind::from_token(other) {
            Some(skill) if other.len() == 1 => Ok(CommandPayload::AssignSkill { skill }),
            _ => Err(CommandParseError::UnknownCommand(other.to_string())),
        },
    }
}

fn parse_f32(value: &str, context: &'static str) -> Result<f32, CommandParseError> {
    value
        .parse::<f32>()
        .map_err(|source| CommandParseError::InvalidFloat {
            value: value.to_string(),
            context,
            source,
        })
}
