//! Shared runtime contracts for the lemmings simulation.
//!
//! Holds the data types that front-ends and the Bevy-backed `lemmings_core`
//! crate both speak (skill identifiers, text commands) without pulling in the
//! simulation runtime itself.

mod command_text;
mod commands;
mod skills;

pub use command_text::{parse_command_line, CommandParseError};
pub use commands::CommandPayload;
pub use skills::{SkillKind, SKILL_KINDS};
