use std::fmt;

use serde::{Deserialize, Serialize};

/// Player-assignable behaviour modifiers.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillKind {
    Digger,
    Builder,
    Climber,
    Blocker,
}

/// Every skill in table order. `SkillKind::index` points into this array.
pub const SKILL_KINDS: [SkillKind; 4] = [
    SkillKind::Digger,
    SkillKind::Builder,
    SkillKind::Climber,
    SkillKind::Blocker,
];

impl SkillKind {
    pub const COUNT: usize = SKILL_KINDS.len();

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SkillKind::Digger => "digger",
            SkillKind::Builder => "builder",
            SkillKind::Climber => "climber",
            SkillKind::Blocker => "blocker",
        }
    }

    /// Single-key shortcut (`d`, `b`, `c`, `x`).
    pub fn hotkey(self) -> char {
        match self {
            SkillKind::Digger => 'd',
            SkillKind::Builder => 'b',
            SkillKind::Climber => 'c',
            SkillKind::Blocker => 'x',
        }
    }

    /// Resolve either the full skill name or its hotkey, case-insensitively.
    pub fn from_token(token: &str) -> Option<Self> {
        let lowered = token.to_ascii_lowercase();
        SKILL_KINDS.into_iter().find(|kind| {
            lowered == kind.as_str() || lowered.chars().eq(std::iter::once(kind.hotkey()))
        })
    }
}

impl fmt::Display for SkillKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_matches_table_order() {
        for (idx, kind) in SKILL_KINDS.iter().enumerate() {
            assert_eq!(kind.index(), idx);
        }
    }

    #[test]
    fn tokens_resolve_names_and_hotkeys() {
        assert_eq!(SkillKind::from_token("Digger"), Some(SkillKind::Digger));
        assert_eq!(SkillKind::from_token("x"), Some(SkillKind::Blocker));
        assert_eq!(SkillKind::from_token("C"), Some(SkillKind::Climber));
        assert_eq!(SkillKind::from_token("bb"), None);
        assert_eq!(SkillKind::from_token("floater"), None);
    }

    #[test]
    fn serde_uses_snake_case_names() {
        let json = serde_json::to_string(&SkillKind::Builder).unwrap();
        assert_eq!(json, "\"builder\"");
        let parsed: SkillKind = serde_json::from_str("\"climber\"").unwrap();
        assert_eq!(parsed, SkillKind::Climber);
    }
}
