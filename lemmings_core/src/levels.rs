use std::{
    env, fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use bevy::prelude::Resource;
use lemmings_runtime::SkillKind;
use serde::Deserialize;
use thiserror::Error;

pub const BUILTIN_LEVELS: &str = include_str!("data/levels.json");

/// Environment variable pointing at a replacement level file.
pub const LEVELS_PATH_ENV: &str = "LEMMINGS_LEVELS_PATH";

/// Per-skill supply granted when a level starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct SkillAllotment {
    pub digger: u32,
    pub builder: u32,
    pub climber: u32,
    pub blocker: u32,
}

impl SkillAllotment {
    pub fn uniform(count: u32) -> Self {
        Self {
            digger: count,
            builder: count,
            climber: count,
            blocker: count,
        }
    }

    /// Counts laid out in `SkillKind::index` order.
    pub fn as_table(&self) -> [u32; SkillKind::COUNT] {
        [self.digger, self.builder, self.climber, self.blocker]
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Level {
    pub required_survivors: u32,
    pub time_limit_secs: f32,
    #[serde(default)]
    pub skills: SkillAllotment,
}

impl Level {
    /// Limits beyond `Duration`'s range saturate; catalogs reject them.
    pub fn time_limit(&self) -> Duration {
        Duration::try_from_secs_f32(self.time_limit_secs).unwrap_or(Duration::MAX)
    }

    fn validate(&self, index: usize) -> Result<(), LevelConfigError> {
        if self.required_survivors == 0 {
            return Err(LevelConfigError::InvalidLevel {
                index,
                reason: "required_survivors must be at least 1",
            });
        }
        if !self.time_limit_secs.is_finite() || self.time_limit_secs <= 0.0 {
            return Err(LevelConfigError::InvalidLevel {
                index,
                reason: "time_limit_secs must be a positive number",
            });
        }
        if Duration::try_from_secs_f32(self.time_limit_secs).is_err() {
            return Err(LevelConfigError::InvalidLevel {
                index,
                reason: "time_limit_secs is too large",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
struct LevelFile {
    levels: Vec<Level>,
}

#[derive(Debug, Error)]
pub enum LevelConfigError {
    #[error("failed to parse level config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read level config from {path:?}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("level catalog is empty")]
    Empty,
    #[error("level {index} is invalid: {reason}")]
    InvalidLevel { index: usize, reason: &'static str },
    #[error("level index {index} is out of range for {count} levels")]
    LevelOutOfRange { index: usize, count: usize },
}

/// Ordered, immutable list of levels. Never empty.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct LevelCatalog {
    levels: Vec<Level>,
}

impl LevelCatalog {
    pub fn new(levels: Vec<Level>) -> Result<Self, LevelConfigError> {
        if levels.is_empty() {
            return Err(LevelConfigError::Empty);
        }
        for (index, level) in levels.iter().enumerate() {
            level.validate(index)?;
        }
        Ok(Self { levels })
    }

    pub fn builtin() -> Self {
        Self::from_json_str(BUILTIN_LEVELS).expect("builtin level config should parse")
    }

    pub fn from_json_str(json: &str) -> Result<Self, LevelConfigError> {
        let file: LevelFile = serde_json::from_str(json)?;
        Self::new(file.levels)
    }

    pub fn from_file(path: &Path) -> Result<Self, LevelConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| LevelConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Level file named by `LEMMINGS_LEVELS_PATH`, falling back to the
    /// built-in catalog when it is unset or unusable.
    pub fn load_from_env() -> Self {
        let Some(path) = env::var_os(LEVELS_PATH_ENV).map(PathBuf::from) else {
            return Self::builtin();
        };
        match Self::from_file(&path) {
            Ok(catalog) => catalog,
            Err(err) => {
                tracing::warn!(
                    target: "lemmings::levels",
                    path = %path.display(),
                    error = %err,
                    "levels.load_failed"
                );
                Self::builtin()
            }
        }
    }

    pub fn level(&self, index: usize) -> Result<&Level, LevelConfigError> {
        self.levels
            .get(index)
            .ok_or(LevelConfigError::LevelOutOfRange {
                index,
                count: self.levels.len(),
            })
    }

    pub fn get(&self, index: usize) -> Option<&Level> {
        self.levels.get(index)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Level> {
        self.levels.iter()
    }
}

impl Default for LevelCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
