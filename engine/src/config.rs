use std::{fs, io, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::statblock::{StatblockParser, DEFAULT_ENVIRONMENT};
use crate::{AdMode, Dice};

const DEFAULT_TARGET_AC: i32 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] io::Error),
    #[error("invalid YAML settings: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid JSON settings: {0}")]
    Json(#[from] serde_json::Error),
}

/// Defaults for rolling and parsing. Every field may be omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct Settings {
    /// Fixed RNG seed; `None` seeds from the OS.
    pub seed: Option<u64>,
    pub roll_mode: AdMode,
    pub target_ac: i32,
    pub default_environment: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: None,
            roll_mode: AdMode::Normal,
            target_ac: DEFAULT_TARGET_AC,
            default_environment: DEFAULT_ENVIRONMENT.to_string(),
        }
    }
}

impl Settings {
    /// `.json` files are read as JSON, everything else as YAML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Ok(serde_json::from_str(&text)?)
        } else {
            Ok(serde_yaml::from_str(&text)?)
        }
    }

    pub fn dice(&self) -> Dice {
        match self.seed {
            Some(seed) => Dice::from_seed(seed),
            None => Dice::from_entropy(),
        }
    }

    pub fn parser(&self) -> StatblockParser {
        StatblockParser::with_environment(self.default_environment.clone())
    }
}
