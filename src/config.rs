use std::path::PathBuf;

use crate::data::loader::LoadOptions;

/// Environment variable overriding the dataset location.
pub const DATASET_PATH_ENV: &str = "EMOTION_DATASET_PATH";
/// Environment variable enabling strict loading.
pub const STRICT_ENV: &str = "EMOTION_STRICT";
/// Where the training split is expected when nothing overrides it.
pub const DEFAULT_DATASET_PATH: &str = "data/emotion-train.parquet";

// ---------------------------------------------------------------------------
// Engine configuration
// ---------------------------------------------------------------------------

/// Startup settings for the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Local file holding the labeled corpus.
    pub dataset_path: PathBuf,
    /// Fail on invalid rows instead of dropping them.
    pub strict: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from(DEFAULT_DATASET_PATH),
            strict: false,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `EMOTION_DATASET_PATH` and `EMOTION_STRICT`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(path) = lookup(DATASET_PATH_ENV).filter(|p| !p.trim().is_empty()) {
            config.dataset_path = PathBuf::from(path);
        }
        if let Some(flag) = lookup(STRICT_ENV) {
            config.strict = parse_flag(&flag);
        }
        config
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            strict: self.strict,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
