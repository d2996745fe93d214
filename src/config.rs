//! Compiler configuration.
//!
//! Defaults can be overridden from the environment, and a TOML file can
//! override those:
//!
//! ```toml
//! max_nesting_depth = 64
//! start_mode = "code"
//! pretty = true
//! ```

use std::env;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::rules::Mode;

/// Nesting limit for both delimiter stacks and expression recursion.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 256;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("max_nesting_depth must be at least 1")]
    ZeroDepth,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerConfig {
    /// Deepest allowed nesting before lexing or compiling gives up
    pub max_nesting_depth: usize,

    /// Mode documents are tokenized in
    pub start_mode: Mode,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            max_nesting_depth: env::var("QUILL_MAX_NESTING_DEPTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|depth| *depth > 0)
                .unwrap_or(DEFAULT_MAX_NESTING_DEPTH),
            start_mode: env::var("QUILL_START_MODE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(Mode::Markup),
            pretty: false,
        }
    }
}

impl CompilerConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: CompilerConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_nesting_depth == 0 {
            return Err(ConfigError::ZeroDepth);
        }
        Ok(())
    }
}
