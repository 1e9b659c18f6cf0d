//! Extractor configuration.
//!
//! Loaded from an optional TOML file. Every field has a default, so an
//! absent or partial file is fine:
//!
//! ```toml
//! parallel = true
//!
//! [hooks]
//! state = ["useState", "useReducer"]
//! effect = ["useEffect", "useLayoutEffect"]
//! wrappers = ["memo", "forwardRef"]
//!
//! [classification]
//! naming_heuristic = true
//! attribute_markup = "false_child"
//! skip_files_with_errors = true
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{ExtractError, Result};

/// Default config file name looked up in a project root.
pub const CONFIG_FILE_NAME: &str = ".compgraph.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Recognize files on the rayon pool.
    pub parallel: bool,
    pub hooks: HookConfig,
    pub classification: ClassificationConfig,
}

/// Names of the calls that declare state, effects, and wrapped components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HookConfig {
    pub state: Vec<String>,
    pub effect: Vec<String>,
    pub wrappers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    /// A capitalized function name alone makes a component.
    pub naming_heuristic: bool,
    /// Relation recorded for a component element found inside an attribute
    /// value (`icon={<Star/>}`, render props).
    pub attribute_markup: AttributeMarkup,
    /// Treat a syntax tree containing error nodes as a parse failure.
    pub skip_files_with_errors: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeMarkup {
    Child,
    FalseChild,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            hooks: HookConfig::default(),
            classification: ClassificationConfig::default(),
        }
    }
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            state: vec!["useState".into(), "useReducer".into()],
            effect: vec![
                "useEffect".into(),
                "useLayoutEffect".into(),
                "useInsertionEffect".into(),
            ],
            wrappers: vec!["memo".into(), "forwardRef".into()],
        }
    }
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            naming_heuristic: true,
            attribute_markup: AttributeMarkup::FalseChild,
            skip_files_with_errors: true,
        }
    }
}

impl HookConfig {
    pub fn is_state_hook(&self, name: &str) -> bool {
        self.state.iter().any(|h| h == name)
    }

    pub fn is_effect_hook(&self, name: &str) -> bool {
        self.effect.iter().any(|h| h == name)
    }

    pub fn is_wrapper(&self, name: &str) -> bool {
        self.wrappers.iter().any(|h| h == name)
    }
}

impl ExtractorConfig {
    /// Parse a config from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| ExtractError::Config(e.to_string()))
    }

    /// Load the config at `path`, falling back to defaults when the file is
    /// missing or invalid.
    pub fn load(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(_) => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Self::default();
            }
        };

        match Self::from_toml(&text) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "invalid config, using defaults");
                Self::default()
            }
        }
    }
}
