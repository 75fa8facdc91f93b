// src/config.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables for the aggregate-examples rule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Matcher names whose evaluation mutates shared state
    /// (e.g. `validate_presence_of` leaving an empty comment on the
    /// subject). Examples using one of these are reported with the
    /// expectation-order warning and never auto-fixed.
    #[serde(default)]
    pub matchers_with_side_effects: Vec<String>,
}

/// On-disk configuration (`specfold.toml`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecfoldToml {
    #[serde(default)]
    pub rules: RuleConfig,
}

impl SpecfoldToml {
    /// Decodes configuration from a TOML string.
    ///
    /// # Errors
    /// Returns error if the TOML does not decode.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse specfold.toml")
    }

    /// Loads configuration from a file.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or decoded.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content)
    }
}
