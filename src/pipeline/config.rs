use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::normalize::Locale;

/// OSM `highway=*` classes the source extraction keeps by default.
pub const DEFAULT_HIGHWAY_CLASSES: [&str; 11] = [
    "motorway", "trunk", "primary", "secondary",
    "tertiary", "unclassified", "residential",
    "service", "pedestrian", "footway", "cycleway",
];

/// Settings for one pipeline session. Passed explicitly; nothing is process-global.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Street-name grammar, fixed for every run of the session.
    pub locale: Locale,
    /// Accepted highway classes; `None` accepts every class.
    pub highway_classes: Option<Vec<String>>,
    /// Accent-fold region labels before grouping.
    pub fold_region_names: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            locale: Locale::Fr,
            highway_classes: None,
            fold_region_names: false,
        }
    }
}

impl PipelineConfig {
    pub fn new(locale: Locale) -> Self {
        Self { locale, ..Self::default() }
    }

    /// Restrict features to the default OSM highway classes.
    pub fn with_default_highway_classes(mut self) -> Self {
        self.highway_classes = Some(DEFAULT_HIGHWAY_CLASSES.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Check a feature's highway class against the whitelist (case-insensitive).
    pub fn accepts_highway(&self, class: &str) -> bool {
        match &self.highway_classes {
            None => true,
            Some(classes) => classes.iter().any(|c| c.eq_ignore_ascii_case(class.trim())),
        }
    }

    /// Parse a JSON configuration. An unsupported locale is rejected here.
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Failed to parse pipeline configuration")
    }

    /// Read a JSON configuration file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read pipeline configuration: {}", path.display()))?;
        Self::from_json_str(&text)
            .with_context(|| format!("Invalid pipeline configuration: {}", path.display()))
    }
}
