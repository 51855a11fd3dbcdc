use crate::config::ExtractorConfig;
use std::collections::HashMap;

// =============================================================================
// EXTRACTOR FACTORY PRESETS
// =============================================================================

/// Name of the preset that is always present.
pub const DEFAULT_PRESET: &str = "Default";

#[derive(Debug)]
pub struct PresetManager {
    presets: HashMap<String, ExtractorConfig>,
}

impl PresetManager {
    /// Load presets from baked-in JSON. This is fallible but non-fatal.
    /// Returns a manager holding only "Default" if parsing fails.
    pub fn new() -> Self {
        Self::from_json(include_str!("../presets.json"))
    }

    /// Parse a name -> config map. Entries that fail validation are dropped
    /// with a warning; a malformed document yields the default manager.
    pub fn from_json(json: &str) -> Self {
        let parsed = match serde_json::from_str::<HashMap<String, ExtractorConfig>>(json) {
            Ok(parsed) => parsed,
            Err(e) => {
                log::warn!("preset document rejected: {}", e);
                return Self::default();
            }
        };

        let mut presets = HashMap::with_capacity(parsed.len() + 1);
        for (name, cfg) in parsed {
            match cfg.validate() {
                Ok(()) => {
                    presets.insert(name, cfg);
                }
                Err(e) => log::warn!("preset '{}' skipped: {}", name, e),
            }
        }
        presets
            .entry(DEFAULT_PRESET.to_string())
            .or_insert_with(ExtractorConfig::default);
        Self { presets }
    }

    pub fn get(&self, name: &str) -> Option<ExtractorConfig> {
        self.presets.get(name).copied()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.presets.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for PresetManager {
    fn default() -> Self {
        let mut presets = HashMap::new();
        presets.insert(DEFAULT_PRESET.to_string(), ExtractorConfig::default());
        Self { presets }
    }
}
