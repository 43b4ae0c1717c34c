//! Runtime settings
//!
//! Settings are persisted as string key/value pairs. They configure a future
//! language-model backed synthesizer; the template synthesizer ignores them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const LLM_MODEL: &str = "llm_model";
pub const STORAGE_PATH: &str = "storage_path";
pub const LLM_API_KEY: &str = "llm_api_key";
pub const LLM_BASE_URL: &str = "llm_base_url";

/// Recognized settings with their defaults applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub llm_model: String,
    pub storage_path: String,
    pub llm_api_key: Option<String>,
    pub llm_base_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            llm_model: "gpt-4".to_string(),
            storage_path: "./pipelines".to_string(),
            llm_api_key: None,
            llm_base_url: "https://api.openai.com/v1".to_string(),
        }
    }
}

impl Settings {
    /// Build settings from stored pairs. Unknown keys are ignored and missing
    /// keys take their defaults; an empty API key counts as unset.
    pub fn from_pairs(pairs: &HashMap<String, String>) -> Self {
        let defaults = Self::default();

        Self {
            llm_model: pairs.get(LLM_MODEL).cloned().unwrap_or(defaults.llm_model),
            storage_path: pairs
                .get(STORAGE_PATH)
                .cloned()
                .unwrap_or(defaults.storage_path),
            llm_api_key: pairs.get(LLM_API_KEY).filter(|k| !k.is_empty()).cloned(),
            llm_base_url: pairs
                .get(LLM_BASE_URL)
                .cloned()
                .unwrap_or(defaults.llm_base_url),
        }
    }

    /// Flatten into the stored key/value form
    pub fn to_pairs(&self) -> HashMap<String, String> {
        HashMap::from([
            (LLM_MODEL.to_string(), self.llm_model.clone()),
            (STORAGE_PATH.to_string(), self.storage_path.clone()),
            (
                LLM_API_KEY.to_string(),
                self.llm_api_key.clone().unwrap_or_default(),
            ),
            (LLM_BASE_URL.to_string(), self.llm_base_url.clone()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::from_pairs(&HashMap::new());
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.llm_model, "gpt-4");
        assert_eq!(settings.storage_path, "./pipelines");
        assert_eq!(settings.llm_base_url, "https://api.openai.com/v1");
        assert!(settings.llm_api_key.is_none());
    }

    #[test]
    fn test_overrides_and_unknown_keys() {
        let pairs = HashMap::from([
            (LLM_MODEL.to_string(), "local-model".to_string()),
            (LLM_API_KEY.to_string(), "secret".to_string()),
            ("theme".to_string(), "dark".to_string()),
        ]);
        let settings = Settings::from_pairs(&pairs);
        assert_eq!(settings.llm_model, "local-model");
        assert_eq!(settings.llm_api_key.as_deref(), Some("secret"));
        assert_eq!(settings.storage_path, "./pipelines");
    }

    #[test]
    fn test_pairs_round_trip() {
        let settings = Settings {
            llm_api_key: Some("k".to_string()),
            ..Default::default()
        };
        assert_eq!(Settings::from_pairs(&settings.to_pairs()), settings);
        assert_eq!(
            Settings::from_pairs(&Settings::default().to_pairs()).llm_api_key,
            None
        );
    }
}
