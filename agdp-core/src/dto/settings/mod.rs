//! Settings DTOs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::settings::{LLM_API_KEY, LLM_BASE_URL, LLM_MODEL, STORAGE_PATH};

/// Partial settings update; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSettings {
    pub llm_model: Option<String>,
    pub storage_path: Option<String>,
    pub llm_api_key: Option<String>,
    pub llm_base_url: Option<String>,
}

impl UpdateSettings {
    /// The key/value pairs to upsert
    pub fn into_pairs(self) -> HashMap<String, String> {
        [
            (LLM_MODEL, self.llm_model),
            (STORAGE_PATH, self.storage_path),
            (LLM_API_KEY, self.llm_api_key),
            (LLM_BASE_URL, self.llm_base_url),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key.to_string(), v)))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_present_fields_are_written() {
        let update = UpdateSettings {
            llm_model: Some("gpt-4o".to_string()),
            ..Default::default()
        };
        let pairs = update.into_pairs();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs.get(LLM_MODEL).map(String::as_str), Some("gpt-4o"));
    }
}
