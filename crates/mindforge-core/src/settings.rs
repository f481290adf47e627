use serde::{Deserialize, Serialize};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Remote generation settings, handed over by the host application when an
/// engine is built. Never read per call and never persisted by this crate.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AiSettings {
    pub provider: String,
    pub api_key: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl AiSettings {
    pub fn timeout_secs(&self) -> u64 {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
    }
}

pub fn ai_configured(settings: &AiSettings) -> bool {
    !settings.provider.is_empty()
        && !settings.model.is_empty()
        && (settings.provider == "ollama" || !settings.api_key.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(provider: &str, key: &str, model: &str) -> AiSettings {
        AiSettings {
            provider: provider.to_string(),
            api_key: key.to_string(),
            model: model.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn configured_requires_key_except_ollama() {
        assert!(ai_configured(&settings("openrouter", "sk", "gpt-4o-mini")));
        assert!(!ai_configured(&settings("openrouter", "", "gpt-4o-mini")));
        assert!(ai_configured(&settings("ollama", "", "llama3")));
        assert!(!ai_configured(&settings("", "sk", "gpt-4o-mini")));
        assert!(!ai_configured(&settings("openai", "sk", "")));
    }

    #[test]
    fn timeout_defaults_when_unset_or_zero() {
        let mut s = settings("openai", "sk", "m");
        assert_eq!(s.timeout_secs(), DEFAULT_TIMEOUT_SECS);
        s.request_timeout_secs = Some(0);
        assert_eq!(s.timeout_secs(), DEFAULT_TIMEOUT_SECS);
        s.request_timeout_secs = Some(5);
        assert_eq!(s.timeout_secs(), 5);
    }

    #[test]
    fn settings_json_is_camel_case() {
        let raw = r#"{"provider":"openrouter","apiKey":"k","model":"m","baseUrl":"http://localhost:8080/v1"}"#;
        let parsed: AiSettings = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.api_key, "k");
        assert_eq!(parsed.base_url.as_deref(), Some("http://localhost:8080/v1"));
        assert_eq!(parsed.request_timeout_secs, None);
    }
}
