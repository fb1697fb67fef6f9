use crate::logger::Severity;
use crate::translation::{ProviderMode, DEFAULT_GOOGLE_TRANSLATE_URL};
use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    // Environment ("development" and "test" use the mock provider)
    pub environment: String,

    // HTTP server
    pub port: u16,

    // Language catalog
    pub languages_file: String,

    // Logging
    pub log_level: String,

    // Google Translate
    pub google_translate_api_key: Option<String>,
    pub google_translate_api_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let port = match std::env::var("PORT") {
            Ok(value) => value
                .parse()
                .with_context(|| format!("PORT must be a valid port number, got '{}'", value))?,
            Err(_) => 8080,
        };

        Ok(Self {
            environment: std::env::var("APP_ENV").unwrap_or_else(|_| "production".to_string()),

            port,

            languages_file: std::env::var("LANGUAGES_FILE")
                .unwrap_or_else(|_| "languages.json".to_string()),

            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            google_translate_api_key: std::env::var("GOOGLE_TRANSLATE_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            google_translate_api_url: std::env::var("GOOGLE_TRANSLATE_API_URL")
                .unwrap_or_else(|_| DEFAULT_GOOGLE_TRANSLATE_URL.to_string()),
        })
    }

    pub fn provider_mode(&self) -> ProviderMode {
        ProviderMode::from_environment(&self.environment)
    }

    /// Configured log threshold; unrecognised values fall back to INFO.
    pub fn log_level(&self) -> Severity {
        self.log_level.parse().unwrap_or(Severity::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> Config {
        Config {
            environment: "development".to_string(),
            port: 8080,
            languages_file: "languages.json".to_string(),
            log_level: "debug".to_string(),
            google_translate_api_key: None,
            google_translate_api_url: DEFAULT_GOOGLE_TRANSLATE_URL.to_string(),
        }
    }

    #[test]
    fn test_provider_mode_from_environment() {
        let mut config = create_test_config();
        assert_eq!(config.provider_mode(), ProviderMode::Mock);

        config.environment = "production".to_string();
        assert_eq!(config.provider_mode(), ProviderMode::Remote);
    }

    #[test]
    fn test_log_level_parsing() {
        let mut config = create_test_config();
        assert_eq!(config.log_level(), Severity::Debug);

        config.log_level = "ERROR".to_string();
        assert_eq!(config.log_level(), Severity::Error);
    }

    #[test]
    fn test_log_level_invalid_defaults_to_info() {
        let mut config = create_test_config();
        config.log_level = "loud".to_string();
        assert_eq!(config.log_level(), Severity::Info);
    }
}
