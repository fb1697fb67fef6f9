//! Translation providers.
//!
//! A [`TranslationProvider`] turns text into a target language. Two
//! implementations exist:
//!
//! - `google`: The Google Cloud Translation v2 REST API
//! - `mock`: Deterministic canned output, for development, tests, and as the
//!   fallback when the remote provider cannot be constructed
//!
//! Which one is used is decided once at startup by [`select_provider`].

mod google;
mod mock;

pub use google::{is_valid_language_tag, GoogleTranslateProvider, DEFAULT_GOOGLE_TRANSLATE_URL};
pub use mock::MockProvider;

use crate::config::Config;
use crate::logger::Logger;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by translation providers.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("failed to initialize translation provider: {0}")]
    Construction(String),

    #[error("invalid target language code: '{0}'")]
    InvalidLanguage(String),

    #[error("translation request failed: {0}")]
    Request(reqwest::Error),

    #[error("translation API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("failed to parse translation response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("translation response contained no translations")]
    EmptyResponse,
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        // Request URLs never reach logs or clients.
        ProviderError::Request(error.without_url())
    }
}

/// Translates text into a target language.
///
/// Implementations are shared by every in-flight request and must be safe to
/// call concurrently.
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Translate `text` into the language identified by `target_language`.
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, ProviderError>;

    /// Short provider name for logs.
    fn name(&self) -> &'static str;
}

/// Which provider the process should run with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderMode {
    /// Always use [`MockProvider`].
    Mock,
    /// Try the remote provider, degrading to [`MockProvider`] on failure.
    Remote,
}

impl ProviderMode {
    /// `development` and `test` environments run with the mock provider.
    pub fn from_environment(environment: &str) -> Self {
        match environment.trim().to_ascii_lowercase().as_str() {
            "development" | "test" => ProviderMode::Mock,
            _ => ProviderMode::Remote,
        }
    }
}

/// Choose the provider for the lifetime of the process.
///
/// In [`ProviderMode::Remote`], `construct_remote` is called once; if it fails
/// a single warning is logged and the mock provider is returned instead.
/// Construction failure is never fatal.
pub fn select_provider<F>(
    mode: ProviderMode,
    logger: &Logger,
    construct_remote: F,
) -> Arc<dyn TranslationProvider>
where
    F: FnOnce() -> Result<Arc<dyn TranslationProvider>, ProviderError>,
{
    match mode {
        ProviderMode::Mock => {
            logger.info("using mock translation provider", &[]);
            Arc::new(MockProvider::new())
        }
        ProviderMode::Remote => match construct_remote() {
            Ok(provider) => {
                logger.info(
                    "using remote translation provider",
                    &[("provider", provider.name().into())],
                );
                provider
            }
            Err(e) => {
                logger.warn(
                    "remote translation provider unavailable, falling back to mock",
                    &[("error", e.to_string().into())],
                );
                Arc::new(MockProvider::new())
            }
        },
    }
}

/// Build the provider described by `config`.
pub fn provider_from_config(config: &Config, logger: &Logger) -> Arc<dyn TranslationProvider> {
    select_provider(config.provider_mode(), logger, || {
        GoogleTranslateProvider::from_config(config)
            .map(|provider| Arc::new(provider) as Arc<dyn TranslationProvider>)
    })
}
