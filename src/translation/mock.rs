use crate::translation::{ProviderError, TranslationProvider};
use async_trait::async_trait;

/// Canned translations for well-known targets.
const CANNED: &[(&str, &str)] = &[
    ("en", "Hello world"),
    ("es", "Hola mundo"),
    ("fr", "Bonjour le monde"),
    ("de", "Hallo Welt"),
    ("ja", "こんにちは世界"),
];

/// Deterministic provider that never performs I/O.
///
/// Targets in the canned table always yield the same phrase regardless of
/// input; any other target yields `"Translated to {code}: {text}"`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockProvider;

impl MockProvider {
    pub fn new() -> Self {
        Self
    }

    /// The fixed output for `target_language`, if it has one.
    pub fn canned(target_language: &str) -> Option<&'static str> {
        CANNED
            .iter()
            .find(|(code, _)| *code == target_language)
            .map(|(_, text)| *text)
    }

    fn render(text: &str, target_language: &str) -> String {
        match Self::canned(target_language) {
            Some(canned) => canned.to_string(),
            None => format!("Translated to {}: {}", target_language, text),
        }
    }
}

#[async_trait]
impl TranslationProvider for MockProvider {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, ProviderError> {
        Ok(Self::render(text, target_language))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
