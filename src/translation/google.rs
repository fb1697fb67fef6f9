use crate::config::Config;
use crate::translation::{ProviderError, TranslationProvider};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_GOOGLE_TRANSLATE_URL: &str =
    "https://translation.googleapis.com/language/translate/v2";

/// Header carrying the API key, keeping it out of request URLs.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Google Cloud Translation v2 request body
#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: [&'a str; 1],
    target: &'a str,
    format: &'static str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Debug, Deserialize)]
struct TranslateData {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
    #[serde(default)]
    detected_source_language: Option<String>,
}

/// Check that `code` looks like a BCP 47 language tag ("ja", "zh-TW", ...).
///
/// The primary subtag must be 2-8 ASCII letters; further subtags 1-8 ASCII
/// alphanumerics.
pub fn is_valid_language_tag(code: &str) -> bool {
    let mut subtags = code.split('-');

    let primary_ok = subtags
        .next()
        .map(|s| (2..=8).contains(&s.len()) && s.chars().all(|c| c.is_ascii_alphabetic()))
        .unwrap_or(false);

    primary_ok && subtags.all(|s| (1..=8).contains(&s.len()) && s.chars().all(|c| c.is_ascii_alphanumeric()))
}

/// Provider backed by the Google Cloud Translation REST API.
#[derive(Debug, Clone)]
pub struct GoogleTranslateProvider {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
}

impl GoogleTranslateProvider {
    /// Create a provider. Fails when no API key is available or the HTTP
    /// client cannot be built.
    pub fn new(api_key: Option<&str>, api_url: &str) -> Result<Self, ProviderError> {
        let api_key = api_key
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                ProviderError::Construction("GOOGLE_TRANSLATE_API_KEY not set".to_string())
            })?;

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ProviderError::Construction(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            api_url: api_url.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ProviderError> {
        Self::new(
            config.google_translate_api_key.as_deref(),
            &config.google_translate_api_url,
        )
    }
}

#[async_trait]
impl TranslationProvider for GoogleTranslateProvider {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, ProviderError> {
        if !is_valid_language_tag(target_language) {
            return Err(ProviderError::InvalidLanguage(target_language.to_string()));
        }

        let request = TranslateRequest {
            q: [text],
            target: target_language,
            format: "text",
        };

        debug!("Sending translation request to {} (target: {})", self.api_url, target_language);

        let response = self
            .client
            .post(&self.api_url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e.without_url()));
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let parsed: TranslateResponse = serde_json::from_str(&body)?;

        let translation = parsed
            .data
            .translations
            .into_iter()
            .next()
            .ok_or(ProviderError::EmptyResponse)?;

        if let Some(source) = &translation.detected_source_language {
            debug!("Detected source language: {}", source);
        }

        Ok(translation.translated_text)
    }

    fn name(&self) -> &'static str {
        "google"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{body_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn create_google_response(text: &str) -> serde_json::Value {
        serde_json::json!({
            "data": {
                "translations": [
                    {
                        "translatedText": text,
                        "detectedSourceLanguage": "en"
                    }
                ]
            }
        })
    }

    fn provider_for(server: &MockServer) -> GoogleTranslateProvider {
        GoogleTranslateProvider::new(
            Some("test-google-key"),
            &format!("{}/language/translate/v2", server.uri()),
        )
        .expect("Should construct")
    }

    // ==================== Construction Tests ====================

    #[test]
    fn test_new_without_key_fails() {
        let result = GoogleTranslateProvider::new(None, DEFAULT_GOOGLE_TRANSLATE_URL);
        assert!(matches!(result, Err(ProviderError::Construction(_))));
    }

    #[test]
    fn test_new_with_blank_key_fails() {
        let result = GoogleTranslateProvider::new(Some("   "), DEFAULT_GOOGLE_TRANSLATE_URL);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("GOOGLE_TRANSLATE_API_KEY"));
    }

    #[test]
    fn test_new_with_key_succeeds() {
        let provider = GoogleTranslateProvider::new(Some("key"), DEFAULT_GOOGLE_TRANSLATE_URL)
            .expect("Should construct");
        assert_eq!(provider.name(), "google");
    }

    // ==================== Language Tag Tests ====================

    #[test]
    fn test_valid_language_tags() {
        assert!(is_valid_language_tag("ja"));
        assert!(is_valid_language_tag("en"));
        assert!(is_valid_language_tag("zh-TW"));
        assert!(is_valid_language_tag("haw"));
        assert!(is_valid_language_tag("sr-Latn-RS"));
    }

    #[test]
    fn test_invalid_language_tags() {
        assert!(!is_valid_language_tag(""));
        assert!(!is_valid_language_tag("e"));
        assert!(!is_valid_language_tag("12"));
        assert!(!is_valid_language_tag("en-"));
        assert!(!is_valid_language_tag("en_US"));
        assert!(!is_valid_language_tag("toolonglanguage"));
    }

    // ==================== Request Tests ====================

    #[test]
    fn test_translate_request_serialization() {
        let request = TranslateRequest {
            q: ["Hello"],
            target: "fr",
            format: "text",
        };

        let json = serde_json::to_value(&request).expect("Should serialize");
        assert_eq!(
            json,
            serde_json::json!({"q": ["Hello"], "target": "fr", "format": "text"})
        );
    }

    // ==================== Integration Tests with Wiremock ====================

    #[tokio::test]
    async fn test_translate_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/language/translate/v2"))
            .and(header("x-goog-api-key", "test-google-key"))
            .and(body_json(
                serde_json::json!({"q": ["Hello"], "target": "es", "format": "text"}),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(create_google_response("Hola")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = provider_for(&mock_server);
        let result = provider.translate("Hello", "es").await.expect("Should succeed");

        assert_eq!(result, "Hola");
    }

    #[tokio::test]
    async fn test_translate_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/language/translate/v2"))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = provider_for(&mock_server);
        let result = provider.translate("Hello", "es").await;

        match result {
            Err(ProviderError::Api { status, body }) => {
                assert_eq!(status, 403);
                assert!(body.contains("API key not valid"));
            }
            other => panic!("Expected API error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_translate_server_error_is_not_retried() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/language/translate/v2"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = provider_for(&mock_server);
        let result = provider.translate("Hello", "de").await;

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_translate_empty_translations() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/language/translate/v2"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"data": {"translations": []}})),
            )
            .mount(&mock_server)
            .await;

        let provider = provider_for(&mock_server);
        let result = provider.translate("Hello", "fr").await;

        assert!(matches!(result, Err(ProviderError::EmptyResponse)));
    }

    #[tokio::test]
    async fn test_translate_malformed_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/language/translate/v2"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let provider = provider_for(&mock_server);
        let result = provider.translate("Hello", "fr").await;

        assert!(matches!(result, Err(ProviderError::Parse(_))));
    }

    #[tokio::test]
    async fn test_translate_invalid_language_makes_no_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(create_google_response("x")))
            .expect(0)
            .mount(&mock_server)
            .await;

        let provider = provider_for(&mock_server);
        let result = provider.translate("Hello", "not a code").await;

        assert!(matches!(result, Err(ProviderError::InvalidLanguage(code)) if code == "not a code"));
    }

    #[tokio::test]
    async fn test_api_key_stays_out_of_request_url() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/language/translate/v2"))
            .and(header("x-goog-api-key", "test-google-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(create_google_response("Hallo")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = provider_for(&mock_server);
        provider.translate("Hello", "de").await.expect("Should succeed");

        let requests = mock_server.received_requests().await.expect("Recording enabled");
        assert_eq!(requests.len(), 1);
        assert!(requests[0].url.query().is_none());
        assert!(!requests[0].url.as_str().contains("test-google-key"));
    }

    #[tokio::test]
    async fn test_transport_error_does_not_expose_api_key() {
        let provider =
            GoogleTranslateProvider::new(Some("SUPERSECRETKEY"), "http://127.0.0.1:1/translate")
                .expect("Should construct");

        let error = provider.translate("Hello", "ja").await.unwrap_err();

        assert!(matches!(error, ProviderError::Request(_)));
        assert!(!error.to_string().contains("SUPERSECRETKEY"));
        assert!(!format!("{:?}", error).contains("SUPERSECRETKEY"));
        assert!(!error.to_string().contains("127.0.0.1:1/translate"));
    }

    #[tokio::test]
    async fn test_translate_connection_refused() {
        let provider = GoogleTranslateProvider::new(Some("key"), "http://127.0.0.1:1/translate")
            .expect("Should construct");

        let result = provider.translate("Hello", "ja").await;

        assert!(matches!(result, Err(ProviderError::Request(_))));
    }
}
