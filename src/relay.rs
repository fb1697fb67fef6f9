//! The relay: original text → random intermediate language → Japanese.
//!
//! Each call to [`RelayOrchestrator::execute`] is one tracked operation. The
//! two provider calls run strictly in sequence because the second one
//! translates the output of the first. Failures are not retried; the caller
//! gets a [`RelayError`] naming the hop that failed.

use crate::i18n::{LanguageCatalog, LanguageSelector};
use crate::logger::{snapshot, Logger, Snapshot};
use crate::translation::{ProviderError, TranslationProvider};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Language every relay ends in.
pub const TARGET_LANGUAGE: &str = "ja";

/// Operation name used for tracking.
pub const OPERATION_NAME: &str = "translation_request";

/// Outcome of a successful relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayResult {
    pub original_text: String,
    pub intermediate_text: String,
    /// Code of the intermediate language
    pub intermediate_language: String,
    pub final_text: String,
}

/// The two translation hops of a relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hop {
    Intermediate,
    Final,
}

impl Hop {
    pub fn as_str(&self) -> &'static str {
        match self {
            Hop::Intermediate => "intermediate",
            Hop::Final => "final",
        }
    }
}

impl fmt::Display for Hop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A relay that failed on one of its hops.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("translation to intermediate language '{language}' failed: {source}")]
    Intermediate {
        language: String,
        #[source]
        source: ProviderError,
    },

    #[error("translation to target language '{language}' failed: {source}")]
    Final {
        language: String,
        #[source]
        source: ProviderError,
    },
}

impl RelayError {
    pub fn hop(&self) -> Hop {
        match self {
            RelayError::Intermediate { .. } => Hop::Intermediate,
            RelayError::Final { .. } => Hop::Final,
        }
    }

    pub fn provider_error(&self) -> &ProviderError {
        match self {
            RelayError::Intermediate { source, .. } | RelayError::Final { source, .. } => source,
        }
    }
}

/// Where a relay currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayStage {
    Idle,
    SelectingLanguage,
    TranslatingToIntermediate,
    TranslatingToTarget,
    Completed,
    Failed,
}

impl RelayStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelayStage::Idle => "idle",
            RelayStage::SelectingLanguage => "selecting_language",
            RelayStage::TranslatingToIntermediate => "translating_to_intermediate",
            RelayStage::TranslatingToTarget => "translating_to_target",
            RelayStage::Completed => "completed",
            RelayStage::Failed => "failed",
        }
    }
}

/// Runs relays against a shared catalog and provider.
///
/// Everything is behind `Arc`, so one orchestrator serves every request and
/// cloning it is cheap.
#[derive(Clone)]
pub struct RelayOrchestrator {
    catalog: Arc<LanguageCatalog>,
    selector: Arc<LanguageSelector>,
    provider: Arc<dyn TranslationProvider>,
    logger: Logger,
}

impl fmt::Debug for RelayOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayOrchestrator")
            .field("languages", &self.catalog.len())
            .field("provider", &self.provider.name())
            .finish_non_exhaustive()
    }
}

impl RelayOrchestrator {
    pub fn new(
        catalog: Arc<LanguageCatalog>,
        selector: Arc<LanguageSelector>,
        provider: Arc<dyn TranslationProvider>,
        logger: Logger,
    ) -> Self {
        Self {
            catalog,
            selector,
            provider,
            logger,
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Relay `text` through a random language into [`TARGET_LANGUAGE`].
    pub async fn execute(&self, text: &str) -> Result<RelayResult, RelayError> {
        self.execute_with_context(text, Snapshot::new()).await
    }

    /// Like [`execute`](Self::execute), adding `context` (client address,
    /// user agent, ...) to the tracked input.
    pub async fn execute_with_context(
        &self,
        text: &str,
        context: Snapshot,
    ) -> Result<RelayResult, RelayError> {
        self.enter(RelayStage::Idle);

        let mut input = context;
        input.insert("original_text".to_string(), text.into());
        let tracker = self.logger.start_operation(OPERATION_NAME, input);

        self.logger.info(
            "translation request received",
            &[
                ("original_text", text.into()),
                ("text_length", text.chars().count().into()),
            ],
        );

        self.enter(RelayStage::SelectingLanguage);
        let intermediate_language = self.selector.select(&self.catalog);
        self.logger.info(
            "intermediate language selected",
            &[("intermediate_language", intermediate_language.as_str().into())],
        );

        self.enter(RelayStage::TranslatingToIntermediate);
        let intermediate_text = match self.provider.translate(text, &intermediate_language).await {
            Ok(translated) => translated,
            Err(e) => {
                self.enter(RelayStage::Failed);
                self.logger
                    .error_operation(tracker, &e, "intermediate translation failed");
                return Err(RelayError::Intermediate {
                    language: intermediate_language,
                    source: e,
                });
            }
        };
        self.logger.info(
            "intermediate translation completed",
            &[
                ("intermediate_text", intermediate_text.as_str().into()),
                ("target_language", intermediate_language.as_str().into()),
            ],
        );

        self.enter(RelayStage::TranslatingToTarget);
        let final_text = match self
            .provider
            .translate(&intermediate_text, TARGET_LANGUAGE)
            .await
        {
            Ok(translated) => translated,
            Err(e) => {
                self.enter(RelayStage::Failed);
                self.logger
                    .error_operation(tracker, &e, "final translation failed");
                return Err(RelayError::Final {
                    language: TARGET_LANGUAGE.to_string(),
                    source: e,
                });
            }
        };
        self.logger
            .info("final translation completed", &[("final_text", final_text.as_str().into())]);

        let result = RelayResult {
            original_text: text.to_string(),
            intermediate_text,
            intermediate_language,
            final_text,
        };

        self.enter(RelayStage::Completed);
        self.logger.complete_operation(
            tracker,
            snapshot([
                ("original_text", result.original_text.as_str()),
                ("intermediate_language", result.intermediate_language.as_str()),
                ("final_text", result.final_text.as_str()),
            ]),
        );

        Ok(result)
    }

    fn enter(&self, stage: RelayStage) {
        self.logger
            .debug("relay stage", &[("stage", stage.as_str().into())]);
    }
}
