//! Uniform random choice of the intermediate language.

use crate::i18n::{LanguageCatalog, LanguageEntry};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// Code returned when asked to choose from an empty language list.
pub const DEFAULT_LANGUAGE_CODE: &str = "en";

/// Draws language codes uniformly at random.
///
/// The generator is owned by the selector rather than being process-global,
/// so tests can supply a fixed seed.
#[derive(Debug)]
pub struct LanguageSelector {
    rng: Mutex<StdRng>,
}

impl LanguageSelector {
    /// Selector seeded once from the wall clock.
    pub fn from_clock() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        Self::seeded(seed)
    }

    /// Deterministic selector.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }

    /// Pick a language code from the catalog.
    pub fn select(&self, catalog: &LanguageCatalog) -> String {
        self.pick(catalog.entries())
    }

    /// Pick a language code from `languages`, or [`DEFAULT_LANGUAGE_CODE`]
    /// when the slice is empty.
    pub fn pick(&self, languages: &[LanguageEntry]) -> String {
        if languages.is_empty() {
            return DEFAULT_LANGUAGE_CODE.to_string();
        }

        let index = self
            .rng
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .random_range(0..languages.len());
        languages[index].code.clone()
    }
}
