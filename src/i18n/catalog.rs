//! Language catalog: the set of languages eligible as relay intermediates.
//!
//! The catalog is read once at startup from a JSON document of the form
//! `{"languages": [{"code": "en", "name": "English", ...}]}` and shared
//! read-only afterwards. It is never empty: a missing, malformed or empty
//! source is replaced by [`LanguageCatalog::builtin`].

use crate::logger::{LogValue, Logger};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A single language the relay can pass through.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageEntry {
    /// ISO 639-1 language code (e.g., "en", "es")
    pub code: String,

    /// English name of the language (e.g., "Spanish")
    pub name: String,

    /// Native name of the language (e.g., "Español")
    pub native_name: String,

    /// Countries where the language is spoken
    #[serde(default)]
    pub countries: Vec<String>,

    /// Whether the language has official status
    #[serde(default)]
    pub is_official: bool,
}

impl LanguageEntry {
    fn builtin(code: &str, name: &str, native_name: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            native_name: native_name.to_string(),
            countries: Vec::new(),
            is_official: true,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    languages: Vec<LanguageEntry>,
}

/// Why a catalog source could not be used.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read language file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse language data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("language data contains no languages")]
    Empty,
}

/// Ordered, non-empty list of languages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageCatalog {
    languages: Vec<LanguageEntry>,
}

impl LanguageCatalog {
    /// The fallback catalog: English, Spanish, French and German.
    pub fn builtin() -> Self {
        Self {
            languages: vec![
                LanguageEntry::builtin("en", "English", "English"),
                LanguageEntry::builtin("es", "Spanish", "Español"),
                LanguageEntry::builtin("fr", "French", "Français"),
                LanguageEntry::builtin("de", "German", "Deutsch"),
            ],
        }
    }

    /// Build a catalog from entries, falling back to the built-in set when
    /// `entries` is empty.
    pub fn from_entries(entries: Vec<LanguageEntry>) -> Self {
        if entries.is_empty() {
            return Self::builtin();
        }
        Self { languages: entries }
    }

    /// Parse a catalog document.
    pub fn parse(json: &str) -> Result<Vec<LanguageEntry>, CatalogError> {
        let document: CatalogDocument = serde_json::from_str(json)?;
        Ok(document.languages)
    }

    /// Read and parse a catalog file without any fallback.
    pub fn read(path: &Path) -> Result<Vec<LanguageEntry>, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let languages = Self::parse(&content)?;
        if languages.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(languages)
    }

    /// Load the catalog from `path`.
    ///
    /// Never fails: any problem with the file is logged as a warning and the
    /// built-in catalog is returned instead.
    pub fn load(path: &Path, logger: &Logger) -> Self {
        let catalog = match Self::read(path) {
            Ok(languages) => Self::from_entries(languages),
            Err(e) => {
                logger.warn(
                    "language data unavailable, using built-in languages",
                    &[
                        ("path", path.display().to_string().into()),
                        ("error", e.to_string().into()),
                    ],
                );
                Self::builtin()
            }
        };

        logger.info(
            "language data loaded",
            &[("language_count", LogValue::from(catalog.len()))],
        );
        catalog
    }

    pub fn entries(&self) -> &[LanguageEntry] {
        &self.languages
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }

    /// Language codes in catalog order.
    pub fn codes(&self) -> Vec<&str> {
        self.languages.iter().map(|lang| lang.code.as_str()).collect()
    }

    pub fn get(&self, code: &str) -> Option<&LanguageEntry> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }
}
