//! Languages available to the relay.
//!
//! # Architecture
//!
//! - `catalog`: The read-only set of intermediate languages, loaded from
//!   `languages.json` with a built-in fallback
//! - `selector`: Uniform random choice of one catalog language
//!
//! # Example
//!
//! ```rust,ignore
//! use relay_translator::i18n::{LanguageCatalog, LanguageSelector};
//!
//! let catalog = LanguageCatalog::load(Path::new("languages.json"), &logger);
//! let selector = LanguageSelector::from_clock();
//! let code = selector.select(&catalog);
//! ```

mod catalog;
mod selector;

pub use catalog::{CatalogError, LanguageCatalog, LanguageEntry};
pub use selector::{LanguageSelector, DEFAULT_LANGUAGE_CODE};
