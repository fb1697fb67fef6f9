//! Relay translator: passes text through a randomly chosen intermediate
//! language before translating it into Japanese.

pub mod config;
pub mod i18n;
pub mod logger;
pub mod relay;
pub mod server;
pub mod translation;
