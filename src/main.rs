use anyhow::Result;
use relay_translator::config::Config;
use relay_translator::i18n::{LanguageCatalog, LanguageSelector};
use relay_translator::logger::Logger;
use relay_translator::relay::RelayOrchestrator;
use relay_translator::server::{self, AppState};
use relay_translator::translation;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("relay_translator=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;

    let logger = Logger::stdout(config.log_level());
    logger.info("application started", &[("environment", config.environment.as_str().into())]);

    let selector = LanguageSelector::from_clock();
    logger.debug("random source seeded", &[]);

    let catalog = LanguageCatalog::load(Path::new(&config.languages_file), &logger);

    let provider = translation::provider_from_config(&config, &logger);
    logger.info("translation provider ready", &[("provider", provider.name().into())]);

    let relay = RelayOrchestrator::new(Arc::new(catalog), Arc::new(selector), provider, logger.clone());
    info!("Relay ready: {:?}", relay);

    let state = AppState {
        relay: Arc::new(relay),
        logger: logger.clone(),
    };

    logger.info("server starting", &[("port", config.port.into())]);
    server::serve(config.port, state).await
}
