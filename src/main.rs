use restyle::{logger, Config, EditClient, GeminiConfig};
use std::env;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_result = dotenv::dotenv();

    let logger_config = if env::var("RESTYLE_JSON_LOGS").map_or(false, |v| v == "true") {
        logger::LoggerConfig::production()
    } else {
        logger::LoggerConfig::development()
    };
    logger::init_with_config(logger_config)?;

    match dotenv_result {
        Ok(_) => log::info!("✅ .env file loaded successfully"),
        Err(_) => log::warn!("⚠️  No .env file found, using system environment variables"),
    }

    log::info!("🔍 Checking Gemini environment...");

    match env::var("GEMINI_API_KEY").or_else(|_| env::var("GOOGLE_API_KEY")) {
        Ok(key) => {
            log::info!("✅ Gemini API key found in environment");
            log::debug!("API key starts with: {}...", &key[..6.min(key.len())]);
        }
        Err(_) => {
            log::error!("❌ No GEMINI_API_KEY or GOOGLE_API_KEY set");
            log::error!("❌ Image edits will fail until a key is configured");
        }
    }

    if let Ok(model) = env::var("GEMINI_MODEL") {
        log::info!("GEMINI_MODEL: {}", model);
    } else {
        log::warn!("No GEMINI_MODEL set, using the default image model");
    }

    log::info!("🖼️  Supported image edit models:");
    for (id, name, provider) in EditClient::supported_models() {
        log::info!("  {} - {} ({})", id, name, provider);
    }

    let config = Config::from_env().with_gemini(GeminiConfig::from_env());

    log::info!("🔄 Creating Gemini edit client...");
    let editor = match EditClient::new(config.gemini.clone().unwrap_or_default()) {
        Ok(client) => {
            log::info!("✅ Gemini edit client initialized successfully");
            client
        }
        Err(e) => {
            log::error!("❌ Failed to initialize Gemini edit client: {}", e);
            return Err(e.into());
        }
    };

    let (host, port) = config.bind_addr();
    logger::log_startup_info("restyle", env!("CARGO_PKG_VERSION"), &host, port);

    restyle::server::run(config, Arc::new(editor)).await?;

    Ok(())
}
