use domain::gateway::{whisper::WhisperClient, yandex_gpt::YandexGptClient};
use inspection_ai::traits::{completion::Provider as _, transcription::Provider as _};
use log::{error, info, warn};
use service::{config::Config, logging::Logger};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config as &Config);

    info!("Starting up...");

    let db = match service::init_database(&config).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    let completion_provider = match YandexGptClient::from_config(&config) {
        Ok(client) => {
            match client.verify_credentials().await {
                Ok(true) => info!("Yandex GPT credentials verified"),
                Ok(false) => warn!("Yandex GPT rejected the configured API key"),
                Err(e) => warn!("Unable to verify Yandex GPT credentials: {e}"),
            }
            Arc::new(client)
        }
        Err(e) => {
            error!("Failed to construct the Yandex GPT client: {e}");
            std::process::exit(1);
        }
    };

    // An unreachable endpoint is worth a warning at startup but is not
    // fatal: audio submissions fail individually until it comes back.
    let transcription_provider = match WhisperClient::from_config(&config) {
        Ok(client) => {
            match client.verify_credentials().await {
                Ok(true) => info!("Whisper endpoint reachable"),
                Ok(false) => warn!("Whisper endpoint rejected the configured API key"),
                Err(e) => warn!("Unable to reach the Whisper endpoint: {e}"),
            }
            Arc::new(client)
        }
        Err(e) => {
            error!("Failed to construct the Whisper client: {e}");
            std::process::exit(1);
        }
    };

    let service_state = service::AppState::new(config, &db);
    let app_state = web::AppState::new(service_state, completion_provider, transcription_provider);

    if let Err(e) = web::init_server(app_state).await {
        error!("Server terminated: {e}");
        std::process::exit(1);
    }
}
