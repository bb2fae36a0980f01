use axum::http::{header::CONTENT_TYPE, HeaderValue, Method};
use domain::workflow::InspectionLocks;
use inspection_ai::traits::{completion, transcription};
use log::*;
use sea_orm::DatabaseConnection;
use service::config::Config;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

mod controller;
mod error;
mod params;
mod response;
mod router;

pub use error::{Error, Result};

// Web-level state: the service-level state plus the collaborators the
// controllers hand to the domain workflow.
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    service_state: service::AppState,
    completion_provider: Arc<dyn completion::Provider>,
    transcription_provider: Arc<dyn transcription::Provider>,
    inspection_locks: Arc<InspectionLocks>,
}

impl AppState {
    pub fn new(
        service_state: service::AppState,
        completion_provider: Arc<dyn completion::Provider>,
        transcription_provider: Arc<dyn transcription::Provider>,
    ) -> Self {
        Self {
            service_state,
            completion_provider,
            transcription_provider,
            inspection_locks: Arc::new(InspectionLocks::new()),
        }
    }

    pub fn db_conn_ref(&self) -> &DatabaseConnection {
        self.service_state.db_conn_ref()
    }

    pub fn config(&self) -> &Config {
        &self.service_state.config
    }

    pub fn completion_provider(&self) -> &dyn completion::Provider {
        self.completion_provider.as_ref()
    }

    pub fn transcription_provider(&self) -> &dyn transcription::Provider {
        self.transcription_provider.as_ref()
    }

    pub fn inspection_locks(&self) -> &InspectionLocks {
        &self.inspection_locks
    }
}

pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let interface = app_state
        .config()
        .interface
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let port = app_state.config().port;
    let listen_address = format!("{interface}:{port}");

    let allowed_origins: Vec<HeaderValue> = app_state
        .config()
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(err) => {
                warn!("Ignoring unparsable allowed origin {origin:?}: {err}");
                None
            }
        })
        .collect();

    let cors_layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
        .allow_origin(allowed_origins);

    let router = router::define_routes(app_state).layer(cors_layer);

    info!("Server starting... listening for connections on http://{listen_address}");

    let listener = tokio::net::TcpListener::bind(listen_address).await?;
    axum::serve(listener, router).await
}
