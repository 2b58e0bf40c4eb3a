mod configuration;
mod error;
mod routes;
mod state;

use std::sync::Arc;

use anyhow::Result;
use prism::artifacts::ArtifactStore;
use prism::dispatcher::Dispatcher;
use prism::providers::{base::Provider, factory};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::configuration::Settings;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let settings = Settings::new()?;
    let addr = settings.server.socket_addr();
    info!(provider = ?settings.provider.provider_type(), "configured provider");

    let provider: Arc<dyn Provider> = Arc::from(factory::get_provider(settings.provider.into_config())?);
    let mut dispatcher = Dispatcher::new(provider);
    if settings.artifacts.enabled {
        dispatcher = dispatcher.with_artifacts(ArtifactStore::new(&settings.artifacts.dir));
    }

    let state = AppState {
        dispatcher: Arc::new(dispatcher),
    };

    // Create router with CORS support
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::configure(state).layer(cors);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
