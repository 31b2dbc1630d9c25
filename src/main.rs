use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cache;
mod config;
mod error;
mod manager;
mod routes;
mod utils;
mod weather;

use config::Config;
use manager::WeatherManager;
use routes::{create_router, AppState};
use weather::{forecast::ForecastClient, history::HistoryClient, openweather::OpenWeatherClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weather_gateway=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    // One HTTP client shared by both upstream paths
    let http = Arc::new(OpenWeatherClient::new(&config)?);
    let forecast = Arc::new(ForecastClient::new(http.clone(), config.forecast_url()));
    let history = Arc::new(HistoryClient::new(
        http,
        config.geocode_url(),
        config.history_url(),
    ));

    let cache = cache::connect_store(&config).await?;

    let manager = Arc::new(WeatherManager::new(
        cache,
        forecast,
        history,
        config.cache_ttl(),
        config.cache_prefix.clone(),
    ));

    let state = AppState { manager };

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(
        "Server starting on http://{} (cache ttl {}s)",
        config.bind_addr,
        config.cache_expire_seconds
    );

    axum::serve(listener, app).await?;

    Ok(())
}
