use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod catalog;
mod config;
mod database;
mod error;
mod extract;
mod lookup;
mod recommend;
mod routes;
mod season;
mod session;
mod utils;

use catalog::Catalog;
use config::Config;
use database::Database;
use lookup::openweather::OpenWeatherClient;
use lookup::unsplash::UnsplashClient;
use lookup::{ReadThroughCache, SystemClock};
use routes::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "walk_randomizer_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    if config.unsplash_access_key.is_none() {
        tracing::warn!("UNSPLASH_ACCESS_KEY is not set; course photos are unavailable");
    }
    if config.openweather_api_key.is_none() {
        tracing::warn!("OPENWEATHERMAP_API_KEY is not set; weather autofill is unavailable");
    }

    let catalog = Arc::new(Catalog::builtin()?);
    tracing::info!("Loaded {} courses", catalog.len());

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let database = Arc::new(Database::new(pool));
    database.init_tables().await?;

    let clock = Arc::new(SystemClock);
    let image_cache = Arc::new(ReadThroughCache::new(
        "image",
        UnsplashClient::new(config.clone())?,
        config.image_cache_ttl(),
        clock.clone(),
    ));
    let weather_cache = Arc::new(ReadThroughCache::new(
        "weather",
        OpenWeatherClient::new(config.clone())?,
        config.weather_cache_ttl(),
        clock,
    ));

    let bind_addr = config.bind_addr.clone();
    let state = AppState {
        config: Arc::new(config),
        catalog,
        database,
        image_cache,
        weather_cache,
    };

    let app = create_router(state).layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server starting on http://{}", bind_addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
