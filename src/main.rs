//! InovaLog - export & logistics portal backend

use anyhow::Result;
use inovalog::{api, config::AppConfig, publisher::EventPublisher, repository::Repositories, seed};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let repos = match &config.database_url {
        Some(url) => {
            let db = PgPoolOptions::new().max_connections(config.database_max_connections).connect(url).await?;
            sqlx::migrate!("./migrations").run(&db).await?;
            tracing::info!("using PostgreSQL storage");
            Repositories::postgres(db)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory storage");
            Repositories::in_memory()
        }
    };
    if config.seed_demo_data {
        seed::load_demo_data(&repos).await?;
    }

    let events = EventPublisher::connect(config.nats_url.as_deref()).await;
    let app = api::router(api::AppState::new(repos, events, &config));

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!(freight = %config.freight_amount, locale = ?config.default_locale, "🚀 InovaLog listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(&addr).await?, app).await?;
    Ok(())
}
