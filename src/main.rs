// src/main.rs
use std::sync::Arc;

use chrono::Utc;
use polls_backend::store::StoreError;
use polls_backend::{db, routes, telemetry, AppConfig, AppError, InMemoryPollStore, PgPollStore};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    telemetry::init(&config.log_level)?;

    let app = match &config.database.url {
        Some(url) => {
            let pool = db::create_pool(url, &config.database)
                .await
                .map_err(StoreError::from)?;
            info!("connected to postgres");
            routes::create_routes(Arc::new(PgPollStore::new(pool)))
        }
        None => {
            warn!("DATABASE_URL is not set, serving polls from an in-memory store");
            let store = InMemoryPollStore::default();
            let question_id = store.add_question("What's your favorite language?", Utc::now());
            store.add_choice(question_id, "Rust");
            store.add_choice(question_id, "Python");
            routes::create_routes(Arc::new(store))
        }
    };

    let addr = config.server.socket_addr()?;
    info!(%addr, "polls server listening");

    axum_server::bind(addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
