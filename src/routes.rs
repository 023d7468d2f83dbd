// routes.rs
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::store::PollStore;

pub fn create_routes<S>(store: Arc<S>) -> Router
where
    S: PollStore + 'static,
{
    Router::new()
        .route("/polls/", get(handlers::index::<S>))
        .route("/polls/{question_id}/", get(handlers::detail::<S>))
        .route("/polls/{question_id}/results/", get(handlers::results::<S>))
        .route("/polls/{question_id}/vote/", post(handlers::vote::<S>))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(store)
}
