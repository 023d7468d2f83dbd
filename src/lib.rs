pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod pages;
pub mod routes;
pub mod store;
pub mod telemetry;

pub use config::AppConfig;
pub use error::AppError;
pub use store::{InMemoryPollStore, PgPollStore, PollStore};
