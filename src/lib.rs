#![doc = "The `todo-api` library crate."]
#![doc = ""]
#![doc = "Authentication, owner-only task access, persistence adapters, and the actix-web"]
#![doc = "routing used by the `todo-api` binary and by the integration tests."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
pub mod tasks;

pub use crate::config::Config;
pub use crate::error::AppError;
pub use crate::state::AppState;
