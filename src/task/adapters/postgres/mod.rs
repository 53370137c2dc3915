//! `PostgreSQL` adapters for task lifecycle persistence.

mod directory;
pub(crate) mod models;
mod schema;
mod store;

pub use directory::PostgresDirectory;
pub use store::{PostgresTaskStore, TaskPgPool};
