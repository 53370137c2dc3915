//! In-memory adapters for task lifecycle tests and embedding.

mod directory;
mod store;

pub use directory::InMemoryDirectory;
pub use store::InMemoryTaskStore;
