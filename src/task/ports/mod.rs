//! Port contracts for task lifecycle management.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod lookup;
pub mod store;

pub use lookup::{
    CategoryLookup, GroupLookup, ReferenceLookupError, ReferenceLookupResult, UserLookup,
};
pub use store::{TaskStore, TaskStoreError, TaskStoreResult, TaskUnitOfWork};
