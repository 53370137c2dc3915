//! Task lifecycle management.
//!
//! This module owns the task status state machine, overdue evaluation and
//! the transactional assignment workflow. Users, groups and categories are
//! owned elsewhere and are only checked for existence through lookup ports.
//! The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
