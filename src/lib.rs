//! Studydesk: task lifecycle engine for a collaborative study tracker.
//!
//! This crate tracks study tasks through their status state machine and
//! keeps tasks, assignees and assignment records consistent across atomic
//! units of work.
//!
//! # Architecture
//!
//! Studydesk follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, in-memory)
//!
//! # Modules
//!
//! - [`task`]: Task state machine, assignments and lifecycle service
//! - [`config`]: Database configuration from the environment
//! - [`telemetry`]: Tracing subscriber setup

pub mod config;
pub mod task;
pub mod telemetry;
