//! Task lifecycle management.
//!
//! Tasks carry a work state driven by an append-only activity ledger,
//! accumulate work time between `started` and `paused`/`completed`
//! activities, may depend on other tasks (completion is gated on those
//! dependencies), and may own ordered subtasks whose statuses roll up into
//! a derived completion flag. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
