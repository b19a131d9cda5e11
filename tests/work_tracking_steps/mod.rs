//! Step definitions for work tracking scenarios.

pub mod when;
pub mod world;
