//! Developer tooling: read-only world inspection for the CLI and logs.
//!
//! # Invariants
//! - Nothing in this crate mutates a `World`.

pub mod inspector;

pub use inspector::{EntityInfo, WorldInspector, WorldSummary};
