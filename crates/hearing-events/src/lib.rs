//! Shared telemetry types and serialization for the hearing simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! It is a dependency for all other crates in the workspace.

pub mod event;
pub mod timestamp;

// Re-export timestamp types
pub use timestamp::SimTimestamp;

// Re-export event types
pub use event::{
    generate_event_id, DominantSourceRecord, RangeEvent, RangeEventKind,
};
