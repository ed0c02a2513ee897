//! Domain layer for pulse-forwarder.
//!
//! Contains the canonical type shared across all modules:
//! - `Record`: one opaque unit of telemetry awaiting delivery

pub mod record;

pub use record::Record;
