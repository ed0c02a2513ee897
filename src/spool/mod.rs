//! Durable spool: the pending-record queue shared by every producer and the
//! single shipper, plus the marker-delimited snapshot format used to survive
//! process shutdown with undelivered data.

pub mod buffer;
pub mod file;
pub mod snapshot;

pub use buffer::SpoolBuffer;
pub use file::{SpoolFile, SpoolFileError};
pub use snapshot::{decode, encode, MARKER};
