//! Input/output helpers.
//!
//! - series CSV ingest (`ingest`)
//! - response JSON and series CSV writers (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
