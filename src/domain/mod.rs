//! Domain types used throughout the engine.
//!
//! This module defines:
//!
//! - raw inputs (`TimePoint`, `DatasetDescriptor`, `Frequency`)
//! - the common time axis vocabulary (`Granularity`, `AlignedSeries`)
//! - engine outputs (`CorrelationPair`, `TriggerStat`, `RegimeScore`, etc.)

pub mod types;

pub use types::*;
