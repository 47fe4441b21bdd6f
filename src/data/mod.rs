//! Data collaborators: FRED fetching and synthetic scenarios.
//!
//! Nothing in here is called by the engine itself.

pub mod fred;
pub mod sample;

pub use fred::FredClient;
pub use sample::{Scenario, ScenarioConfig, generate_scenario};
