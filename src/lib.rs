//! `regime-signals` library crate.
//!
//! The engine (calendar, alignment, statistics, correlations, triggers, event
//! study, scoring and the orchestrator tying them together) is pure and
//! single-threaded. The binary (`regime`) adds file ingest, FRED fetching,
//! configuration and terminal reporting around it.

pub mod align;
pub mod app;
pub mod backtest;
pub mod calendar;
pub mod cli;
pub mod config;
pub mod correlation;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod orchestrator;
pub mod report;
pub mod scoring;
pub mod triggers;
