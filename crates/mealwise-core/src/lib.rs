//! Core library for mealwise: the profile wizard, plan generation through
//! Gemini, plan export, the plan-aware chat assistant and the local progress
//! log.
//!
//! The binary in `mealwise-cli` owns all terminal I/O; everything in this
//! crate is usable headless and is exercised directly by tests.

pub mod chat;
pub mod export;
pub mod gateway;
pub mod gemini;
pub mod notify;
pub mod plan;
pub mod profile;
pub mod progress;
pub mod wizard;
