//! `fortune-roulette` - New Year's fortune wheel
//!
//! Draws artists from a catalog onto a wheel, spins it through timed
//! phases (`spinning`, `slowing`, `stopping`, `result`) and reveals the
//! artist that guides the year. Results can be recorded and summarized.
//!
//! The spin core lives in [`roulette`]: pure selection and easing math,
//! an epoch-guarded [`roulette::PhaseSequencer`] and pluggable timer
//! [`roulette::Scheduler`]s (tokio-backed or a manual virtual clock).

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod observability;
pub mod record;
pub mod roulette;
