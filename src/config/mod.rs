//! Configuration module
//!
//! Loads and validates the YAML file that tunes spin timing, wheel
//! composition and the post-result presentation.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{ConfigLimits, ConfigLoader, LoadResult, LoadWarning};
pub use schema::*;
pub use validation::{ValidationResult, Validator};
