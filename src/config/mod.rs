//! Application configuration module
//!
//! Environment-driven settings plus the constants shared by auth, rate
//! limiting and the external service clients.

mod constants;
mod settings;

pub use constants::*;
pub use settings::Config;
