//! Command-line surface of `genbot-api`.
//!
//! `serve` runs the HTTP API, `migrate` manages the account schema and
//! `jobs` drives the outgoing email queue.

pub mod args;

pub use args::{Cli, Commands};
