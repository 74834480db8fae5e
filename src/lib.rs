//! GenBotAI API - backend for a SaaS that lets companies build a website chatbot
//!
//! Companies sign up, walk through a setup wizard (basic info, website
//! scraping, widget appearance, embed code), then watch conversations and
//! leads on a dashboard. The embedded widget talks to the public widget
//! routes, which proxy messages to the agent service.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Core business entities and rules
//! - **services**: Use cases behind the HTTP handlers
//! - **infra**: Database, Redis and the upstream HTTP clients
//! - **jobs**: Email delivery queue
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared types (pagination, responses)
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//!
//! # Deliver queued emails
//! cargo run -- jobs work
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod jobs;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Password, User};
pub use errors::{AppError, AppResult};
pub use infra::Cache;
