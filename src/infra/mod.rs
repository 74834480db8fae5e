//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connections and repositories
//! - HTTP clients for the chatbot, scraper, agent and Google services
//! - Caching systems (Redis)
//! - Unit of Work for repository access

pub mod cache;
pub mod clients;
pub mod db;
pub mod repositories;
pub mod unit_of_work;

pub use cache::{Cache, CooldownStore, RateLimitWindow, RateLimiter};
pub use clients::{
    AgentApi, AgentClient, ChatbotApiClient, ChatbotBackend, GoogleIdentity,
    GoogleIdentityClient, GoogleVerifier, Scraper, ScraperClient,
};
pub use db::{Database, Migrator};
pub use repositories::{
    OtpRepository, OtpStore, ResetTokenRepository, ResetTokenStore, UserRepository, UserStore,
};
pub use unit_of_work::{Persistence, TransactionContext, TxFuture, UnitOfWork};
