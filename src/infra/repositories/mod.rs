//! Repository layer - Data access abstraction
//!
//! Repositories provide an abstraction over data persistence,
//! following the Repository pattern for clean separation of concerns.

pub(crate) mod entities;
mod otp_repository;
mod reset_token_repository;
mod user_repository;

pub use otp_repository::{OtpRepository, OtpStore};
pub use reset_token_repository::{ResetTokenRepository, ResetTokenStore};
pub use user_repository::{UserRepository, UserStore};
