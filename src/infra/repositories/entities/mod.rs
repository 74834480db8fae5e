//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod otp_code;
pub mod password_reset_token;
pub mod user;
