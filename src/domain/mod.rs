//! Domain layer - Core business entities and logic
//!
//! Accounts and their one-time secrets, plus the shapes of the chatbot
//! configuration, dashboard and widget messages exchanged with the
//! external services.

pub mod chat;
pub mod chatbot;
pub mod dashboard;
pub mod password;
pub mod user;
pub mod verification;

pub use chat::{AgentReply, AgentRequest, ChatChannel, ChatReply, WidgetConfig};
pub use chatbot::{
    Appearance, BasicInfo, ChatbotConfig, EmbedSnippet, ScrapeJob, ScrapeState, WidgetPosition,
    WizardProgress, WizardStep,
};
pub use dashboard::{DailyCount, DashboardStats, Lead, LeadStatus};
pub use password::{hash_secret, verify_secret, Password};
pub use user::{is_valid_company_id, new_company_id, normalize_email, User, UserResponse};
pub use verification::{
    generate_otp_code, is_valid_otp_format, OtpCode, OtpRejection, PasswordResetToken,
    ResetTokenValue,
};
