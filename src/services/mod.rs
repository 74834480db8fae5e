//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion.
//!
//! Account flows use the Unit of Work for repository access; chatbot and
//! widget flows go through the external service clients.

mod auth_service;
mod chat_service;
mod chatbot_service;
pub mod container;
mod dashboard_service;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use auth_service::{AuthService, Authenticator, Claims, TokenResponse};
pub use chat_service::{ChatService, WidgetChat};
pub use chatbot_service::{ChatbotManager, ChatbotService};
pub use dashboard_service::{DashboardService, MockDashboard};
