//! HTTP request handlers.

pub mod account_handler;
pub mod auth_handler;
pub mod chatbot_handler;
pub mod dashboard_handler;
pub mod widget_handler;

pub use account_handler::account_routes;
pub use auth_handler::auth_routes;
pub use chatbot_handler::chatbot_routes;
pub use dashboard_handler::dashboard_routes;
pub use widget_handler::widget_routes;
