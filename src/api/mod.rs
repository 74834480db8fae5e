//! HTTP surface: dashboard and wizard routes behind JWT auth, public auth
//! routes and the embeddable widget endpoints.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod validation;

pub use openapi::ApiDoc;
pub use routes::create_router;
pub use state::AppState;
