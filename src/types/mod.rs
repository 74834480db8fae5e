//! Shared types for list and message responses.

mod pagination;
mod response;

pub use pagination::{Paginated, PaginatedLeads, PaginationMeta, PaginationParams};
pub use response::MessageResponse;
