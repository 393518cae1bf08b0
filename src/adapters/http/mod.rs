//! HTTP adapters - shared REST plumbing.
//!
//! - `dto` - Error response bodies and `ApiError`
//! - `middleware` - Operator bearer-token gate
//! - `router` - Full application router
//! - `server` - Serving with a bounded shutdown drain

pub mod dto;
pub mod middleware;
pub mod router;
pub mod server;

pub use dto::{ApiError, ErrorResponse};
pub use middleware::{require_operator, OperatorGate};
pub use router::build_router;
pub use server::serve;
