//! Mediaconv Infrastructure Library
//!
//! Shared infrastructure components used by the HTTP service:
//! - Middleware (request ID)
//! - Telemetry initialization
//! - Error response body
//! - Retention sweeper for stored files

pub mod cleanup;
pub mod error;
pub mod middleware;
pub mod telemetry;

// Re-export commonly used types
pub use cleanup::CleanupService;
pub use error::ErrorResponse;
pub use middleware::{request_id_middleware, RequestId};
pub use telemetry::{init_telemetry, shutdown_telemetry};
