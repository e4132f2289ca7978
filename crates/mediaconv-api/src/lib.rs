//! Mediaconv HTTP service
//!
//! Library half of the `mediaconv-api` binary, exposed so integration tests can build the
//! router against temporary directories.

pub mod api_doc;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod setup;
pub mod state;
pub mod utils;
