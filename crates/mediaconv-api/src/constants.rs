//! API constants

/// API base path prefix
pub const API_PREFIX: &str = "/api";

/// Service name reported in logs
pub const SERVICE_NAME: &str = "mediaconv-api";

/// Room for multipart boundaries, part headers and the text fields on top of the file itself.
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;
