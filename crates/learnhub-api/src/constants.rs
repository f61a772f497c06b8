//! API constants

/// Current API version segment
pub const API_VERSION: &str = "v1";

/// Versioned prefix every protected route lives under
pub const API_PREFIX: &str = "/api/v1";

/// Upper bound on request bodies; LearnHub only accepts JSON
pub const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;
