//! Caller-supplied request context.
//!
//! Every storage-bound operation carries the tenant, an optional auth token
//! and the base URL of the storage modules. The server builds one of these
//! per request from the Okapi headers.

/// Header carrying the tenant identifier.
pub const TENANT_HEADER: &str = "x-okapi-tenant";

/// Header carrying the auth token.
pub const TOKEN_HEADER: &str = "x-okapi-token";

/// Header carrying a per-request storage base URL override.
pub const URL_HEADER: &str = "x-okapi-url";

/// Per-request context forwarded to storage modules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContext {
    /// Tenant identifier.
    pub tenant: String,
    /// Auth token, forwarded verbatim when present.
    pub token: Option<String>,
    /// Base URL of the storage modules for this request.
    pub storage_base_url: String,
}

impl CallContext {
    /// Create a new context for the given tenant and storage location.
    pub fn new(tenant: impl Into<String>, storage_base_url: impl Into<String>) -> Self {
        Self {
            tenant: tenant.into(),
            token: None,
            storage_base_url: storage_base_url.into(),
        }
    }

    /// Attach an auth token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Base URL with any trailing slash removed.
    pub fn base_url(&self) -> &str {
        self.storage_base_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_strips_trailing_slash() {
        let ctx = CallContext::new("diku", "http://localhost:9130/");
        assert_eq!(ctx.base_url(), "http://localhost:9130");
    }

    #[test]
    fn test_with_token() {
        let ctx = CallContext::new("diku", "http://localhost:9130").with_token("abc");
        assert_eq!(ctx.token.as_deref(), Some("abc"));
    }
}
