//! Resolution of the authenticated user for incoming requests.
//!
//! Token validation happens upstream; this module only reads the identity it leaves behind.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap, HeaderName},
};
use tracing::{debug, error};

use crate::domain::models::UserId;

use super::api_error::ApiError;

/// Maps request headers to an authenticated user.
pub trait Authenticator: Send + Sync {
    fn authenticate(&self, headers: &HeaderMap) -> Option<UserId>;
}

/// Trusts an identity header injected by the gateway in front of this service.
#[derive(Debug, Clone)]
pub struct HeaderAuthenticator {
    header: HeaderName,
}

impl HeaderAuthenticator {
    pub fn new(header: HeaderName) -> Self {
        Self { header }
    }

    pub fn header(&self) -> &HeaderName {
        &self.header
    }
}

impl Authenticator for HeaderAuthenticator {
    fn authenticate(&self, headers: &HeaderMap) -> Option<UserId> {
        let value = headers.get(&self.header)?.to_str().ok()?.trim();
        if value.is_empty() {
            return None;
        }
        Some(UserId::new(value))
    }
}

/// Extractor for the authenticated user. Rejects with 401 when there is none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser(pub UserId);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(authenticator) = parts.extensions.get::<Arc<dyn Authenticator>>() else {
            error!("No authenticator installed on the router");
            return Err(ApiError::InternalError(anyhow::anyhow!(
                "authentication is not configured"
            )));
        };

        match authenticator.authenticate(&parts.headers) {
            Some(user_id) => Ok(AuthUser(user_id)),
            None => {
                debug!(path = %parts.uri.path(), "Rejecting unauthenticated request");
                Err(ApiError::Unauthorized)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_header_authenticator() {
        let auth = HeaderAuthenticator::new(HeaderName::from_static("x-user-id"));
        let mut headers = HeaderMap::new();
        assert_eq!(auth.authenticate(&headers), None);

        headers.insert("x-user-id", HeaderValue::from_static("  "));
        assert_eq!(auth.authenticate(&headers), None);

        headers.insert("x-user-id", HeaderValue::from_static("u1"));
        assert_eq!(auth.authenticate(&headers), Some(UserId::new("u1")));
    }
}
