//! Caller session resolution, request-scoped: no ambient state, the session
//! is extracted once per request and passed by parameter from there on.

use crate::error::{AppError, AuthError};
use crate::state::AppState;
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};

/// Tenant and role claims attached to the caller.
#[derive(Clone, Debug)]
pub struct SessionUser {
    pub tenant_id: String,
    pub roles: Vec<String>,
}

/// Resolved caller identity for one request.
#[derive(Clone, Debug)]
pub struct Session {
    pub caller_id: String,
    pub user: SessionUser,
}

/// Identity collaborator: turns request headers into a session, or fails
/// with `Unauthenticated`.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn session(&self, headers: &HeaderMap) -> Result<Session, AuthError>;
}

/// Extracts the session through the provider in [`AppState`]. Rejects the
/// request with 401 before the handler body runs when no session resolves.
#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = state.sessions.session(&parts.headers).await?;
        Ok(session)
    }
}

const USER_ID_HEADER: &str = "x-user-id";
const TENANT_ID_HEADER: &str = "x-tenant-id";
const ROLES_HEADER: &str = "x-roles";

/// Header-based session provider: trusts `X-User-Id`, `X-Tenant-Id` and a
/// comma-separated `X-Roles`, the contract a fronting identity proxy would
/// populate. Both id headers are mandatory.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeaderSessions;

#[async_trait]
impl SessionProvider for HeaderSessions {
    async fn session(&self, headers: &HeaderMap) -> Result<Session, AuthError> {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|s| !s.is_empty())
        };
        let caller_id = header(USER_ID_HEADER).ok_or(AuthError::Unauthenticated)?;
        let tenant_id = header(TENANT_ID_HEADER).ok_or(AuthError::Unauthenticated)?;
        let roles = header(ROLES_HEADER)
            .map(|s| {
                s.split(',')
                    .map(|r| r.trim().to_string())
                    .filter(|r| !r.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        Ok(Session {
            caller_id: caller_id.to_string(),
            user: SessionUser {
                tenant_id: tenant_id.to_string(),
                roles,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.insert(
                axum::http::HeaderName::from_bytes(k.as_bytes()).unwrap(),
                HeaderValue::from_str(v).unwrap(),
            );
        }
        map
    }

    #[tokio::test]
    async fn resolves_session_from_headers() {
        let h = headers(&[
            ("x-user-id", "u-1"),
            ("x-tenant-id", "t-1"),
            ("x-roles", "admin, viewer"),
        ]);
        let session = HeaderSessions.session(&h).await.unwrap();
        assert_eq!(session.caller_id, "u-1");
        assert_eq!(session.user.tenant_id, "t-1");
        assert_eq!(session.user.roles, ["admin", "viewer"]);
    }

    #[tokio::test]
    async fn missing_user_header_is_unauthenticated() {
        let h = headers(&[("x-tenant-id", "t-1")]);
        let err = HeaderSessions.session(&h).await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthenticated));
    }
}
