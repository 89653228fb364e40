//! Per-record access checks, run before any store operation.

use super::Session;
use crate::error::AuthError;
use async_trait::async_trait;
use axum::http::Method;
use uuid::Uuid;

/// CRUD operation derived from the HTTP method.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Read,
    Create,
    Update,
    Delete,
}

impl Operation {
    /// GET→read, POST→create, PUT→update, DELETE→delete. Anything else has
    /// no operation and the route answers 405.
    pub fn from_method(method: &Method) -> Option<Operation> {
        match *method {
            Method::GET => Some(Operation::Read),
            Method::POST => Some(Operation::Create),
            Method::PUT => Some(Operation::Update),
            Method::DELETE => Some(Operation::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Read => "read",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }

    pub fn is_write(&self) -> bool {
        !matches!(self, Operation::Read)
    }
}

/// What the check applies to: the whole collection or one record.
#[derive(Clone, Copy, Debug)]
pub enum RecordScope {
    Collection,
    Record(Uuid),
}

/// Access-control collaborator: may the caller perform `operation` on this
/// entity/record? `Ok(false)` becomes a 403 at the handler.
#[async_trait]
pub trait AccessControl: Send + Sync {
    async fn has_access(
        &self,
        session: &Session,
        entity: &str,
        scope: &RecordScope,
        operation: Operation,
    ) -> Result<bool, AuthError>;
}

/// Role-based policy: reads are open to any authenticated caller, writes
/// require one of the configured roles.
#[derive(Clone, Debug)]
pub struct RoleAccess {
    write_roles: Vec<String>,
}

impl RoleAccess {
    pub fn new(write_roles: Vec<String>) -> Self {
        RoleAccess { write_roles }
    }
}

impl Default for RoleAccess {
    fn default() -> Self {
        RoleAccess {
            write_roles: vec!["admin".to_string()],
        }
    }
}

#[async_trait]
impl AccessControl for RoleAccess {
    async fn has_access(
        &self,
        session: &Session,
        entity: &str,
        scope: &RecordScope,
        operation: Operation,
    ) -> Result<bool, AuthError> {
        if !operation.is_write() {
            return Ok(true);
        }
        let allowed = session
            .user
            .roles
            .iter()
            .any(|r| self.write_roles.contains(r));
        if !allowed {
            tracing::debug!(
                caller = %session.caller_id,
                tenant = %session.user.tenant_id,
                entity,
                operation = operation.as_str(),
                ?scope,
                "write denied: caller lacks role"
            );
        }
        Ok(allowed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SessionUser;

    fn session(roles: &[&str]) -> Session {
        Session {
            caller_id: "u-1".into(),
            user: SessionUser {
                tenant_id: "t-1".into(),
                roles: roles.iter().map(|s| s.to_string()).collect(),
            },
        }
    }

    #[test]
    fn maps_methods_to_operations() {
        assert_eq!(Operation::from_method(&Method::GET), Some(Operation::Read));
        assert_eq!(Operation::from_method(&Method::POST), Some(Operation::Create));
        assert_eq!(Operation::from_method(&Method::PUT), Some(Operation::Update));
        assert_eq!(Operation::from_method(&Method::DELETE), Some(Operation::Delete));
        assert_eq!(Operation::from_method(&Method::PATCH), None);
    }

    #[tokio::test]
    async fn reads_open_writes_gated() {
        let access = RoleAccess::default();
        let viewer = session(&["viewer"]);
        let admin = session(&["admin"]);
        let scope = RecordScope::Collection;
        assert!(access.has_access(&viewer, "car", &scope, Operation::Read).await.unwrap());
        assert!(!access.has_access(&viewer, "car", &scope, Operation::Update).await.unwrap());
        assert!(access.has_access(&admin, "car", &scope, Operation::Delete).await.unwrap());
    }
}
