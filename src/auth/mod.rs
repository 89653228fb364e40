//! Identity and access-control collaborators. Both are trait seams: the
//! shipped implementations stand in for an external identity service.

mod access;
mod session;

pub use access::{AccessControl, Operation, RecordScope, RoleAccess};
pub use session::{HeaderSessions, Session, SessionProvider, SessionUser};
