//! Shared application state: the store and the two auth collaborators.

use crate::auth::{AccessControl, SessionProvider};
use crate::store::Store;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub sessions: Arc<dyn SessionProvider>,
    pub access: Arc<dyn AccessControl>,
}
