//! Server state shared by the handlers.

use std::sync::Arc;

use crate::domain::SessionGateway;

/// Shared application state
pub struct AppState {
    /// The running game session
    pub session: Arc<dyn SessionGateway>,
}
