//! Port for the external authentication provider.

use async_trait::async_trait;
use tokio::sync::watch;

use crate::domain::Session;

/// Supplies the current session and notifies when it changes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Session in effect right now, if any.
    fn current_session(&self) -> Option<Session>;

    /// Receiver that observes sign-in and sign-out.
    fn subscribe(&self) -> watch::Receiver<Option<Session>>;

    /// End the current session with the provider.
    async fn end_session(&self);
}
