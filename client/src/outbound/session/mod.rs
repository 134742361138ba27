//! Session provider backed by a `tokio::sync::watch` channel.
//!
//! The authentication flow itself is external. Whatever performs it calls
//! [`WatchSessionProvider::sign_in`] with the resulting credential, and every
//! subscriber observes the change.

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::info;

use crate::domain::Session;
use crate::domain::ports::SessionProvider;

#[derive(Debug)]
pub struct WatchSessionProvider {
    current: watch::Sender<Option<Session>>,
}

impl Default for WatchSessionProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl WatchSessionProvider {
    /// Start signed out.
    pub fn new() -> Self {
        let (current, _) = watch::channel(None);
        Self { current }
    }

    /// Start with `session` already active.
    pub fn with_session(session: Session) -> Self {
        let (current, _) = watch::channel(Some(session));
        Self { current }
    }

    /// Replace the active session.
    pub fn sign_in(&self, session: Session) {
        let user_id = session.user.as_ref().map(|user| user.id.clone());
        self.current.send_replace(Some(session));
        info!(user_id = user_id.as_deref().unwrap_or("unknown"), "session started");
    }

    /// Drop the active session, wiping its token.
    pub fn sign_out(&self) {
        if self.current.send_replace(None).is_some() {
            info!("session ended");
        }
    }
}

#[async_trait]
impl SessionProvider for WatchSessionProvider {
    fn current_session(&self) -> Option<Session> {
        self.current.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.current.subscribe()
    }

    async fn end_session(&self) {
        self.sign_out();
    }
}
