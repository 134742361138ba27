//! Port for surfacing user-visible notices.

use tracing::warn;

use crate::domain::UserNotice;

#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: UserNotice);
}

/// Notifier that writes notices to the log, for headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: UserNotice) {
        warn!(title = %notice.title, message = %notice.message, "user notice");
    }
}
