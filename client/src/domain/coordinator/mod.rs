//! Optimistic mutation coordinator.
//!
//! The coordinator is the only writer of screen state and of the query
//! cache. Each operation checks the session, applies any optimistic change,
//! calls the gateway, and then reconciles the cache or rolls the screen back.
//! Failures reach the user as a localised [`UserNotice`] and reach the caller
//! as a domain [`Error`].

mod companies;
mod interactions;
mod queries;
mod status;
mod status_ledger;

use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, warn};

use self::status_ledger::StatusLedger;
use crate::domain::ports::{
    CrmGateway, GatewayError, Navigator, NoOpNavigator, Notifier, QueryCache, QueryCacheError,
    QueryData, QueryKey, SessionProvider, TracingNotifier,
};
use crate::domain::{
    Company, CompanyId, CompanyStatus, CompanyStatusAck, Error, NoticeKind, NoticeLocale,
    UserNotice,
};

/// Parameter object bundling the data ports the coordinator drives.
#[derive(Clone)]
pub struct CoordinatorPorts {
    pub gateway: Arc<dyn CrmGateway>,
    pub cache: Arc<dyn QueryCache>,
    pub sessions: Arc<dyn SessionProvider>,
}

/// Ports implemented by the presentation layer.
#[derive(Clone)]
pub struct PresentationPorts {
    pub navigator: Arc<dyn Navigator>,
    pub notifier: Arc<dyn Notifier>,
}

impl Default for PresentationPorts {
    fn default() -> Self {
        Self {
            navigator: Arc::new(NoOpNavigator),
            notifier: Arc::new(TracingNotifier),
        }
    }
}

/// Result of a status mutation that was attempted remotely.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    /// The server acknowledged the change and the cache was updated.
    Reconciled(CompanyStatusAck),
    /// The server call failed; the screen was restored and the cache left
    /// untouched.
    RolledBack {
        restored: CompanyStatus,
        error: Error,
    },
}

impl MutationOutcome {
    pub fn is_reconciled(&self) -> bool {
        matches!(self, Self::Reconciled(_))
    }
}

/// Coordinates optimistic screen updates with remote mutations.
///
/// # Examples
/// ```no_run
/// use std::sync::Arc;
///
/// use crm_client::domain::ports::FixtureCrmGateway;
/// use crm_client::domain::{CoordinatorPorts, MutationCoordinator, NoticeLocale};
/// use crm_client::outbound::cache::InMemoryQueryCache;
/// use crm_client::outbound::session::WatchSessionProvider;
///
/// let coordinator = MutationCoordinator::new(CoordinatorPorts {
///     gateway: Arc::new(FixtureCrmGateway),
///     cache: Arc::new(InMemoryQueryCache::new()),
///     sessions: Arc::new(WatchSessionProvider::new()),
/// })
/// .with_locale(NoticeLocale::PtBr);
/// let _ = coordinator.locale();
/// ```
#[derive(Clone)]
pub struct MutationCoordinator {
    ports: CoordinatorPorts,
    presentation: PresentationPorts,
    locale: NoticeLocale,
    ledger: StatusLedger,
    epoch: SessionEpoch,
}

/// Counts sign-outs so results fetched for a previous user are dropped.
///
/// Cache writes hold the read side while they check and write; sign-out
/// holds the write side while it bumps the counter and clears the cache.
#[derive(Debug, Clone, Default)]
struct SessionEpoch(Arc<RwLock<u64>>);

impl SessionEpoch {
    fn current(&self) -> u64 {
        *self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn run_if_current(&self, epoch: u64, run: impl FnOnce() -> bool) -> bool {
        let current = self.0.read().unwrap_or_else(PoisonError::into_inner);
        *current == epoch && run()
    }

    fn advance(&self, clear: impl FnOnce()) {
        let mut current = self.0.write().unwrap_or_else(PoisonError::into_inner);
        *current += 1;
        clear();
    }
}

impl MutationCoordinator {
    /// Create a coordinator that navigates nowhere and logs notices.
    pub fn new(ports: CoordinatorPorts) -> Self {
        Self::with_presentation(ports, PresentationPorts::default())
    }

    pub fn with_presentation(ports: CoordinatorPorts, presentation: PresentationPorts) -> Self {
        Self {
            ports,
            presentation,
            locale: NoticeLocale::default(),
            ledger: StatusLedger::default(),
            epoch: SessionEpoch::default(),
        }
    }

    #[must_use]
    pub fn with_locale(mut self, locale: NoticeLocale) -> Self {
        self.locale = locale;
        self
    }

    pub fn locale(&self) -> NoticeLocale {
        self.locale
    }

    pub fn cache(&self) -> &Arc<dyn QueryCache> {
        &self.ports.cache
    }

    fn notify(&self, kind: NoticeKind) {
        self.presentation
            .notifier
            .notify(UserNotice::localized(kind, self.locale));
    }

    /// Fail fast when nobody is signed in. Returns the epoch later cache
    /// writes of this operation must still match.
    fn require_session(&self, operation: &'static str) -> Result<u64, Error> {
        let epoch = self.epoch.current();
        if self.ports.sessions.current_session().is_some() {
            return Ok(epoch);
        }
        warn!(operation, "rejected operation without an active session");
        self.notify(NoticeKind::SignInRequired);
        Err(Error::unauthorized(format!("{operation} requires a signed-in user")))
    }

    /// Reject input before any network call.
    fn reject_input(&self, kind: NoticeKind, message: impl Into<String>) -> Error {
        self.notify(kind);
        Error::invalid_request(message)
    }

    /// Log a failed gateway call, surface `kind` and convert the error.
    fn gateway_failure(
        &self,
        operation: &'static str,
        kind: NoticeKind,
        error: GatewayError,
    ) -> Error {
        warn!(operation, error_kind = error.kind(), error = %error, "gateway call failed");
        self.notify(kind);
        map_gateway_error(error)
    }

    /// Run `apply` unless the session ended since `epoch` was taken.
    fn reconcile(&self, epoch: u64, operation: &'static str, apply: impl FnOnce()) -> bool {
        let applied = self.epoch.run_if_current(epoch, || {
            if self.ports.sessions.current_session().is_none() {
                return false;
            }
            apply();
            true
        });
        if !applied {
            debug!(operation, "session ended before the response; cache left as is");
        }
        applied
    }

    /// Apply `modify` to every cached company list. Absent lists stay absent.
    fn modify_company_lists(&self, mut modify: impl FnMut(&mut Vec<Company>) -> bool) {
        for key in self.ports.cache.keys() {
            if key != QueryKey::Companies {
                continue;
            }
            let result = self.ports.cache.update(&key, &mut |data| match data {
                QueryData::Companies(list) => modify(list),
                _ => false,
            });
            log_cache_result(&key, result);
        }
    }

    /// Apply `modify` to the cached detail entry of `id`, if present.
    fn modify_company_detail(
        &self,
        id: &CompanyId,
        mut modify: impl FnMut(&mut Company) -> bool,
    ) {
        let key = QueryKey::Company(id.clone());
        let result = self.ports.cache.update(&key, &mut |data| match data {
            QueryData::Company(Some(company)) => modify(company),
            _ => false,
        });
        log_cache_result(&key, result);
    }

    fn write_cache(&self, key: QueryKey, data: QueryData) {
        if let Err(error) = self.ports.cache.write(key.clone(), data) {
            warn!(key = key.label(), %error, "query cache write failed");
        }
    }
}

fn log_cache_result(key: &QueryKey, result: Result<bool, QueryCacheError>) {
    if let Err(error) = result {
        warn!(key = key.label(), %error, "query cache update failed");
    }
}

/// Translate gateway failures into domain errors.
fn map_gateway_error(error: GatewayError) -> Error {
    match error {
        GatewayError::Transport { message } | GatewayError::Timeout { message } => {
            Error::service_unavailable(format!("crm gateway unavailable: {message}"))
        }
        GatewayError::Unauthorized { message } => {
            Error::unauthorized(format!("crm gateway refused credentials: {message}"))
        }
        GatewayError::InvalidRequest { message } => {
            Error::invalid_request(format!("crm gateway rejected request: {message}"))
        }
        GatewayError::Rejected { message } => {
            Error::internal(format!("crm gateway rejected operation: {message}"))
        }
        GatewayError::Decode { message } => {
            Error::internal(format!("crm gateway response malformed: {message}"))
        }
    }
}

#[cfg(test)]
mod tests;
