//! Observable screen state owned by the presentation layer.
//!
//! Screens hold these values and render from their `watch` receivers. Only
//! the coordinator mutates them, through the crate-private methods.

use std::sync::Arc;

use tokio::sync::watch;

use super::company::{Company, CompanyId, CompanyStatus};

/// Lifecycle of an optimistic status mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MutationPhase {
    #[default]
    Idle,
    OptimisticallyApplied,
    Reconciled,
    RolledBack,
}

/// Boolean screen flag that is raised for the duration of an operation.
#[derive(Debug, Clone)]
pub struct BusyFlag {
    state: Arc<watch::Sender<bool>>,
}

impl Default for BusyFlag {
    fn default() -> Self {
        let (state, _) = watch::channel(false);
        Self {
            state: Arc::new(state),
        }
    }
}

impl BusyFlag {
    pub fn is_raised(&self) -> bool {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.state.subscribe()
    }

    /// Raise the flag unless it is already up. The returned guard lowers it
    /// when dropped, including on early return or cancellation.
    pub(crate) fn try_raise(&self) -> Option<BusyGuard> {
        let raised = self.state.send_if_modified(|busy| {
            if *busy {
                false
            } else {
                *busy = true;
                true
            }
        });
        raised.then(|| BusyGuard {
            state: Arc::clone(&self.state),
        })
    }
}

/// Lowers its [`BusyFlag`] on drop.
#[derive(Debug)]
pub(crate) struct BusyGuard {
    state: Arc<watch::Sender<bool>>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.state.send_replace(false);
    }
}

/// Snapshot rendered by the company detail screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    pub company: Company,
    pub phase: MutationPhase,
}

/// Company detail screen state.
#[derive(Debug, Clone)]
pub struct CompanyDetailState {
    view: Arc<watch::Sender<DetailView>>,
}

impl CompanyDetailState {
    pub fn new(company: Company) -> Self {
        let (view, _) = watch::channel(DetailView {
            company,
            phase: MutationPhase::Idle,
        });
        Self {
            view: Arc::new(view),
        }
    }

    pub fn company(&self) -> Company {
        self.view.borrow().company.clone()
    }

    pub fn company_id(&self) -> CompanyId {
        self.view.borrow().company.id.clone()
    }

    /// Status currently displayed, which may be an optimistic value.
    pub fn status(&self) -> CompanyStatus {
        self.view.borrow().company.status
    }

    pub fn phase(&self) -> MutationPhase {
        self.view.borrow().phase
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailView> {
        self.view.subscribe()
    }

    /// True when both handles render the same screen.
    pub(crate) fn shares_view(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.view, &other.view)
    }

    /// Display `status` immediately and return the value it replaced.
    pub(crate) fn apply_optimistic_status(&self, status: CompanyStatus) -> CompanyStatus {
        let mut previous = status;
        self.view.send_modify(|view| {
            previous = view.company.status;
            view.company.status = status;
            view.phase = MutationPhase::OptimisticallyApplied;
        });
        previous
    }

    pub(crate) fn settle(&self, status: CompanyStatus, phase: MutationPhase) {
        self.view.send_modify(|view| {
            view.company.status = status;
            view.phase = phase;
        });
    }

    pub(crate) fn replace_company(&self, company: Company) {
        self.view.send_modify(|view| {
            view.company = company;
            view.phase = MutationPhase::Reconciled;
        });
    }
}

/// Interaction composer at the bottom of the detail screen.
#[derive(Debug, Clone)]
pub struct InteractionComposer {
    company_id: CompanyId,
    draft: Arc<watch::Sender<String>>,
    sending: BusyFlag,
}

impl InteractionComposer {
    pub fn new(company_id: CompanyId) -> Self {
        let (draft, _) = watch::channel(String::new());
        Self {
            company_id,
            draft: Arc::new(draft),
            sending: BusyFlag::default(),
        }
    }

    pub fn company_id(&self) -> &CompanyId {
        &self.company_id
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        self.draft.send_replace(text.into());
    }

    pub fn draft(&self) -> String {
        self.draft.borrow().clone()
    }

    pub fn subscribe_draft(&self) -> watch::Receiver<String> {
        self.draft.subscribe()
    }

    /// True while a send is in flight.
    pub fn is_sending(&self) -> bool {
        self.sending.is_raised()
    }

    pub fn subscribe_sending(&self) -> watch::Receiver<bool> {
        self.sending.subscribe()
    }

    pub(crate) fn begin_send(&self) -> Option<BusyGuard> {
        self.sending.try_raise()
    }

    pub(crate) fn clear_draft(&self) {
        self.draft.send_replace(String::new());
    }
}

/// Company list screen state.
#[derive(Debug, Clone, Default)]
pub struct CompanyListState {
    refreshing: BusyFlag,
}

impl CompanyListState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing.is_raised()
    }

    pub fn subscribe_refreshing(&self) -> watch::Receiver<bool> {
        self.refreshing.subscribe()
    }

    pub(crate) fn begin_refresh(&self) -> Option<BusyGuard> {
        self.refreshing.try_raise()
    }
}
