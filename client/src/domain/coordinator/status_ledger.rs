//! Per-company ordering of status mutations.
//!
//! Every status change is applied to the screen at once, but the remote
//! calls for one company run strictly one after another. Each pending call
//! remembers the status to restore if it fails. When a call resolves, the
//! next pending call's rollback target is rebased onto the value the earlier
//! call settled on, so a failure never restores a value the server has not
//! acknowledged.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use crate::domain::{CompanyDetailState, CompanyId, CompanyStatus, MutationPhase};

#[derive(Debug)]
struct PendingStatus {
    ticket: u64,
    rollback_to: CompanyStatus,
}

#[derive(Debug)]
struct CompanyLedger {
    next_ticket: u64,
    /// Ticket currently allowed to issue its remote call.
    turn: watch::Sender<u64>,
    pending: VecDeque<PendingStatus>,
    /// Every detail screen that queued a call while this entry was live.
    screens: Vec<CompanyDetailState>,
}

impl CompanyLedger {
    fn new() -> Self {
        let (turn, _) = watch::channel(0);
        Self {
            next_ticket: 0,
            turn,
            pending: VecDeque::new(),
            screens: Vec::new(),
        }
    }
}

/// Outcome of resolving a [`StatusTicket`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Resolution {
    /// No later call for the same company is pending.
    pub is_latest: bool,
    /// Status the company is at rest on once this call is accounted for.
    pub settled: CompanyStatus,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct StatusLedger {
    companies: Arc<Mutex<HashMap<CompanyId, CompanyLedger>>>,
}

impl StatusLedger {
    fn lock(&self) -> MutexGuard<'_, HashMap<CompanyId, CompanyLedger>> {
        self.companies.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `status` to the screen and queue a remote call for it.
    ///
    /// The display write and the enqueue happen under one lock so tickets are
    /// ordered exactly as the optimistic values were shown.
    pub(crate) fn begin(&self, detail: &CompanyDetailState, status: CompanyStatus) -> StatusTicket {
        let company_id = detail.company_id();
        let mut companies = self.lock();
        let ledger = companies
            .entry(company_id.clone())
            .or_insert_with(CompanyLedger::new);
        if !ledger.screens.iter().any(|screen| screen.shares_view(detail)) {
            ledger.screens.push(detail.clone());
        }
        let rollback_to = detail.apply_optimistic_status(status);
        let ticket = ledger.next_ticket;
        ledger.next_ticket += 1;
        ledger.pending.push_back(PendingStatus {
            ticket,
            rollback_to,
        });
        let turn = ledger.turn.subscribe();
        drop(companies);

        StatusTicket {
            ledger: self.clone(),
            company_id,
            ticket,
            rollback_to,
            turn,
            resolved: false,
        }
    }

    fn finish(
        &self,
        company_id: &CompanyId,
        ticket: u64,
        acknowledged: Option<CompanyStatus>,
    ) -> Option<Resolution> {
        let mut companies = self.lock();
        let ledger = companies.get_mut(company_id)?;
        let position = ledger
            .pending
            .iter()
            .position(|pending| pending.ticket == ticket)?;
        let entry = ledger.pending.remove(position)?;

        let settled = acknowledged.unwrap_or(entry.rollback_to);
        if let Some(next) = ledger.pending.get_mut(position) {
            next.rollback_to = settled;
        }
        let is_latest = position == ledger.pending.len();
        if is_latest {
            let phase = if acknowledged.is_some() {
                MutationPhase::Reconciled
            } else {
                MutationPhase::RolledBack
            };
            for screen in &ledger.screens {
                screen.settle(settled, phase);
            }
        }

        match ledger.pending.front().map(|pending| pending.ticket) {
            Some(next_turn) => {
                ledger.turn.send_replace(next_turn);
            }
            None => {
                companies.remove(company_id);
            }
        }
        Some(Resolution { is_latest, settled })
    }

    #[cfg(test)]
    fn pending_count(&self, company_id: &CompanyId) -> usize {
        self.lock()
            .get(company_id)
            .map_or(0, |ledger| ledger.pending.len())
    }
}

/// A queued status call. Dropping an unresolved ticket resolves it as a
/// failure so cancelled calls never block the queue.
#[derive(Debug)]
pub(crate) struct StatusTicket {
    ledger: StatusLedger,
    company_id: CompanyId,
    ticket: u64,
    rollback_to: CompanyStatus,
    turn: watch::Receiver<u64>,
    resolved: bool,
}

impl StatusTicket {
    /// Status displayed when this call was made.
    pub(crate) fn displayed_before(&self) -> CompanyStatus {
        self.rollback_to
    }

    /// Wait until every earlier call for the company has resolved.
    pub(crate) async fn wait_turn(&mut self) {
        let ticket = self.ticket;
        // The sender lives in the ledger for as long as this ticket is pending.
        let _ = self.turn.wait_for(|current| *current == ticket).await;
    }

    /// Record the outcome and settle the screen if no later call is pending.
    pub(crate) fn resolve(mut self, acknowledged: Option<CompanyStatus>) -> Resolution {
        self.resolved = true;
        self.ledger
            .finish(&self.company_id, self.ticket, acknowledged)
            .unwrap_or(Resolution {
                is_latest: true,
                settled: acknowledged.unwrap_or(self.rollback_to),
            })
    }
}

impl Drop for StatusTicket {
    fn drop(&mut self) {
        if !self.resolved {
            self.ledger
                .finish(&self.company_id, self.ticket, None);
        }
    }
}
