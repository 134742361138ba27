//! Optimistic pipeline status changes.

use tracing::{debug, warn};

use super::{MutationCoordinator, MutationOutcome, map_gateway_error};
use crate::domain::{CompanyDetailState, CompanyStatus, CompanyStatusAck, Error, NoticeKind};

impl MutationCoordinator {
    /// Move the company shown by `detail` to `status`.
    ///
    /// The new status is displayed before the first suspension point. On
    /// success the acknowledgement is merged into every cached company list
    /// and the cached detail entry. On failure the screen is restored and the
    /// cache is left untouched.
    ///
    /// Overlapping calls for one company reach the server in invocation
    /// order; only the newest call writes the final displayed status.
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::ErrorCode::Unauthorized`] without touching the
    /// screen when no session is active. Remote failures are reported through
    /// [`MutationOutcome::RolledBack`].
    pub async fn update_status(
        &self,
        detail: &CompanyDetailState,
        status: CompanyStatus,
    ) -> Result<MutationOutcome, Error> {
        let epoch = self.require_session("update_status")?;

        let company_id = detail.company_id();
        let mut ticket = self.ledger.begin(detail, status);
        debug!(
            company_id = %company_id,
            %status,
            previous = %ticket.displayed_before(),
            "optimistic status applied"
        );

        ticket.wait_turn().await;
        match self
            .ports
            .gateway
            .update_company_status(&company_id, status)
            .await
        {
            Ok(ack) => {
                self.reconcile(epoch, "update_status", || self.merge_status(&ack));
                let resolution = ticket.resolve(Some(ack.status));
                debug!(
                    company_id = %ack.id,
                    status = %ack.status,
                    latest = resolution.is_latest,
                    "status reconciled"
                );
                Ok(MutationOutcome::Reconciled(ack))
            }
            Err(error) => {
                let resolution = ticket.resolve(None);
                warn!(
                    company_id = %company_id,
                    requested = %status,
                    restored = %resolution.settled,
                    error_kind = error.kind(),
                    error = %error,
                    "status update rolled back"
                );
                self.notify(NoticeKind::StatusUpdateFailed);
                Ok(MutationOutcome::RolledBack {
                    restored: resolution.settled,
                    error: map_gateway_error(error),
                })
            }
        }
    }

    /// Write an acknowledged status into every cached view of the company.
    fn merge_status(&self, ack: &CompanyStatusAck) {
        self.modify_company_lists(|companies| {
            let mut changed = false;
            for company in companies.iter_mut().filter(|company| company.id == ack.id) {
                if company.status != ack.status {
                    company.status = ack.status;
                    changed = true;
                }
            }
            changed
        });
        self.modify_company_detail(&ack.id, |company| {
            if company.status == ack.status {
                return false;
            }
            company.status = ack.status;
            true
        });
    }
}
