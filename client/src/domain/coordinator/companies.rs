//! Company lifecycle operations that wait for the server before changing
//! local state.

use tracing::{info, warn};

use super::MutationCoordinator;
use crate::domain::ports::{QueryData, QueryKey};
use crate::domain::{
    Company, CompanyDetailState, CompanyDraft, CompanyId, CompanyPatch, CompanyValidationError,
    Error, NoticeKind,
};

impl MutationCoordinator {
    /// Delete a company, then drop it from the cache and leave its screen.
    ///
    /// Nothing changes locally unless the server confirms the deletion.
    /// Deleting a company that is no longer cached leaves the cache as is.
    ///
    /// # Errors
    ///
    /// Returns an error, after surfacing a notice, when no session is
    /// active, the gateway fails, or the server declines.
    pub async fn delete_company(&self, id: &CompanyId) -> Result<(), Error> {
        let epoch = self.require_session("delete_company")?;

        let deleted = self
            .ports
            .gateway
            .delete_company(id)
            .await
            .map_err(|error| self.gateway_failure("delete_company", NoticeKind::DeleteFailed, error))?;
        if !deleted {
            warn!(company_id = %id, "server declined company deletion");
            self.notify(NoticeKind::DeleteFailed);
            return Err(Error::internal(format!(
                "server declined to delete company {id}"
            )));
        }

        info!(company_id = %id, "company deleted");
        let reconciled = self.reconcile(epoch, "delete_company", || {
            self.modify_company_lists(|companies| {
                let before = companies.len();
                companies.retain(|company| &company.id != id);
                companies.len() != before
            });
            self.ports.cache.evict(&QueryKey::Company(id.clone()));
            self.ports.cache.evict(&QueryKey::Interactions(id.clone()));
        });
        if reconciled {
            self.presentation.navigator.leave_company(id);
        }
        Ok(())
    }

    /// Validate and create a company, then return to the list.
    ///
    /// # Errors
    ///
    /// Validation failures are reported before any network call. Gateway
    /// failures surface a notice and leave the cache untouched.
    pub async fn create_company(&self, draft: &CompanyDraft) -> Result<Company, Error> {
        let input = draft.validate().map_err(|error| {
            let kind = match error {
                CompanyValidationError::EmptyName => NoticeKind::EmptyCompanyName,
                _ => NoticeKind::InvalidCompanyInput,
            };
            self.reject_input(kind, error.to_string())
        })?;
        let epoch = self.require_session("create_company")?;

        let company = self
            .ports
            .gateway
            .create_company(&input)
            .await
            .map_err(|error| {
                self.gateway_failure("create_company", NoticeKind::CreateCompanyFailed, error)
            })?;

        info!(company_id = %company.id, status = %company.status, "company created");
        let reconciled = self.reconcile(epoch, "create_company", || {
            self.modify_company_lists(|companies| {
                if companies.iter().any(|existing| existing.id == company.id) {
                    return false;
                }
                companies.push(company.clone());
                true
            });
            self.write_cache(
                QueryKey::Company(company.id.clone()),
                QueryData::Company(Some(company.clone())),
            );
        });
        if reconciled {
            self.presentation.navigator.return_to_list();
        }
        Ok(company)
    }

    /// Save a full edit of the company shown by `detail`.
    ///
    /// Not optimistic: the screen and cache change only once the server
    /// returns the updated company.
    ///
    /// # Errors
    ///
    /// Empty patches are rejected before any network call. Gateway failures
    /// surface a notice and leave all state untouched.
    pub async fn edit_company(
        &self,
        detail: &CompanyDetailState,
        patch: &CompanyPatch,
    ) -> Result<Company, Error> {
        patch
            .ensure_not_empty()
            .map_err(|error| self.reject_input(NoticeKind::NothingToSave, error.to_string()))?;
        let epoch = self.require_session("edit_company")?;

        let id = detail.company_id();
        let company = self
            .ports
            .gateway
            .update_company(&id, patch)
            .await
            .map_err(|error| {
                self.gateway_failure("edit_company", NoticeKind::EditCompanyFailed, error)
            })?;

        self.reconcile(epoch, "edit_company", || {
            self.modify_company_lists(|companies| {
                let mut changed = false;
                for existing in companies.iter_mut().filter(|existing| existing.id == company.id) {
                    if *existing != company {
                        existing.clone_from(&company);
                        changed = true;
                    }
                }
                changed
            });
            self.modify_company_detail(&company.id, |existing| {
                if *existing == company {
                    return false;
                }
                existing.clone_from(&company);
                true
            });
        });
        detail.replace_company(company.clone());
        info!(company_id = %company.id, "company edited");
        Ok(company)
    }

    /// End the session and drop every cached query of the previous user.
    ///
    /// Responses to calls made before sign-out are not cached when they
    /// arrive afterwards.
    pub async fn sign_out(&self) {
        self.ports.sessions.end_session().await;
        self.epoch.advance(|| self.ports.cache.clear());
        info!("signed out and cleared query cache");
        self.presentation.navigator.to_sign_in();
    }
}
