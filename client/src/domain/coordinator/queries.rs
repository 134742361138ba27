//! Read-through queries that populate the cache.

use tracing::debug;

use super::MutationCoordinator;
use crate::domain::ports::{QueryData, QueryKey};
use crate::domain::{
    Company, CompanyId, CompanyListState, Error, Interaction, NoticeKind, sort_newest_first,
};

impl MutationCoordinator {
    /// Fetch the companies list and cache it.
    ///
    /// # Errors
    ///
    /// Fails without touching the cache when no session is active or the
    /// gateway fails.
    pub async fn load_companies(&self) -> Result<Vec<Company>, Error> {
        let epoch = self.require_session("load_companies")?;
        let companies = self.ports.gateway.companies().await.map_err(|error| {
            self.gateway_failure("load_companies", NoticeKind::LoadCompaniesFailed, error)
        })?;
        debug!(count = companies.len(), "companies loaded");
        self.reconcile(epoch, "load_companies", || {
            self.write_cache(QueryKey::Companies, QueryData::Companies(companies.clone()));
        });
        Ok(companies)
    }

    /// Pull-to-refresh for the companies list.
    ///
    /// `list` shows as refreshing until the call finishes on any path. A
    /// refresh requested while one is running returns the cached list
    /// without another network call.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load_companies`].
    pub async fn refresh_companies(&self, list: &CompanyListState) -> Result<Vec<Company>, Error> {
        let Some(_refreshing) = list.begin_refresh() else {
            debug!("refresh already running");
            return Ok(self.cached_companies().unwrap_or_default());
        };
        self.load_companies().await
    }

    /// Fetch one company and cache it. `None` when the server does not know
    /// the id; that absence is cached too.
    ///
    /// # Errors
    ///
    /// Fails without touching the cache when no session is active or the
    /// gateway fails.
    pub async fn load_company(&self, id: &CompanyId) -> Result<Option<Company>, Error> {
        let epoch = self.require_session("load_company")?;
        let company = self.ports.gateway.company(id).await.map_err(|error| {
            self.gateway_failure("load_company", NoticeKind::LoadCompanyFailed, error)
        })?;
        debug!(company_id = %id, found = company.is_some(), "company loaded");
        self.reconcile(epoch, "load_company", || {
            self.write_cache(QueryKey::Company(id.clone()), QueryData::Company(company.clone()));
        });
        Ok(company)
    }

    /// Fetch a company's interactions, newest first, and cache them.
    ///
    /// # Errors
    ///
    /// Fails without touching the cache when no session is active or the
    /// gateway fails.
    pub async fn load_interactions(&self, company_id: &CompanyId) -> Result<Vec<Interaction>, Error> {
        let epoch = self.require_session("load_interactions")?;
        let mut interactions = self
            .ports
            .gateway
            .interactions(company_id)
            .await
            .map_err(|error| {
                self.gateway_failure("load_interactions", NoticeKind::LoadInteractionsFailed, error)
            })?;
        sort_newest_first(&mut interactions);
        debug!(company_id = %company_id, count = interactions.len(), "interactions loaded");
        self.reconcile(epoch, "load_interactions", || {
            self.write_cache(
                QueryKey::Interactions(company_id.clone()),
                QueryData::Interactions(interactions.clone()),
            );
        });
        Ok(interactions)
    }

    /// Companies list currently cached, if any.
    pub fn cached_companies(&self) -> Option<Vec<Company>> {
        match self.ports.cache.read(&QueryKey::Companies)? {
            QueryData::Companies(companies) => Some(companies),
            _ => None,
        }
    }

    /// Cached detail entry for `id`. The outer `None` means nothing is cached.
    pub fn cached_company(&self, id: &CompanyId) -> Option<Option<Company>> {
        match self.ports.cache.read(&QueryKey::Company(id.clone()))? {
            QueryData::Company(company) => Some(company),
            _ => None,
        }
    }

    /// Interactions list currently cached for `company_id`, if any.
    pub fn cached_interactions(&self, company_id: &CompanyId) -> Option<Vec<Interaction>> {
        match self
            .ports
            .cache
            .read(&QueryKey::Interactions(company_id.clone()))?
        {
            QueryData::Interactions(interactions) => Some(interactions),
            _ => None,
        }
    }
}
