//! Port for the remote CRM data API.
//!
//! The gateway speaks in domain types. Adapters own the wire format,
//! including the integer ids the server uses.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::define_port_error;
use crate::domain::{
    Company, CompanyId, CompanyPatch, CompanyStatus, CompanyStatusAck, Interaction,
    InteractionContent, InteractionId, NewCompany,
};

define_port_error! {
    /// Errors raised by CRM gateway adapters.
    pub enum GatewayError {
        /// The request never produced a usable HTTP response.
        Transport { message: String } => "crm gateway transport failed: {message}",
        /// The request exceeded the configured timeout.
        Timeout { message: String } => "crm gateway timed out: {message}",
        /// The server refused the credential, or no session was available.
        Unauthorized { message: String } => "crm gateway refused credentials: {message}",
        /// The server rejected the request shape.
        InvalidRequest { message: String } => "crm gateway rejected request: {message}",
        /// The server answered with GraphQL errors.
        Rejected { message: String } => "crm gateway rejected operation: {message}",
        /// The response payload could not be decoded.
        Decode { message: String } => "crm gateway response was malformed: {message}",
    }
}

/// Remote data gateway for companies and interactions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CrmGateway: Send + Sync {
    /// List the signed-in user's companies.
    async fn companies(&self) -> Result<Vec<Company>, GatewayError>;

    /// Fetch one company; `None` when the server does not know the id.
    async fn company(&self, id: &CompanyId) -> Result<Option<Company>, GatewayError>;

    /// List interactions recorded against a company.
    async fn interactions(&self, company_id: &CompanyId)
    -> Result<Vec<Interaction>, GatewayError>;

    async fn create_company(&self, input: &NewCompany) -> Result<Company, GatewayError>;

    /// Apply a partial edit and return the full updated company.
    async fn update_company(
        &self,
        id: &CompanyId,
        patch: &CompanyPatch,
    ) -> Result<Company, GatewayError>;

    /// Change only the status; the server answers with `{id, status}`.
    async fn update_company_status(
        &self,
        id: &CompanyId,
        status: CompanyStatus,
    ) -> Result<CompanyStatusAck, GatewayError>;

    /// Delete a company. `Ok(false)` means the server declined.
    async fn delete_company(&self, id: &CompanyId) -> Result<bool, GatewayError>;

    async fn create_interaction(
        &self,
        company_id: &CompanyId,
        content: &InteractionContent,
    ) -> Result<Interaction, GatewayError>;
}

/// Fixture gateway that echoes its inputs and stores nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCrmGateway;

const FIXTURE_COMPANY_ID: i64 = 1;
const FIXTURE_INTERACTION_ID: i64 = 1;

#[async_trait]
impl CrmGateway for FixtureCrmGateway {
    async fn companies(&self) -> Result<Vec<Company>, GatewayError> {
        Ok(Vec::new())
    }

    async fn company(&self, _id: &CompanyId) -> Result<Option<Company>, GatewayError> {
        Ok(None)
    }

    async fn interactions(
        &self,
        _company_id: &CompanyId,
    ) -> Result<Vec<Interaction>, GatewayError> {
        Ok(Vec::new())
    }

    async fn create_company(&self, input: &NewCompany) -> Result<Company, GatewayError> {
        let mut company = Company::new(
            CompanyId::from(FIXTURE_COMPANY_ID),
            input.name.clone(),
            input.status,
        );
        company.website.clone_from(&input.website);
        company.phone.clone_from(&input.phone);
        company.primary_contact_name.clone_from(&input.primary_contact_name);
        company.primary_contact_email.clone_from(&input.primary_contact_email);
        company.potential_value = input.potential_value.unwrap_or_default();
        company.lead_source = input.lead_source;
        Ok(company)
    }

    async fn update_company(
        &self,
        id: &CompanyId,
        patch: &CompanyPatch,
    ) -> Result<Company, GatewayError> {
        let name = patch
            .name
            .clone()
            .ok_or_else(|| GatewayError::invalid_request("fixture edits require a name"))?;
        let mut company = Company::new(id.clone(), name, patch.status.unwrap_or_default());
        company.website.clone_from(&patch.website);
        company.phone.clone_from(&patch.phone);
        company.potential_value = patch.potential_value.unwrap_or_default();
        company.lead_source = patch.lead_source.unwrap_or_default();
        Ok(company)
    }

    async fn update_company_status(
        &self,
        id: &CompanyId,
        status: CompanyStatus,
    ) -> Result<CompanyStatusAck, GatewayError> {
        Ok(CompanyStatusAck {
            id: id.clone(),
            status,
        })
    }

    async fn delete_company(&self, _id: &CompanyId) -> Result<bool, GatewayError> {
        Ok(true)
    }

    async fn create_interaction(
        &self,
        company_id: &CompanyId,
        content: &InteractionContent,
    ) -> Result<Interaction, GatewayError> {
        Ok(Interaction {
            id: InteractionId::from(FIXTURE_INTERACTION_ID),
            company_id: company_id.clone(),
            content: content.clone(),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::CompanyDraft;

    #[tokio::test]
    async fn fixture_gateway_acknowledges_requested_status() {
        let gateway = FixtureCrmGateway;
        let ack = gateway
            .update_company_status(&CompanyId::from(3), CompanyStatus::Won)
            .await
            .expect("fixture ack");
        assert_eq!(ack.id, CompanyId::from(3));
        assert_eq!(ack.status, CompanyStatus::Won);
    }

    #[tokio::test]
    async fn fixture_gateway_echoes_new_company() {
        let input = CompanyDraft::named("Initech").validate().expect("valid");
        let company = FixtureCrmGateway
            .create_company(&input)
            .await
            .expect("fixture company");
        assert_eq!(company.name.as_str(), "Initech");
        assert_eq!(company.status, CompanyStatus::Lead);
    }

    #[test]
    fn gateway_errors_report_their_kind() {
        let err = GatewayError::timeout("after 30s");
        assert_eq!(err.kind(), "Timeout");
        assert_eq!(err.to_string(), "crm gateway timed out: after 30s");
    }
}
