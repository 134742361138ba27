//! Wire DTOs for the CRM GraphQL API.
//!
//! Responses decode into these transport DTOs first and then map into domain
//! records in one pass. The server speaks integer ids and epoch-millisecond
//! timestamps; both are normalised here.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{
    Company, CompanyId, CompanyName, CompanyPatch, CompanyStatus, CompanyStatusAck, Interaction,
    InteractionContent, InteractionId, LeadSource, NewCompany, PotentialValue,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GraphqlRequest<'a, V> {
    pub(super) query: &'a str,
    pub(super) operation_name: &'a str,
    pub(super) variables: V,
}

#[derive(Debug, Deserialize)]
pub(super) struct GraphqlResponse<T> {
    pub(super) data: Option<T>,
    #[serde(default)]
    pub(super) errors: Vec<GraphqlErrorDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct GraphqlErrorDto {
    pub(super) message: String,
    #[serde(default)]
    pub(super) extensions: Option<GraphqlErrorExtensionsDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct GraphqlErrorExtensionsDto {
    pub(super) code: Option<String>,
}

impl GraphqlErrorDto {
    pub(super) fn code(&self) -> Option<&str> {
        self.extensions.as_ref()?.code.as_deref()
    }
}

/// Id as sent by the server: normally an `Int`, tolerated as a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(super) enum WireId {
    Int(i64),
    Text(String),
}

impl WireId {
    fn into_canonical(self) -> Result<String, String> {
        let canonical = match self {
            Self::Int(value) => value.to_string(),
            Self::Text(value) => value.trim().to_owned(),
        };
        if canonical.is_empty() {
            return Err("id must not be empty".to_owned());
        }
        Ok(canonical)
    }

    fn into_company_id(self) -> Result<CompanyId, String> {
        CompanyId::new(self.into_canonical()?).map_err(|error| error.to_string())
    }
}

/// Convert a canonical company id back to the server's integer form.
pub(super) fn wire_company_id(id: &CompanyId) -> Result<i64, String> {
    id.as_str()
        .parse::<i64>()
        .map_err(|_| format!("company id '{id}' is not a server integer id"))
}

/// Timestamp as sent by the server: epoch milliseconds as a number or a
/// numeric string, or an RFC 3339 string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(super) enum WireTimestamp {
    Millis(i64),
    Text(String),
}

impl WireTimestamp {
    fn into_datetime(self) -> Result<DateTime<Utc>, String> {
        let millis = match self {
            Self::Millis(millis) => millis,
            Self::Text(text) => match text.trim().parse::<i64>() {
                Ok(millis) => millis,
                Err(_) => {
                    return DateTime::parse_from_rfc3339(text.trim())
                        .map(|parsed| parsed.with_timezone(&Utc))
                        .map_err(|error| format!("invalid timestamp '{text}': {error}"));
                }
            },
        };
        Utc.timestamp_millis_opt(millis)
            .single()
            .ok_or_else(|| format!("timestamp {millis} is out of range"))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CompanyDto {
    id: WireId,
    name: String,
    status: CompanyStatus,
    website: Option<String>,
    phone: Option<String>,
    primary_contact_name: Option<String>,
    primary_contact_email: Option<String>,
    #[serde(default)]
    potential_value: i64,
    #[serde(default)]
    lead_source: LeadSource,
    user_id: Option<String>,
}

impl CompanyDto {
    pub(super) fn into_domain(self) -> Result<Company, String> {
        let id = self.id.into_company_id()?;
        let name = CompanyName::new(self.name)
            .map_err(|error| format!("company {id}: {error}"))?;
        let potential_value = PotentialValue::new(self.potential_value)
            .map_err(|error| format!("company {id}: {error}"))?;
        let mut company = Company::new(id, name, self.status);
        company.website = self.website;
        company.phone = self.phone;
        company.primary_contact_name = self.primary_contact_name;
        company.primary_contact_email = self.primary_contact_email;
        company.potential_value = potential_value;
        company.lead_source = self.lead_source;
        company.user_id = self.user_id;
        Ok(company)
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct CompanyStatusDto {
    id: WireId,
    status: CompanyStatus,
}

impl CompanyStatusDto {
    pub(super) fn into_domain(self) -> Result<CompanyStatusAck, String> {
        Ok(CompanyStatusAck {
            id: self.id.into_company_id()?,
            status: self.status,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct InteractionDto {
    id: WireId,
    content: String,
    company_id: WireId,
    created_at: WireTimestamp,
}

impl InteractionDto {
    pub(super) fn into_domain(self) -> Result<Interaction, String> {
        let id = InteractionId::new(self.id.into_canonical()?);
        let content = InteractionContent::new(&self.content)
            .map_err(|error| format!("interaction {id}: {error}"))?;
        Ok(Interaction {
            company_id: self.company_id.into_company_id()?,
            created_at: self.created_at.into_datetime()?,
            id,
            content,
        })
    }
}

pub(super) fn companies_into_domain(companies: Vec<CompanyDto>) -> Result<Vec<Company>, String> {
    companies.into_iter().map(CompanyDto::into_domain).collect()
}

/// Decode a listing. Rows without content are skipped so one blank note
/// does not hide the rest of the history.
pub(super) fn interactions_into_domain(
    interactions: Vec<InteractionDto>,
) -> Result<Vec<Interaction>, String> {
    let mut decoded = Vec::with_capacity(interactions.len());
    for dto in interactions {
        if dto.content.trim().is_empty() {
            warn!(interaction_id = ?dto.id, "skipping interaction without content");
            continue;
        }
        decoded.push(dto.into_domain()?);
    }
    Ok(decoded)
}

#[derive(Debug, Deserialize)]
pub(super) struct CompaniesData {
    pub(super) companies: Vec<CompanyDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CompanyData {
    pub(super) company: Option<CompanyDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct InteractionsData {
    pub(super) interactions: Vec<InteractionDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CreateCompanyData {
    pub(super) create_company: CompanyDto,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UpdateCompanyData<T> {
    pub(super) update_company: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DeleteCompanyData {
    pub(super) delete_company: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CreateInteractionData {
    pub(super) create_interaction: InteractionDto,
}

#[derive(Debug, Serialize)]
pub(super) struct IdVariables {
    pub(super) id: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CompanyIdVariables {
    pub(super) company_id: i64,
}

#[derive(Debug, Serialize)]
pub(super) struct InputVariables<T> {
    pub(super) input: T,
}

#[derive(Debug, Serialize)]
pub(super) struct IdInputVariables<T> {
    pub(super) id: i64,
    pub(super) input: T,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CreateInteractionVariables<'a> {
    pub(super) company_id: i64,
    pub(super) content: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CreateCompanyInputDto<'a> {
    name: &'a str,
    status: CompanyStatus,
    website: Option<&'a str>,
    phone: Option<&'a str>,
    primary_contact_name: Option<&'a str>,
    primary_contact_email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    potential_value: Option<i64>,
    lead_source: LeadSource,
}

impl<'a> From<&'a NewCompany> for CreateCompanyInputDto<'a> {
    fn from(input: &'a NewCompany) -> Self {
        Self {
            name: input.name.as_str(),
            status: input.status,
            website: input.website.as_deref(),
            phone: input.phone.as_deref(),
            primary_contact_name: input.primary_contact_name.as_deref(),
            primary_contact_email: input.primary_contact_email.as_deref(),
            potential_value: input.potential_value.map(i64::from),
            lead_source: input.lead_source,
        }
    }
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UpdateCompanyInputDto<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<CompanyStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    website: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    primary_contact_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    primary_contact_email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    potential_value: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lead_source: Option<LeadSource>,
}

impl UpdateCompanyInputDto<'_> {
    pub(super) fn status_only(status: CompanyStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

impl<'a> From<&'a CompanyPatch> for UpdateCompanyInputDto<'a> {
    fn from(patch: &'a CompanyPatch) -> Self {
        Self {
            name: patch.name.as_ref().map(CompanyName::as_str),
            status: patch.status,
            website: patch.website.as_deref(),
            phone: patch.phone.as_deref(),
            primary_contact_name: patch.primary_contact_name.as_deref(),
            primary_contact_email: patch.primary_contact_email.as_deref(),
            potential_value: patch.potential_value.map(i64::from),
            lead_source: patch.lead_source,
        }
    }
}
