//! Reqwest-backed CRM gateway adapter.
//!
//! This adapter owns transport details only: GraphQL envelope encoding,
//! credential headers, timeout and HTTP error mapping, and decoding into
//! domain records.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, COOKIE, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::documents;
use super::dto::{
    CompaniesData, CompanyData, CompanyDto, CompanyIdVariables, CompanyStatusDto,
    CreateCompanyData, CreateCompanyInputDto, CreateInteractionData, CreateInteractionVariables,
    DeleteCompanyData, GraphqlErrorDto, GraphqlRequest, GraphqlResponse, IdInputVariables,
    IdVariables, InputVariables, InteractionsData, UpdateCompanyData, UpdateCompanyInputDto,
    companies_into_domain, interactions_into_domain, wire_company_id,
};
use crate::domain::ports::{CrmGateway, GatewayError, SessionProvider};
use crate::domain::{
    Company, CompanyId, CompanyPatch, CompanyStatus, CompanyStatusAck, Interaction,
    InteractionContent, NewCompany, Session,
};

const GRAPHQL_PATH: &str = "api/graphql";
const SESSION_COOKIE: &str = "better-auth.session_token";
const UNAUTHENTICATED_CODES: [&str; 3] = ["UNAUTHENTICATED", "UNAUTHORIZED", "FORBIDDEN"];

/// Gateway adapter that POSTs GraphQL documents to one endpoint.
pub struct GraphqlHttpGateway {
    client: Client,
    endpoint: Url,
    sessions: Arc<dyn SessionProvider>,
}

impl GraphqlHttpGateway {
    /// Build an adapter for the API rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error when the endpoint cannot be derived from `base_url`
    /// or the reqwest client cannot be constructed.
    pub fn new(
        base_url: &Url,
        timeout: Duration,
        sessions: Arc<dyn SessionProvider>,
    ) -> Result<Self, GatewayError> {
        let endpoint = graphql_endpoint(base_url)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| GatewayError::transport(error.to_string()))?;
        Ok(Self {
            client,
            endpoint,
            sessions,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn execute<V, T>(
        &self,
        operation_name: &str,
        query: &str,
        variables: V,
    ) -> Result<T, GatewayError>
    where
        V: Serialize + Send,
        T: DeserializeOwned + Send,
    {
        let session = self
            .sessions
            .current_session()
            .ok_or_else(|| GatewayError::unauthorized("no active session"))?;
        let request = GraphqlRequest {
            query,
            operation_name,
            variables,
        };
        let response = self
            .client
            .post(self.endpoint.clone())
            .headers(auth_headers(&session)?)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        debug!(
            operation = operation_name,
            status = status.as_u16(),
            bytes = body.len(),
            "graphql response"
        );
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_envelope(body.as_ref())
    }
}

/// Append the GraphQL path to the configured base URL.
fn graphql_endpoint(base_url: &Url) -> Result<Url, GatewayError> {
    let mut base = base_url.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(GRAPHQL_PATH)
        .map_err(|error| GatewayError::invalid_request(format!("invalid GraphQL endpoint: {error}")))
}

fn auth_headers(session: &Session) -> Result<HeaderMap, GatewayError> {
    let token = session.token.expose();
    let mut bearer = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|_| GatewayError::unauthorized("session token is not a valid header value"))?;
    bearer.set_sensitive(true);
    let mut cookie = HeaderValue::from_str(&format!("{SESSION_COOKIE}={token}"))
        .map_err(|_| GatewayError::unauthorized("session token is not a valid cookie value"))?;
    cookie.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, bearer);
    headers.insert(COOKIE, cookie);
    Ok(headers)
}

fn parse_envelope<T: DeserializeOwned>(body: &[u8]) -> Result<T, GatewayError> {
    let envelope: GraphqlResponse<T> = serde_json::from_slice(body).map_err(|error| {
        GatewayError::decode(format!("invalid GraphQL response payload: {error}"))
    })?;
    if !envelope.errors.is_empty() {
        return Err(map_graphql_errors(&envelope.errors));
    }
    envelope
        .data
        .ok_or_else(|| GatewayError::decode("GraphQL response carried neither data nor errors"))
}

fn map_graphql_errors(errors: &[GraphqlErrorDto]) -> GatewayError {
    let message = errors
        .iter()
        .map(|error| error.message.as_str())
        .collect::<Vec<_>>()
        .join("; ");
    let unauthenticated = errors
        .iter()
        .filter_map(GraphqlErrorDto::code)
        .any(|code| UNAUTHENTICATED_CODES.contains(&code));
    if unauthenticated {
        GatewayError::unauthorized(message)
    } else {
        GatewayError::rejected(message)
    }
}

fn map_transport_error(error: reqwest::Error) -> GatewayError {
    if error.is_timeout() {
        GatewayError::timeout(error.to_string())
    } else {
        GatewayError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> GatewayError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GatewayError::unauthorized(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => GatewayError::timeout(message),
        _ if status.is_client_error() => GatewayError::invalid_request(message),
        _ => GatewayError::transport(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

fn wire_id(id: &CompanyId) -> Result<i64, GatewayError> {
    wire_company_id(id).map_err(GatewayError::invalid_request)
}

#[async_trait]
impl CrmGateway for GraphqlHttpGateway {
    async fn companies(&self) -> Result<Vec<Company>, GatewayError> {
        let data: CompaniesData = self
            .execute("GetCompanies", documents::GET_COMPANIES, serde_json::json!({}))
            .await?;
        companies_into_domain(data.companies).map_err(GatewayError::decode)
    }

    async fn company(&self, id: &CompanyId) -> Result<Option<Company>, GatewayError> {
        let variables = IdVariables { id: wire_id(id)? };
        let data: CompanyData = self
            .execute("GetCompany", documents::GET_COMPANY, variables)
            .await?;
        data.company
            .map(CompanyDto::into_domain)
            .transpose()
            .map_err(GatewayError::decode)
    }

    async fn interactions(
        &self,
        company_id: &CompanyId,
    ) -> Result<Vec<Interaction>, GatewayError> {
        let variables = CompanyIdVariables {
            company_id: wire_id(company_id)?,
        };
        let data: InteractionsData = self
            .execute("GetInteractions", documents::GET_INTERACTIONS, variables)
            .await?;
        interactions_into_domain(data.interactions).map_err(GatewayError::decode)
    }

    async fn create_company(&self, input: &NewCompany) -> Result<Company, GatewayError> {
        let variables = InputVariables {
            input: CreateCompanyInputDto::from(input),
        };
        let data: CreateCompanyData = self
            .execute("CreateCompany", documents::CREATE_COMPANY, variables)
            .await?;
        data.create_company
            .into_domain()
            .map_err(GatewayError::decode)
    }

    async fn update_company(
        &self,
        id: &CompanyId,
        patch: &CompanyPatch,
    ) -> Result<Company, GatewayError> {
        let variables = IdInputVariables {
            id: wire_id(id)?,
            input: UpdateCompanyInputDto::from(patch),
        };
        let data: UpdateCompanyData<CompanyDto> = self
            .execute("UpdateCompany", documents::UPDATE_COMPANY, variables)
            .await?;
        data.update_company
            .into_domain()
            .map_err(GatewayError::decode)
    }

    async fn update_company_status(
        &self,
        id: &CompanyId,
        status: CompanyStatus,
    ) -> Result<CompanyStatusAck, GatewayError> {
        let variables = IdInputVariables {
            id: wire_id(id)?,
            input: UpdateCompanyInputDto::status_only(status),
        };
        let data: UpdateCompanyData<CompanyStatusDto> = self
            .execute(
                "UpdateCompanyStatus",
                documents::UPDATE_COMPANY_STATUS,
                variables,
            )
            .await?;
        data.update_company
            .into_domain()
            .map_err(GatewayError::decode)
    }

    async fn delete_company(&self, id: &CompanyId) -> Result<bool, GatewayError> {
        let variables = IdVariables { id: wire_id(id)? };
        let data: DeleteCompanyData = self
            .execute("DeleteCompany", documents::DELETE_COMPANY, variables)
            .await?;
        Ok(data.delete_company)
    }

    async fn create_interaction(
        &self,
        company_id: &CompanyId,
        content: &InteractionContent,
    ) -> Result<Interaction, GatewayError> {
        let variables = CreateInteractionVariables {
            company_id: wire_id(company_id)?,
            content: content.as_str(),
        };
        let data: CreateInteractionData = self
            .execute("CreateInteraction", documents::CREATE_INTERACTION, variables)
            .await?;
        data.create_interaction
            .into_domain()
            .map_err(GatewayError::decode)
    }
}
