//! Test utilities for the client crate.
//!
//! This module provides shared helpers for both unit tests (in `src/`) and
//! integration tests (in `tests/`). It is only compiled for tests or with the
//! `test-support` feature.

pub mod presentation;
pub mod scripted_gateway;

use chrono::{TimeZone, Utc};

use crate::domain::{
    Company, CompanyId, CompanyName, CompanyStatus, Interaction, InteractionContent, InteractionId,
};

/// Build a company with default optional fields.
///
/// # Examples
///
/// ```rust
/// use crm_client::domain::CompanyStatus;
/// use crm_client::test_support::company;
///
/// let acme = company(1, "Acme", CompanyStatus::Lead);
/// assert_eq!(acme.id.as_str(), "1");
/// ```
pub fn company(id: i64, name: &str, status: CompanyStatus) -> Company {
    let name = match CompanyName::new(name) {
        Ok(name) => name,
        Err(error) => panic!("fixture company name: {error}"),
    };
    Company::new(CompanyId::from(id), name, status)
}

/// Build an interaction created `millis` after the epoch.
pub fn interaction(id: i64, company_id: i64, content: &str, millis: i64) -> Interaction {
    let content = match InteractionContent::new(content) {
        Ok(content) => content,
        Err(error) => panic!("fixture interaction content: {error}"),
    };
    let Some(created_at) = Utc.timestamp_millis_opt(millis).single() else {
        panic!("fixture timestamp out of range: {millis}");
    };
    Interaction {
        id: InteractionId::from(id),
        company_id: CompanyId::from(company_id),
        content,
        created_at,
    }
}
