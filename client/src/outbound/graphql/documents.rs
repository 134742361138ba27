//! GraphQL documents sent to the CRM API.

macro_rules! company_fields {
    () => {
        "id name status website phone primaryContactName primaryContactEmail potentialValue leadSource userId"
    };
}

pub(super) const GET_COMPANIES: &str =
    concat!("query GetCompanies { companies { ", company_fields!(), " } }");

pub(super) const GET_COMPANY: &str = concat!(
    "query GetCompany($id: Int!) { company(id: $id) { ",
    company_fields!(),
    " } }"
);

pub(super) const GET_INTERACTIONS: &str = "query GetInteractions($companyId: Int!) { \
     interactions(companyId: $companyId) { id content companyId createdAt } }";

pub(super) const CREATE_COMPANY: &str = concat!(
    "mutation CreateCompany($input: CreateCompanyInput!) { createCompany(input: $input) { ",
    company_fields!(),
    " } }"
);

pub(super) const UPDATE_COMPANY: &str = concat!(
    "mutation UpdateCompany($id: Int!, $input: UpdateCompanyInput!) { ",
    "updateCompany(id: $id, input: $input) { ",
    company_fields!(),
    " } }"
);

/// Status-only edit; the selection is just `{id status}`.
pub(super) const UPDATE_COMPANY_STATUS: &str = "mutation UpdateCompanyStatus($id: Int!, \
     $input: UpdateCompanyInput!) { updateCompany(id: $id, input: $input) { id status } }";

pub(super) const DELETE_COMPANY: &str =
    "mutation DeleteCompany($id: Int!) { deleteCompany(id: $id) }";

pub(super) const CREATE_INTERACTION: &str = "mutation CreateInteraction($companyId: Int!, \
     $content: String!) { createInteraction(companyId: $companyId, content: $content) { \
     id content companyId createdAt } }";
