//! Company (sales lead) data model.
//!
//! Companies move through a four-column pipeline. Identity is the canonical
//! string form of the server id; the gateway converts to and from the wire
//! integer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Validation errors returned by the company value constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompanyValidationError {
    EmptyId,
    EmptyName,
    NegativePotentialValue { value: i64 },
    PotentialValueTooLarge { max: i64 },
    UnknownStatus { value: String },
    UnknownLeadSource { value: String },
    EmptyPatch,
}

impl fmt::Display for CompanyValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "company id must not be empty"),
            Self::EmptyName => write!(f, "company name must not be empty"),
            Self::NegativePotentialValue { value } => {
                write!(f, "potential value must not be negative (got {value})")
            }
            Self::PotentialValueTooLarge { max } => {
                write!(f, "potential value must be at most {max}")
            }
            Self::UnknownStatus { value } => write!(f, "unknown company status '{value}'"),
            Self::UnknownLeadSource { value } => write!(f, "unknown lead source '{value}'"),
            Self::EmptyPatch => write!(f, "company edit must change at least one field"),
        }
    }
}

impl std::error::Error for CompanyValidationError {}

/// Stable company identifier in canonical string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CompanyId(String);

impl CompanyId {
    /// Validate and construct a [`CompanyId`].
    ///
    /// # Examples
    /// ```
    /// use crm_client::domain::CompanyId;
    ///
    /// let id = CompanyId::new(" 42 ").expect("valid id");
    /// assert_eq!(id.as_str(), "42");
    /// assert!(CompanyId::new("  ").is_err());
    /// ```
    pub fn new(raw: impl Into<String>) -> Result<Self, CompanyValidationError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CompanyValidationError::EmptyId);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the canonical string form.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<i64> for CompanyId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for CompanyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CompanyId> for String {
    fn from(value: CompanyId) -> Self {
        value.0
    }
}

impl TryFrom<String> for CompanyId {
    type Error = CompanyValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Company display name, stored trimmed and never blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CompanyName(String);

impl CompanyName {
    /// Validate and construct a [`CompanyName`].
    pub fn new(raw: impl Into<String>) -> Result<Self, CompanyValidationError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CompanyValidationError::EmptyName);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CompanyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CompanyName> for String {
    fn from(value: CompanyName) -> Self {
        value.0
    }
}

impl TryFrom<String> for CompanyName {
    type Error = CompanyValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Pipeline status of a company.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanyStatus {
    #[default]
    Lead,
    Negotiating,
    Won,
    Lost,
}

impl CompanyStatus {
    /// Pipeline columns in board order.
    pub const ALL: [Self; 4] = [Self::Lead, Self::Negotiating, Self::Won, Self::Lost];

    /// Wire and storage form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lead => "lead",
            Self::Negotiating => "negotiating",
            Self::Won => "won",
            Self::Lost => "lost",
        }
    }

    /// Column heading shown on the pipeline board.
    pub fn label(self) -> &'static str {
        match self {
            Self::Lead => "Lead",
            Self::Negotiating => "Negotiating",
            Self::Won => "Won",
            Self::Lost => "Lost",
        }
    }

    /// Badge colour of the pipeline column, as a `#rrggbb` string.
    pub fn column_color(self) -> &'static str {
        match self {
            Self::Lead => "#848484",
            Self::Negotiating => "#f59e0b",
            Self::Won => "#10b981",
            Self::Lost => "#ef4444",
        }
    }
}

impl fmt::Display for CompanyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompanyStatus {
    type Err = CompanyValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == value.trim())
            .ok_or_else(|| CompanyValidationError::UnknownStatus {
                value: value.to_owned(),
            })
    }
}

/// Channel through which the lead arrived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadSource {
    Website,
    Referral,
    ColdCall,
    #[default]
    Other,
}

impl LeadSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Website => "website",
            Self::Referral => "referral",
            Self::ColdCall => "cold_call",
            Self::Other => "other",
        }
    }
}

impl FromStr for LeadSource {
    type Err = CompanyValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        [Self::Website, Self::Referral, Self::ColdCall, Self::Other]
            .into_iter()
            .find(|source| source.as_str() == value.trim())
            .ok_or_else(|| CompanyValidationError::UnknownLeadSource {
                value: value.to_owned(),
            })
    }
}

/// Expected deal value. The server stores it as a 32-bit `Int`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct PotentialValue(u32);

impl PotentialValue {
    /// Largest value the server accepts.
    pub const MAX: i64 = i32::MAX as i64;

    /// Validate and construct a [`PotentialValue`].
    pub fn new(value: i64) -> Result<Self, CompanyValidationError> {
        if value < 0 {
            return Err(CompanyValidationError::NegativePotentialValue { value });
        }
        u32::try_from(value)
            .ok()
            .filter(|_| value <= Self::MAX)
            .map(Self)
            .ok_or(CompanyValidationError::PotentialValueTooLarge { max: Self::MAX })
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl From<PotentialValue> for i64 {
    fn from(value: PotentialValue) -> Self {
        i64::from(value.0)
    }
}

impl TryFrom<i64> for PotentialValue {
    type Error = CompanyValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A company as returned by the gateway and held in the query cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: CompanyId,
    pub name: CompanyName,
    pub status: CompanyStatus,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub primary_contact_name: Option<String>,
    pub primary_contact_email: Option<String>,
    pub potential_value: PotentialValue,
    pub lead_source: LeadSource,
    /// Owning user, when the server reports it.
    pub user_id: Option<String>,
}

impl Company {
    /// Minimal company with defaults for every optional field.
    pub fn new(id: CompanyId, name: CompanyName, status: CompanyStatus) -> Self {
        Self {
            id,
            name,
            status,
            website: None,
            phone: None,
            primary_contact_name: None,
            primary_contact_email: None,
            potential_value: PotentialValue::default(),
            lead_source: LeadSource::default(),
            user_id: None,
        }
    }

    /// Return a copy with the status replaced.
    #[must_use]
    pub fn with_status(mut self, status: CompanyStatus) -> Self {
        self.status = status;
        self
    }
}

/// Server acknowledgement of a status change: the partial `{id, status}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyStatusAck {
    pub id: CompanyId,
    pub status: CompanyStatus,
}

/// Unvalidated form input for a new company.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyDraft {
    pub name: String,
    pub status: Option<CompanyStatus>,
    pub website: String,
    pub phone: String,
    pub primary_contact_name: String,
    pub primary_contact_email: String,
    pub potential_value: Option<i64>,
    pub lead_source: Option<LeadSource>,
}

impl CompanyDraft {
    /// Start a draft with only a name filled in.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Validate the draft. Blank optional text fields become absent; status
    /// defaults to `lead` and the lead source to `other`.
    ///
    /// # Examples
    /// ```
    /// use crm_client::domain::{CompanyDraft, CompanyStatus, LeadSource};
    ///
    /// let mut draft = CompanyDraft::named("  Acme  ");
    /// draft.website = "   ".to_owned();
    /// let company = draft.validate().expect("valid draft");
    /// assert_eq!(company.name.as_str(), "Acme");
    /// assert_eq!(company.website, None);
    /// assert_eq!(company.status, CompanyStatus::Lead);
    /// assert_eq!(company.lead_source, LeadSource::Other);
    /// ```
    pub fn validate(&self) -> Result<NewCompany, CompanyValidationError> {
        let name = CompanyName::new(self.name.as_str())?;
        let potential_value = self.potential_value.map(PotentialValue::new).transpose()?;
        Ok(NewCompany {
            name,
            status: self.status.unwrap_or_default(),
            website: non_blank(&self.website),
            phone: non_blank(&self.phone),
            primary_contact_name: non_blank(&self.primary_contact_name),
            primary_contact_email: non_blank(&self.primary_contact_email),
            potential_value,
            lead_source: self.lead_source.unwrap_or_default(),
        })
    }
}

/// Validated input for the `createCompany` mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCompany {
    pub name: CompanyName,
    pub status: CompanyStatus,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub primary_contact_name: Option<String>,
    pub primary_contact_email: Option<String>,
    pub potential_value: Option<PotentialValue>,
    pub lead_source: LeadSource,
}

/// Partial edit sent through `updateCompany`. Absent fields are left as they
/// are on the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyPatch {
    pub name: Option<CompanyName>,
    pub status: Option<CompanyStatus>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub primary_contact_name: Option<String>,
    pub primary_contact_email: Option<String>,
    pub potential_value: Option<PotentialValue>,
    pub lead_source: Option<LeadSource>,
}

impl CompanyPatch {
    /// True when the patch would not change anything.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Reject empty patches.
    pub fn ensure_not_empty(&self) -> Result<(), CompanyValidationError> {
        if self.is_empty() {
            Err(CompanyValidationError::EmptyPatch)
        } else {
            Ok(())
        }
    }
}

fn non_blank(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}
