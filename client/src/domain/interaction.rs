//! Interaction notes attached to a company.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::company::CompanyId;

/// Server-assigned interaction identifier in canonical string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InteractionId(String);

impl InteractionId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<i64> for InteractionId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for InteractionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error raised when interaction text is blank after trimming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("interaction content must not be empty")]
pub struct EmptyInteractionContent;

/// Trimmed, non-empty note text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InteractionContent(String);

impl InteractionContent {
    /// Trim and validate note text.
    ///
    /// # Examples
    /// ```
    /// use crm_client::domain::InteractionContent;
    ///
    /// let content = InteractionContent::new("  called, left voicemail ").expect("text");
    /// assert_eq!(content.as_str(), "called, left voicemail");
    /// assert!(InteractionContent::new(" \n\t ").is_err());
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, EmptyInteractionContent> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(EmptyInteractionContent);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<InteractionContent> for String {
    fn from(value: InteractionContent) -> Self {
        value.0
    }
}

impl TryFrom<String> for InteractionContent {
    type Error = EmptyInteractionContent;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A logged note about contact with a company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    pub id: InteractionId,
    pub company_id: CompanyId,
    pub content: InteractionContent,
    pub created_at: DateTime<Utc>,
}

/// Insert `interaction` at the head of `list` unless an entry with the same
/// id is already present. Returns whether the list changed.
pub fn prepend_unique(list: &mut Vec<Interaction>, interaction: Interaction) -> bool {
    if list.iter().any(|existing| existing.id == interaction.id) {
        return false;
    }
    list.insert(0, interaction);
    true
}

/// Order interactions newest first. Ties keep their relative order.
pub fn sort_newest_first(list: &mut [Interaction]) {
    list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
