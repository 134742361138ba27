//! Authenticated session state.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Opaque bearer credential. The backing memory is wiped on drop and the
/// value never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(Zeroizing<String>);

impl BearerToken {
    /// Wrap a token, returning `None` when it is blank.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(Zeroizing::new(trimmed.to_owned())))
    }

    /// Borrow the raw token for use in request headers.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

/// Signed-in user profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
}

/// An active session: who is signed in and the credential used for requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: BearerToken,
    pub user: Option<SessionUser>,
}

impl Session {
    pub fn new(token: BearerToken) -> Self {
        Self { token, user: None }
    }

    #[must_use]
    pub fn with_user(mut self, user: SessionUser) -> Self {
        self.user = Some(user);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn blank_tokens_are_rejected() {
        assert!(BearerToken::new("  ").is_none());
    }

    #[rstest]
    fn debug_output_redacts_the_token() {
        let token = BearerToken::new("secret-value").expect("token");
        let session = Session::new(token);
        let rendered = format!("{session:?}");
        assert!(!rendered.contains("secret-value"));
        assert!(rendered.contains("<redacted>"));
    }

    #[rstest]
    fn expose_returns_trimmed_token() {
        let token = BearerToken::new(" abc ").expect("token");
        assert_eq!(token.expose(), "abc");
    }
}
