//! Client configuration loaded via OrthoConfig.
//!
//! Values come from CLI arguments, `CRM_*` environment variables and
//! configuration files, in OrthoConfig's usual precedence.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::{NoticeLocale, UnsupportedLocale};

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("graphql_base_url is required")]
    MissingBaseUrl,
    #[error("graphql_base_url '{value}' is not a valid URL: {source}")]
    InvalidBaseUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("graphql_base_url '{value}' must use http or https")]
    UnsupportedScheme { value: String },
    #[error("request_timeout_secs must be greater than zero")]
    ZeroTimeout,
    #[error(transparent)]
    Locale(#[from] UnsupportedLocale),
}

/// Settings for the CRM client and the `crm-sync` binary.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CRM")]
pub struct ClientSettings {
    /// Root URL of the CRM API; `/api/graphql` is appended.
    pub graphql_base_url: Option<String>,
    /// Per-request timeout in seconds.
    #[ortho_config(default = 30)]
    pub request_timeout_secs: u64,
    /// Locale for user-facing notices (`en` or `pt-BR`).
    pub notice_locale: Option<String>,
    /// Bearer token used to seed a session for headless runs.
    pub session_token: Option<String>,
}

impl ClientSettings {
    /// Parsed API base URL.
    ///
    /// # Errors
    ///
    /// Returns an error when the URL is missing, malformed, or not HTTP(S).
    pub fn graphql_base_url(&self) -> Result<Url, SettingsError> {
        let raw = self
            .graphql_base_url
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(SettingsError::MissingBaseUrl)?;
        let url = Url::parse(raw).map_err(|source| SettingsError::InvalidBaseUrl {
            value: raw.to_owned(),
            source,
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(SettingsError::UnsupportedScheme {
                value: raw.to_owned(),
            });
        }
        Ok(url)
    }

    /// Request timeout, 30 seconds unless configured.
    ///
    /// # Errors
    ///
    /// Returns an error when the configured timeout is zero.
    pub fn request_timeout(&self) -> Result<Duration, SettingsError> {
        match self.request_timeout_secs {
            0 => Err(SettingsError::ZeroTimeout),
            secs => Ok(Duration::from_secs(secs)),
        }
    }

    /// Notice locale, defaulting to English.
    ///
    /// # Errors
    ///
    /// Returns an error for locales without a notice catalogue.
    pub fn notice_locale(&self) -> Result<NoticeLocale, SettingsError> {
        self.notice_locale
            .as_deref()
            .map_or(Ok(NoticeLocale::default()), |raw| {
                raw.parse().map_err(SettingsError::from)
            })
    }

    /// Configured session token, ignoring blank values.
    pub fn session_token(&self) -> Option<&str> {
        self.session_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}
