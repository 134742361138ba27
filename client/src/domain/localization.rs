//! User-facing notice catalogue.
//!
//! Failures are never shown verbatim. The coordinator picks a [`NoticeKind`]
//! for the failed operation and renders it in the configured
//! [`NoticeLocale`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Locales the notice catalogue is translated into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoticeLocale {
    #[default]
    #[serde(rename = "en")]
    En,
    #[serde(rename = "pt-BR")]
    PtBr,
}

impl NoticeLocale {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::PtBr => "pt-BR",
        }
    }
}

impl fmt::Display for NoticeLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised when parsing an unsupported locale code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported notice locale '{locale}'")]
pub struct UnsupportedLocale {
    pub locale: String,
}

impl FromStr for NoticeLocale {
    type Err = UnsupportedLocale;

    /// Accepts `en`, `pt-BR` and their common spellings, case-insensitively.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "en" | "en-us" | "en-gb" => Ok(Self::En),
            "pt" | "pt-br" => Ok(Self::PtBr),
            _ => Err(UnsupportedLocale {
                locale: value.to_owned(),
            }),
        }
    }
}

/// Situations that produce a user-visible notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeKind {
    SignInRequired,
    EmptyCompanyName,
    InvalidCompanyInput,
    NothingToSave,
    EmptyInteraction,
    InteractionAlreadySending,
    StatusUpdateFailed,
    DeleteFailed,
    InteractionFailed,
    CreateCompanyFailed,
    EditCompanyFailed,
    LoadCompaniesFailed,
    LoadCompanyFailed,
    LoadInteractionsFailed,
}

/// Localised title and message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserNotice {
    pub title: String,
    pub message: String,
}

impl UserNotice {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }

    /// Render `kind` in `locale`.
    ///
    /// # Examples
    /// ```
    /// use crm_client::domain::{NoticeKind, NoticeLocale, UserNotice};
    ///
    /// let notice = UserNotice::localized(NoticeKind::InteractionFailed, NoticeLocale::PtBr);
    /// assert_eq!(notice.title, "Erro");
    /// assert_eq!(
    ///     notice.message,
    ///     "Não foi possível enviar a interação. Tente novamente."
    /// );
    /// ```
    pub fn localized(kind: NoticeKind, locale: NoticeLocale) -> Self {
        let (title, message) = match locale {
            NoticeLocale::En => english(kind),
            NoticeLocale::PtBr => portuguese(kind),
        };
        Self::new(title, message)
    }
}

fn english(kind: NoticeKind) -> (&'static str, &'static str) {
    let message = match kind {
        NoticeKind::SignInRequired => "Sign in to see your companies.",
        NoticeKind::EmptyCompanyName => "Please enter the company name.",
        NoticeKind::InvalidCompanyInput => "Some company details are invalid. Check the form.",
        NoticeKind::NothingToSave => "There are no changes to save.",
        NoticeKind::EmptyInteraction => "Write something before sending.",
        NoticeKind::InteractionAlreadySending => "The previous interaction is still being sent.",
        NoticeKind::StatusUpdateFailed => "Could not update the company status. Try again.",
        NoticeKind::DeleteFailed => "Could not delete the company. Try again.",
        NoticeKind::InteractionFailed => "Could not send the interaction. Try again.",
        NoticeKind::CreateCompanyFailed => "Could not create the company. Try again.",
        NoticeKind::EditCompanyFailed => "Could not save the company. Try again.",
        NoticeKind::LoadCompaniesFailed => "An error occurred while loading the companies.",
        NoticeKind::LoadCompanyFailed => "An error occurred while loading the company.",
        NoticeKind::LoadInteractionsFailed => "An error occurred while loading the interactions.",
    };
    ("Error", message)
}

fn portuguese(kind: NoticeKind) -> (&'static str, &'static str) {
    let message = match kind {
        NoticeKind::SignInRequired => "Faça login para ver suas empresas.",
        NoticeKind::EmptyCompanyName => "Por favor, informe o nome da empresa.",
        NoticeKind::InvalidCompanyInput => "Alguns dados da empresa são inválidos. Verifique o formulário.",
        NoticeKind::NothingToSave => "Não há alterações para salvar.",
        NoticeKind::EmptyInteraction => "Escreva algo antes de enviar.",
        NoticeKind::InteractionAlreadySending => "A interação anterior ainda está sendo enviada.",
        NoticeKind::StatusUpdateFailed => {
            "Não foi possível atualizar o status da empresa. Tente novamente."
        }
        NoticeKind::DeleteFailed => "Não foi possível excluir a empresa. Tente novamente.",
        NoticeKind::InteractionFailed => "Não foi possível enviar a interação. Tente novamente.",
        NoticeKind::CreateCompanyFailed => "Não foi possível criar a empresa. Tente novamente.",
        NoticeKind::EditCompanyFailed => "Não foi possível salvar a empresa. Tente novamente.",
        NoticeKind::LoadCompaniesFailed => "Ocorreu um erro ao carregar as empresas.",
        NoticeKind::LoadCompanyFailed => "Ocorreu um erro ao carregar a empresa.",
        NoticeKind::LoadInteractionsFailed => "Ocorreu um erro ao carregar as interações.",
    };
    ("Erro", message)
}
