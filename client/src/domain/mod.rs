//! Domain model, ports and the optimistic mutation coordinator.
//!
//! Everything here is transport agnostic. Adapters under `outbound` implement
//! the ports; screens hold the state types from [`screen`] and drive changes
//! through [`MutationCoordinator`].

pub mod company;
pub mod coordinator;
pub mod error;
pub mod interaction;
pub mod localization;
pub mod ports;
pub mod screen;
pub mod session;

pub use self::company::{
    Company, CompanyDraft, CompanyId, CompanyName, CompanyPatch, CompanyStatus, CompanyStatusAck,
    CompanyValidationError, LeadSource, NewCompany, PotentialValue,
};
pub use self::coordinator::{
    CoordinatorPorts, MutationCoordinator, MutationOutcome, PresentationPorts,
};
pub use self::error::{Error, ErrorCode};
pub use self::interaction::{
    EmptyInteractionContent, Interaction, InteractionContent, InteractionId, prepend_unique,
    sort_newest_first,
};
pub use self::localization::{NoticeKind, NoticeLocale, UnsupportedLocale, UserNotice};
pub use self::screen::{
    BusyFlag, CompanyDetailState, CompanyListState, DetailView, InteractionComposer,
    MutationPhase,
};
pub use self::session::{BearerToken, Session, SessionUser};
