//! Headless CRM client core.
//!
//! The crate keeps the company and interaction views of a mobile CRM
//! consistent with a remote GraphQL API. Screens call the
//! [`MutationCoordinator`], which applies optimistic local state, issues the
//! remote mutation, and then either reconciles the local query cache or rolls
//! the screen back.

pub mod config;
pub mod domain;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::{ClientSettings, SettingsError};
pub use domain::MutationCoordinator;
