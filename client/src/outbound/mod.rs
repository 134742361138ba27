//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **graphql**: `reqwest`-backed client for the CRM GraphQL API
//! - **cache**: in-process query cache with broadcast change events
//! - **session**: `watch`-backed holder for the current session
//!
//! Adapters are thin translators between domain types and transport
//! representations. They contain no business logic.

pub mod cache;
pub mod graphql;
pub mod session;
