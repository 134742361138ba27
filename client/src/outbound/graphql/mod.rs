//! GraphQL outbound adapter.
//!
//! This module provides a thin HTTP implementation of the `CrmGateway` port.

mod documents;
mod dto;
mod http_gateway;

pub use http_gateway::GraphqlHttpGateway;
