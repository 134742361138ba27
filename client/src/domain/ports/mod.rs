//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod crm_gateway;
mod navigator;
mod notifier;
mod query_cache;
mod session_provider;

#[cfg(test)]
pub use crm_gateway::MockCrmGateway;
pub use crm_gateway::{CrmGateway, FixtureCrmGateway, GatewayError};
#[cfg(test)]
pub use navigator::MockNavigator;
pub use navigator::{Navigator, NoOpNavigator};
#[cfg(test)]
pub use notifier::MockNotifier;
pub use notifier::{Notifier, TracingNotifier};
pub use query_cache::{
    CacheEvent, CacheEventKind, QueryCache, QueryCacheError, QueryData, QueryKey,
};
#[cfg(test)]
pub use session_provider::MockSessionProvider;
pub use session_provider::SessionProvider;
