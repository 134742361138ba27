//! Port for the local reactive query cache.
//!
//! Entries are keyed by the query that produced them. Writers replace or
//! modify whole entries; subscribers receive a [`CacheEvent`] for every
//! change so screens can re-read the keys they render.

use tokio::sync::broadcast;

use super::define_port_error;
use crate::domain::{Company, CompanyId, Interaction};

/// Identifies a cached query result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// `companies` list query.
    Companies,
    /// `company(id)` detail query.
    Company(CompanyId),
    /// `interactions(companyId)` list query, newest first.
    Interactions(CompanyId),
}

impl QueryKey {
    /// True when `data` has the shape this key's query returns.
    pub fn accepts(&self, data: &QueryData) -> bool {
        matches!(
            (self, data),
            (Self::Companies, QueryData::Companies(_))
                | (Self::Company(_), QueryData::Company(_))
                | (Self::Interactions(_), QueryData::Interactions(_))
        )
    }

    /// Short label used in log fields.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Companies => "companies",
            Self::Company(_) => "company",
            Self::Interactions(_) => "interactions",
        }
    }
}

/// Cached query payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryData {
    Companies(Vec<Company>),
    Company(Option<Company>),
    Interactions(Vec<Interaction>),
}

/// What happened to a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheEventKind {
    Written,
    Evicted,
    Cleared,
}

/// Change notification broadcast to cache subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEvent {
    /// Affected key; `None` for [`CacheEventKind::Cleared`].
    pub key: Option<QueryKey>,
    pub kind: CacheEventKind,
}

define_port_error! {
    /// Errors raised by query cache adapters.
    pub enum QueryCacheError {
        /// The payload does not match the query the key names.
        ShapeMismatch { key: String } => "cache entry shape does not match key {key}",
    }
}

/// Keyed store of query results.
///
/// Implementations must apply each call atomically with respect to other
/// calls and must not hold internal locks while invoking subscribers.
pub trait QueryCache: Send + Sync {
    fn read(&self, key: &QueryKey) -> Option<QueryData>;

    /// Replace the entry for `key`.
    fn write(&self, key: QueryKey, data: QueryData) -> Result<(), QueryCacheError>;

    /// Modify the entry for `key` in place if it exists.
    ///
    /// `modify` returns whether it changed anything; the result is `true`
    /// only when an entry existed and was changed. Absent entries are left
    /// absent.
    fn update(
        &self,
        key: &QueryKey,
        modify: &mut dyn FnMut(&mut QueryData) -> bool,
    ) -> Result<bool, QueryCacheError>;

    /// Keys currently present.
    fn keys(&self) -> Vec<QueryKey>;

    /// Remove the entry for `key`, returning whether it existed.
    fn evict(&self, key: &QueryKey) -> bool;

    /// Drop every entry.
    fn clear(&self);

    fn subscribe(&self) -> broadcast::Receiver<CacheEvent>;
}
