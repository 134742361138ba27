//! `crm-sync`: load the signed-in user's companies and report the pipeline.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::collections::BTreeMap;
use std::sync::Arc;

use color_eyre::eyre::{Context, Result, eyre};
use crm_client::ClientSettings;
use crm_client::domain::{
    BearerToken, CompanyStatus, CoordinatorPorts, MutationCoordinator, Session,
};
use crm_client::outbound::cache::InMemoryQueryCache;
use crm_client::outbound::graphql::GraphqlHttpGateway;
use crm_client::outbound::session::WatchSessionProvider;
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ClientSettings::load_from_iter(std::env::args_os())
        .map_err(|error| eyre!("failed to load CRM settings: {error}"))?;
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build crm-sync runtime")?;
    runtime.block_on(run(settings))
}

async fn run(settings: ClientSettings) -> Result<()> {
    let base_url = settings.graphql_base_url()?;
    let timeout = settings.request_timeout()?;
    let locale = settings.notice_locale()?;
    let token = settings
        .session_token()
        .and_then(BearerToken::new)
        .ok_or_else(|| eyre!("session_token is required to sync companies"))?;

    let sessions = Arc::new(WatchSessionProvider::with_session(Session::new(token)));
    let gateway = GraphqlHttpGateway::new(&base_url, timeout, sessions.clone())
        .map_err(|error| eyre!("failed to build GraphQL gateway: {error}"))?;
    info!(endpoint = %gateway.endpoint(), "syncing companies");

    let coordinator = MutationCoordinator::new(CoordinatorPorts {
        gateway: Arc::new(gateway),
        cache: Arc::new(InMemoryQueryCache::new()),
        sessions,
    })
    .with_locale(locale);

    let companies = coordinator
        .load_companies()
        .await
        .map_err(|error| eyre!("failed to load companies: {error}"))?;

    let mut per_status: BTreeMap<&'static str, usize> = CompanyStatus::ALL
        .into_iter()
        .map(|status| (status.label(), 0))
        .collect();
    for company in &companies {
        *per_status.entry(company.status.label()).or_default() += 1;
    }
    for (status, count) in &per_status {
        info!(status, count, "pipeline column");
    }
    info!(total = companies.len(), "companies synced");
    Ok(())
}
