//! # Reactorcide HTTP Service
//!
//! The HTTP surface for the Reactorcide CI coordinator: webhook ingestion,
//! the job/project/secret/token/admin REST API, and the status reconciler
//! that is invoked after every job transition. See [`webhook_pipeline`] for
//! the request lifecycle of §4.J and [`reconciler`] for §4.K.

pub mod auth;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod memory;
pub mod metrics;
pub mod reconciler;
pub mod responses;
pub mod webhook_pipeline;

use crate::config::ServiceConfig;
use crate::memory::{
    ApiToken, InMemoryJobStore, InMemoryMasterKeyRepository, InMemoryObjectStore, InMemoryOrgKeyRepository,
    InMemoryProjectRegistry, InMemorySecretEntryRepository, InMemoryTokenStore, NoopDispatcherClient,
};
use axum::routing::{delete, get, post, put};
use axum::Router;
use reactorcide_core::dispatcher::DispatcherClient;
use reactorcide_core::job_store::JobStore;
use reactorcide_core::object_store::ObjectStore;
use reactorcide_core::project::ProjectRegistry;
use reactorcide_core::secrets::master_key::MasterKeyManager;
use reactorcide_core::secrets::SecretStore;
use reactorcide_providers::github::GithubAdapter;
use reactorcide_providers::gitlab::GitlabAdapter;
use reactorcide_providers::ProviderAdapter;
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// The concrete secret store type this service wires up. Exposed so binaries
/// embedding this crate (and tests) can construct one without repeating the
/// generic parameters.
pub type AppSecretStore =
    SecretStore<InMemoryMasterKeyRepository, InMemoryOrgKeyRepository, InMemorySecretEntryRepository>;

/// Shared, cloneable application state handed to every Axum handler.
#[derive(Clone)]
pub struct AppState {
    pub config: ServiceConfig,
    pub projects: Arc<dyn ProjectRegistry>,
    pub jobs: Arc<dyn JobStore>,
    pub object_store: Arc<dyn ObjectStore>,
    pub dispatcher: Arc<dyn DispatcherClient>,
    pub secrets: Arc<AppSecretStore>,
    pub providers: Arc<HashMap<&'static str, Arc<dyn ProviderAdapter>>>,
    pub tokens: Arc<InMemoryTokenStore>,
}

impl AppState {
    /// Build the default, in-memory-backed application state. Production
    /// deployments are expected to substitute relational/object-store
    /// implementations of the four core contracts; this wiring is what the
    /// binary uses out of the box and what the integration tests exercise.
    pub fn new_default(config: ServiceConfig) -> anyhow::Result<Self> {
        let env_keys = reactorcide_core::secrets::master_key::parse_master_keys_env(&config.master_keys_raw)?;
        let master_keys = MasterKeyManager::new(InMemoryMasterKeyRepository::default(), env_keys);
        let secrets = SecretStore::new(
            master_keys,
            InMemoryOrgKeyRepository::default(),
            InMemorySecretEntryRepository::default(),
        );

        let http_client = reqwest::Client::builder().timeout(std::time::Duration::from_secs(15)).build()?;

        let mut providers: HashMap<&'static str, Arc<dyn ProviderAdapter>> = HashMap::new();
        providers.insert("github", Arc::new(GithubAdapter::new(http_client.clone())));
        providers.insert("gitlab", Arc::new(GitlabAdapter::new(http_client)));

        Ok(Self {
            config,
            projects: Arc::new(InMemoryProjectRegistry::default()),
            jobs: Arc::new(InMemoryJobStore::default()),
            object_store: Arc::new(InMemoryObjectStore::default()),
            dispatcher: Arc::new(NoopDispatcherClient),
            secrets: Arc::new(secrets),
            providers: Arc::new(providers),
            tokens: Arc::new(InMemoryTokenStore::default()),
        })
    }

    pub fn bootstrap_admin_token(&self, token: &str, user_id: &str) {
        self.tokens.insert(ApiToken { token: token.to_string(), user_id: user_id.to_string(), is_admin: true });
    }
}

/// Build the full Axum router, mounted under `/api` and `/api/v1` per §6.
pub fn create_router(state: AppState) -> Router {
    let v1 = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/metrics", get(handlers::health::metrics))
        .route("/webhooks/{provider}", post(handlers::webhooks::receive))
        .route("/jobs", get(handlers::jobs::list).post(handlers::jobs::create))
        .route("/jobs/{id}", get(handlers::jobs::get).delete(handlers::jobs::delete))
        .route("/jobs/{id}/cancel", put(handlers::jobs::cancel))
        .route("/jobs/{id}/logs", get(handlers::jobs::logs))
        .route("/jobs/{id}/triggers", post(handlers::jobs::trigger))
        .route("/tokens", get(handlers::tokens::list).post(handlers::tokens::create))
        .route("/tokens/{id}", delete(handlers::tokens::revoke))
        .route("/projects", get(handlers::projects::list).post(handlers::projects::create))
        .route(
            "/projects/{id}",
            get(handlers::projects::get).put(handlers::projects::update).delete(handlers::projects::delete),
        )
        .route("/secrets/value", get(handlers::secrets::get_value).put(handlers::secrets::set_value).delete(handlers::secrets::delete_value))
        .route("/secrets", get(handlers::secrets::list_keys))
        .route("/secrets/paths", get(handlers::secrets::list_paths))
        .route("/secrets/init", post(handlers::secrets::init_org))
        .route("/secrets/batch/get", post(handlers::secrets::batch_get))
        .route("/secrets/batch/set", post(handlers::secrets::batch_set))
        .route(
            "/admin/secrets/master-keys",
            get(handlers::admin::list_master_keys).post(handlers::admin::register_master_key),
        )
        .route("/admin/secrets/master-keys/{name}/rotate", post(handlers::admin::rotate_master_key))
        .route("/admin/secrets/master-keys/{name}", delete(handlers::admin::decommission_master_key))
        .route("/admin/secrets/sync-primary", post(handlers::admin::sync_primary));

    Router::new()
        .route("/api/health", get(handlers::health::health))
        .nest("/api/v1", v1)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}


#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
