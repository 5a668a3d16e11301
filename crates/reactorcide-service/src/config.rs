//! Service configuration: loaded from environment and an optional file,
//! mirroring the `reactorcide` environment variables of §6.

use reactorcide_core::allowlist::Allowlist;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Maximum accepted webhook body size, in bytes (§4.J.1).
    pub max_webhook_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_webhook_body_bytes: 5 * 1024 * 1024,
        }
    }
}

/// Service-wide configuration. Constructed once at startup.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub server: ServerConfig,

    /// `MASTER_KEYS` environment map: name -> 32 raw bytes.
    pub master_keys_raw: String,

    /// `CI_CODE_ALLOWLIST`.
    pub ci_allowlist: Allowlist,

    /// Global fallback VCS tokens, keyed by provider name (`"github"`,
    /// `"gitlab"`), used when a project has no `vcs_token_secret` or it
    /// fails to resolve.
    pub global_vcs_tokens: HashMap<String, String>,

    /// Global fallback webhook secrets, keyed by provider name. Used only
    /// when a project somehow resolves an empty secret (defense in depth;
    /// §4.J.4 treats an unresolvable project secret as a hard failure).
    pub global_webhook_secrets: HashMap<String, String>,

    /// `VCS_BASE_URL`, used to build job detail links embedded in commit
    /// statuses' `target_url`.
    pub vcs_base_url: String,
}

/// File-sourced overrides for [`ServerConfig`], layered under the
/// environment variables read by [`ServiceConfig::from_env`]. Optional; a
/// missing or absent file is not an error.
#[derive(Debug, Clone, Deserialize, Default)]
struct FileConfig {
    server: Option<ServerConfig>,
}

impl ServiceConfig {
    /// Build configuration from an optional TOML file merged with process
    /// environment variables. The file only supplies `[server]` defaults;
    /// every secret-bearing and security-relevant setting is read from the
    /// environment per §6, never from a file an operator might check in.
    pub fn load(file_path: Option<&str>) -> anyhow::Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = file_path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }
        let file: FileConfig = builder.build()?.try_deserialize().unwrap_or_default();

        let mut config = Self::from_env();
        if let Some(server) = file.server {
            config.server = server;
        }
        Ok(config)
    }

    /// Build configuration from process environment variables, per §6.
    pub fn from_env() -> Self {
        let master_keys_raw = std::env::var("MASTER_KEYS").unwrap_or_default();
        let ci_allowlist = Allowlist::from_comma_separated(&std::env::var("CI_CODE_ALLOWLIST").unwrap_or_default());
        let vcs_base_url = std::env::var("VCS_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());

        let mut global_vcs_tokens = HashMap::new();
        if let Ok(token) = std::env::var("REACTORCIDE_GITHUB_TOKEN") {
            global_vcs_tokens.insert("github".to_string(), token);
        }
        if let Ok(token) = std::env::var("REACTORCIDE_GITLAB_TOKEN") {
            global_vcs_tokens.insert("gitlab".to_string(), token);
        }

        let mut global_webhook_secrets = HashMap::new();
        if let Ok(secret) = std::env::var("REACTORCIDE_GITHUB_WEBHOOK_SECRET") {
            global_webhook_secrets.insert("github".to_string(), secret);
        }
        if let Ok(secret) = std::env::var("REACTORCIDE_GITLAB_WEBHOOK_SECRET") {
            global_webhook_secrets.insert("gitlab".to_string(), secret);
        }

        let mut server = ServerConfig::default();
        if let Ok(port) = std::env::var("PORT").and_then(|p| p.parse().map_err(|_| std::env::VarError::NotPresent)) {
            server.port = port;
        }

        Self {
            server,
            master_keys_raw,
            ci_allowlist,
            global_vcs_tokens,
            global_webhook_secrets,
            vcs_base_url,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
