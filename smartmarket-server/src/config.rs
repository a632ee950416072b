// Copyright 2025 SmartMarket Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use smartmarket_reasoner::ReasonerKind;

/// SmartMarket Server Configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: HttpServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub reasoner: ReasonerConfig,
    #[serde(default)]
    pub recommendation: RecommendationConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpServerConfig {
    /// HTTP API listen address (e.g., "127.0.0.1:8000")
    #[serde(default = "default_http_addr")]
    pub listen_addr: String,

    /// Enable CORS
    #[serde(default = "default_enable_cors")]
    pub enable_cors: bool,

    /// Allowed CORS origins (empty = allow all, use specific origins in production)
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Triple store base URL (e.g., "http://localhost:7200")
    #[serde(default = "default_store_endpoint")]
    pub endpoint: String,

    /// Repository name within the store
    #[serde(default = "default_repository")]
    pub repository: String,

    pub username: Option<String>,
    pub password: Option<String>,

    /// Per-query timeout in seconds
    #[serde(default = "default_query_timeout")]
    pub query_timeout_secs: u64,

    /// Hard cap on rows requested from the store
    #[serde(default = "default_max_results")]
    pub max_results: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReasonerConfig {
    /// Reasoner attached to the store: pellet, hermit or factpp
    #[serde(default)]
    pub kind: ReasonerKind,

    /// Enable inference for recommendation queries
    #[serde(default = "default_reasoner_enabled")]
    pub enabled: bool,

    /// Inferred result cache TTL in seconds
    #[serde(default = "default_reasoning_cache_ttl")]
    pub cache_ttl_secs: u64,
}

/// Reason-to-score weights. Only the ordering is contractual:
/// profile > budget > category > fallback.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecommendationConfig {
    #[serde(default = "default_profile_weight")]
    pub profile_weight: f64,

    #[serde(default = "default_budget_weight")]
    pub budget_weight: f64,

    #[serde(default = "default_category_weight")]
    pub category_weight: f64,

    #[serde(default = "default_fallback_weight")]
    pub fallback_weight: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaginationConfig {
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,

    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
}

// Default values
fn default_http_addr() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_enable_cors() -> bool {
    true
}

fn default_store_endpoint() -> String {
    "http://localhost:7200".to_string()
}

fn default_repository() -> String {
    "smartmarket".to_string()
}

fn default_query_timeout() -> u64 {
    30
}

fn default_max_results() -> u64 {
    1000
}

fn default_reasoner_enabled() -> bool {
    true
}

fn default_reasoning_cache_ttl() -> u64 {
    300
}

fn default_profile_weight() -> f64 {
    1.0
}

fn default_budget_weight() -> f64 {
    0.8
}

fn default_category_weight() -> f64 {
    0.6
}

fn default_fallback_weight() -> f64 {
    0.5
}

fn default_page_size() -> u64 {
    20
}

fn default_max_page_size() -> u64 {
    100
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_http_addr(),
            enable_cors: default_enable_cors(),
            cors_origins: vec![],
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            endpoint: default_store_endpoint(),
            repository: default_repository(),
            username: None,
            password: None,
            query_timeout_secs: default_query_timeout(),
            max_results: default_max_results(),
        }
    }
}

impl Default for ReasonerConfig {
    fn default() -> Self {
        Self {
            kind: ReasonerKind::default(),
            enabled: default_reasoner_enabled(),
            cache_ttl_secs: default_reasoning_cache_ttl(),
        }
    }
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            profile_weight: default_profile_weight(),
            budget_weight: default_budget_weight(),
            category_weight: default_category_weight(),
            fallback_weight: default_fallback_weight(),
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: HttpServerConfig::default(),
            store: StoreConfig::default(),
            reasoner: ReasonerConfig::default(),
            recommendation: RecommendationConfig::default(),
            pagination: PaginationConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from environment variables
    ///
    /// Supported environment variables:
    /// - SMARTMARKET_HTTP_ADDR: HTTP listen address (default: 127.0.0.1:8000)
    /// - SMARTMARKET_STORE_ENDPOINT: Triple store base URL (default: http://localhost:7200)
    /// - SMARTMARKET_REPOSITORY: Store repository name (default: smartmarket)
    /// - SMARTMARKET_STORE_USERNAME / SMARTMARKET_STORE_PASSWORD: Store credentials
    /// - SMARTMARKET_QUERY_TIMEOUT: Per-query timeout in seconds (default: 30)
    /// - SMARTMARKET_REASONER: Reasoner kind: pellet, hermit, factpp (default: pellet)
    /// - SMARTMARKET_REASONING_ENABLED: Enable inference (default: true)
    /// - SMARTMARKET_REASONING_CACHE_TTL: Inference cache TTL in seconds (default: 300)
    /// - SMARTMARKET_ENABLE_CORS: Enable CORS (default: true)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        // Server configuration
        if let Ok(addr) = std::env::var("SMARTMARKET_HTTP_ADDR") {
            config.server.listen_addr = addr;
        }

        if let Ok(cors) = std::env::var("SMARTMARKET_ENABLE_CORS") {
            config.server.enable_cors = cors.parse().unwrap_or(true);
        }

        // Store configuration
        if let Ok(endpoint) = std::env::var("SMARTMARKET_STORE_ENDPOINT") {
            config.store.endpoint = endpoint;
        }

        if let Ok(repository) = std::env::var("SMARTMARKET_REPOSITORY") {
            config.store.repository = repository;
        }

        if let Ok(username) = std::env::var("SMARTMARKET_STORE_USERNAME") {
            config.store.username = Some(username);
        }

        if let Ok(password) = std::env::var("SMARTMARKET_STORE_PASSWORD") {
            config.store.password = Some(password);
        }

        if let Ok(timeout) = std::env::var("SMARTMARKET_QUERY_TIMEOUT") {
            if let Ok(val) = timeout.parse() {
                config.store.query_timeout_secs = val;
            }
        }

        // Reasoner configuration
        if let Ok(kind) = std::env::var("SMARTMARKET_REASONER") {
            if let Ok(val) = kind.parse() {
                config.reasoner.kind = val;
            }
        }

        if let Ok(enabled) = std::env::var("SMARTMARKET_REASONING_ENABLED") {
            config.reasoner.enabled = enabled.parse().unwrap_or(true);
        }

        if let Ok(ttl) = std::env::var("SMARTMARKET_REASONING_CACHE_TTL") {
            if let Ok(val) = ttl.parse() {
                config.reasoner.cache_ttl_secs = val;
            }
        }

        config
    }

    /// Load configuration with priority: env > file > defaults
    pub fn load(config_file: Option<PathBuf>) -> Result<Self> {
        let mut config = if let Some(path) = config_file {
            if path.exists() {
                tracing::info!("Loading configuration from file: {:?}", path);
                Self::from_file(&path)?
            } else {
                tracing::warn!("Config file not found: {:?}, using defaults", path);
                Self::default()
            }
        } else {
            Self::default()
        };

        // Override with environment variables
        config = Self::merge_with_env(config);

        Ok(config)
    }

    /// Merge config with environment variables (env takes priority)
    fn merge_with_env(mut config: Self) -> Self {
        let env_config = Self::from_env();

        // Only override if env var was explicitly set
        if std::env::var("SMARTMARKET_HTTP_ADDR").is_ok() {
            config.server.listen_addr = env_config.server.listen_addr;
        }
        if std::env::var("SMARTMARKET_STORE_ENDPOINT").is_ok() {
            config.store.endpoint = env_config.store.endpoint;
        }
        if std::env::var("SMARTMARKET_REPOSITORY").is_ok() {
            config.store.repository = env_config.store.repository;
        }
        if std::env::var("SMARTMARKET_STORE_USERNAME").is_ok() {
            config.store.username = env_config.store.username;
        }
        if std::env::var("SMARTMARKET_STORE_PASSWORD").is_ok() {
            config.store.password = env_config.store.password;
        }
        if std::env::var("SMARTMARKET_QUERY_TIMEOUT").is_ok() {
            config.store.query_timeout_secs = env_config.store.query_timeout_secs;
        }
        if std::env::var("SMARTMARKET_REASONER").is_ok() {
            config.reasoner.kind = env_config.reasoner.kind;
        }
        if std::env::var("SMARTMARKET_REASONING_ENABLED").is_ok() {
            config.reasoner.enabled = env_config.reasoner.enabled;
        }
        if std::env::var("SMARTMARKET_REASONING_CACHE_TTL").is_ok() {
            config.reasoner.cache_ttl_secs = env_config.reasoner.cache_ttl_secs;
        }

        config
    }

    /// Parse listen address as SocketAddr
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(self.server.listen_addr.parse()?)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.store.query_timeout_secs)
    }

    pub fn reasoning_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.reasoner.cache_ttl_secs)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        // Validate socket address
        self.socket_addr()?;

        if self.store.endpoint.is_empty() || self.store.repository.is_empty() {
            anyhow::bail!("Store endpoint and repository must be configured");
        }

        if self.store.query_timeout_secs == 0 {
            anyhow::bail!("Query timeout must be greater than zero");
        }

        if self.pagination.default_page_size == 0
            || self.pagination.default_page_size > self.pagination.max_page_size
        {
            anyhow::bail!(
                "Default page size must be between 1 and max_page_size ({})",
                self.pagination.max_page_size
            );
        }

        let weights = &self.recommendation;
        for w in [
            weights.profile_weight,
            weights.budget_weight,
            weights.category_weight,
            weights.fallback_weight,
        ] {
            if !(0.0..=1.0).contains(&w) {
                anyhow::bail!("Recommendation weights must be in [0, 1]");
            }
        }
        if weights.profile_weight < weights.budget_weight
            || weights.budget_weight < weights.category_weight
            || weights.category_weight < weights.fallback_weight
        {
            anyhow::bail!(
                "Recommendation weights must be ordered: profile >= budget >= category >= fallback"
            );
        }

        Ok(())
    }
}
