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

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::debug;

use smartmarket_core::Result;
use smartmarket_sparql::{SelectResults, SparqlExecutor};

use crate::backend::{backend_for, ReasonerBackend};
use crate::{Fingerprint, ReasonerKind};

#[derive(Debug, Clone)]
pub struct ReasonerAdapterConfig {
    pub kind: ReasonerKind,
    /// How long an inferred result set stays valid.
    pub cache_ttl: Duration,
    pub cache_capacity: u64,
}

impl Default for ReasonerAdapterConfig {
    fn default() -> Self {
        Self {
            kind: ReasonerKind::Pellet,
            cache_ttl: Duration::from_secs(300),
            cache_capacity: 1_000,
        }
    }
}

/// Runs inferred queries through the store's reasoner, memoizing
/// result sets by [`Fingerprint`]. `try_get_with` gives single-flight
/// semantics: of N concurrent misses for one key, exactly one reaches
/// the store.
pub struct ReasonerAdapter {
    executor: Arc<dyn SparqlExecutor>,
    backend: Box<dyn ReasonerBackend>,
    kind: ReasonerKind,
    cache: Cache<Fingerprint, Arc<SelectResults>>,
}

impl ReasonerAdapter {
    pub fn new(executor: Arc<dyn SparqlExecutor>, config: ReasonerAdapterConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.cache_capacity)
            .time_to_live(config.cache_ttl)
            .build();
        Self {
            executor,
            backend: backend_for(config.kind),
            kind: config.kind,
            cache,
        }
    }

    pub fn kind(&self) -> ReasonerKind {
        self.kind
    }

    /// Run a SELECT query with inference, serving from cache when the
    /// fingerprint is still live.
    pub async fn select_inferred(&self, query: &str) -> Result<Arc<SelectResults>> {
        let fingerprint = Fingerprint::new(query, self.kind);
        debug!(%fingerprint, reasoner = %self.kind, "inferred query requested");

        self.cache
            .try_get_with(fingerprint, async {
                let results = self.backend.infer(&self.executor, query).await?;
                Ok(Arc::new(results))
            })
            .await
            .map_err(|e: Arc<smartmarket_core::MarketError>| (*e).clone())
    }

    /// Drop every cached entailment, e.g. after the ontology changes.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Approximate number of live cached result sets. Moka maintains
    /// its internals lazily, so the count can briefly lag behind
    /// inserts; it is reported for observability, not bookkeeping.
    pub fn cached_entries(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Flush moka's pending housekeeping so `cached_entries` reflects
    /// every completed insert. Tests use this; production code treats
    /// the count as approximate.
    pub async fn sync_cache(&self) {
        self.cache.run_pending_tasks().await;
    }
}
