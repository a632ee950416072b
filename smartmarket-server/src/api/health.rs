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

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use serde_json::json;

use super::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub store: &'static str,
    pub catalog: CatalogHealth,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoner: Option<ReasonerHealth>,
}

#[derive(Debug, Serialize)]
pub struct CatalogHealth {
    pub loaded: bool,
    pub categories: usize,
}

#[derive(Debug, Serialize)]
pub struct ReasonerHealth {
    pub kind: String,
    /// Approximate; the cache maintains its count lazily.
    pub cached_entries: u64,
}

/// Service banner at the root.
pub async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "service": "smartmarket",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let liveness = state
        .executor
        .select("SELECT ?s WHERE { ?s ?p ?o } LIMIT 1")
        .await;
    let store = if liveness.is_ok() { "ok" } else { "unreachable" };
    let status = if liveness.is_ok() { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        store,
        catalog: CatalogHealth {
            loaded: state.catalog.is_loaded(),
            categories: state.catalog.len(),
        },
        reasoner: state.reasoner.as_ref().map(|adapter| ReasonerHealth {
            kind: adapter.kind().to_string(),
            cached_entries: adapter.cached_entries(),
        }),
    })
}
