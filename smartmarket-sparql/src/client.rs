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

//! HTTP client for a GraphDB-compatible SPARQL endpoint.
//!
//! Queries are POSTed as `application/sparql-query` to
//! `{endpoint}/repositories/{repository}` and results are requested as
//! `application/sparql-results+json`. Transient failures (connect
//! errors, timeouts, 5xx) are retried once after a short backoff.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use tracing::{debug, warn};

use smartmarket_core::{MarketError, Result};

use crate::queries::with_prefixes;
use crate::results::SelectResults;

const SPARQL_QUERY_CONTENT_TYPE: &str = "application/sparql-query";
const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// Executes SELECT queries against a triple store. The trait is the
/// seam the services program against; tests substitute an in-memory
/// implementation.
#[async_trait]
pub trait SparqlExecutor: Send + Sync {
    /// Run a SELECT query without inference.
    async fn select(&self, query: &str) -> Result<SelectResults>;

    /// Run a SELECT query with reasoner inference enabled.
    async fn select_inferred(&self, query: &str) -> Result<SelectResults>;
}

#[derive(Debug, Clone)]
pub struct SparqlClientConfig {
    /// Base URL of the store, e.g. `http://localhost:7200`.
    pub endpoint: String,
    pub repository: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout: Duration,
    /// Delay before the single retry of a transient failure.
    pub retry_backoff: Duration,
}

impl Default for SparqlClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:7200".to_string(),
            repository: "smartmarket".to_string(),
            username: None,
            password: None,
            timeout: Duration::from_secs(30),
            retry_backoff: Duration::from_millis(250),
        }
    }
}

pub struct SparqlClient {
    http: reqwest::Client,
    config: SparqlClientConfig,
    query_url: String,
}

impl SparqlClient {
    pub fn new(config: SparqlClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| MarketError::UpstreamUnavailable(e.to_string()))?;
        let query_url = format!(
            "{}/repositories/{}",
            config.endpoint.trim_end_matches('/'),
            config.repository
        );
        Ok(Self {
            http,
            config,
            query_url,
        })
    }

    pub fn repository(&self) -> &str {
        &self.config.repository
    }

    /// Cheap liveness check used by the health endpoint.
    pub async fn ping(&self) -> Result<()> {
        self.select("SELECT ?s WHERE { ?s ?p ?o } LIMIT 1")
            .await
            .map(|_| ())
    }

    async fn execute(&self, query: &str, infer: bool) -> Result<SelectResults> {
        let query = with_prefixes(query);
        match self.send(&query, infer).await {
            Err(e) if e.is_transient() => {
                warn!(error = %e, "sparql request failed, retrying once");
                tokio::time::sleep(self.config.retry_backoff).await;
                self.send(&query, infer).await
            }
            other => other,
        }
    }

    async fn send(&self, query: &str, infer: bool) -> Result<SelectResults> {
        debug!(url = %self.query_url, infer, bytes = query.len(), "executing sparql query");

        let mut request = self
            .http
            .post(&self.query_url)
            .header(CONTENT_TYPE, SPARQL_QUERY_CONTENT_TYPE)
            .header(ACCEPT, SPARQL_RESULTS_JSON)
            .query(&[("infer", if infer { "true" } else { "false" })])
            .body(query.to_string());
        if let Some(username) = &self.config.username {
            request = request.basic_auth(username, self.config.password.as_deref());
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() || e.is_connect() {
                MarketError::UpstreamUnavailable(e.to_string())
            } else {
                MarketError::QueryError(e.to_string())
            }
        })?;

        // Response bodies go to the log only; error messages travel to
        // API clients and must not carry upstream text.
        let status = response.status();
        if status.is_server_error() || status == StatusCode::SERVICE_UNAVAILABLE {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, body = %body, "store returned a server error");
            return Err(MarketError::UpstreamUnavailable(format!(
                "store returned {status}"
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, body = %body, "store rejected the query");
            return Err(MarketError::QueryError(format!(
                "store rejected query ({status})"
            )));
        }

        response.json::<SelectResults>().await.map_err(|e| {
            warn!(error = %e, "store sent an unparseable results document");
            MarketError::QueryError("malformed results document from store".to_string())
        })
    }
}

#[async_trait]
impl SparqlExecutor for SparqlClient {
    async fn select(&self, query: &str) -> Result<SelectResults> {
        self.execute(query, false).await
    }

    async fn select_inferred(&self, query: &str) -> Result<SelectResults> {
        self.execute(query, true).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::extract::Query;
    // Shadows the reqwest header constant from the glob import above;
    // axum responses need the http 1.x header type.
    use axum::http::header::CONTENT_TYPE;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::post;
    use axum::Router;

    const EMPTY_RESULTS: &str = r#"{"head":{"vars":["s"]},"results":{"bindings":[]}}"#;

    #[derive(serde::Deserialize)]
    struct InferParam {
        infer: String,
    }

    async fn spawn_store(router: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }

    fn client_for(addr: SocketAddr) -> SparqlClient {
        SparqlClient::new(SparqlClientConfig {
            endpoint: format!("http://{addr}"),
            repository: "test".to_string(),
            timeout: Duration::from_secs(2),
            retry_backoff: Duration::from_millis(10),
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn posts_to_the_repository_path_with_infer_param() {
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_handler = seen.clone();
        let router = Router::new().route(
            "/repositories/test",
            post(
                move |Query(params): Query<InferParam>, body: String| async move {
                    assert_eq!(params.infer, "true");
                    assert!(body.contains("PREFIX sc:"));
                    seen_handler.fetch_add(1, Ordering::SeqCst);
                    ([(CONTENT_TYPE, SPARQL_RESULTS_JSON)], EMPTY_RESULTS)
                },
            ),
        );
        let addr = spawn_store(router).await;

        let results = client_for(addr)
            .select_inferred("SELECT ?s WHERE { ?s ?p ?o }")
            .await
            .unwrap();
        assert!(results.is_empty());
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_a_transient_failure_exactly_once() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let router = Router::new().route(
            "/repositories/test",
            post({
                let attempts = attempts.clone();
                move || {
                    let attempts = attempts.clone();
                    async move {
                        if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                            StatusCode::SERVICE_UNAVAILABLE.into_response()
                        } else {
                            ([(CONTENT_TYPE, SPARQL_RESULTS_JSON)], EMPTY_RESULTS)
                                .into_response()
                        }
                    }
                }
            }),
        );
        let addr = spawn_store(router).await;

        client_for(addr)
            .select("SELECT ?s WHERE { ?s ?p ?o }")
            .await
            .unwrap();
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn a_bad_request_is_a_query_error_and_not_retried() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let router = Router::new().route(
            "/repositories/test",
            post({
                let attempts = attempts.clone();
                move || {
                    let attempts = attempts.clone();
                    async move {
                        attempts.fetch_add(1, Ordering::SeqCst);
                        (StatusCode::BAD_REQUEST, "MALFORMED QUERY near line 1: secret detail")
                    }
                }
            }),
        );
        let addr = spawn_store(router).await;

        let err = client_for(addr)
            .select("SELECT nonsense")
            .await
            .unwrap_err();
        assert_eq!(err.code(), "QUERY_ERROR");
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        // The store's own error text stays in the log, not in the error.
        assert!(!err.to_string().contains("secret detail"));
        assert!(err.to_string().contains("400"));
    }

    #[tokio::test]
    async fn an_unreachable_store_is_upstream_unavailable() {
        // Port from a listener that is immediately dropped.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client_for(addr)
            .select("SELECT ?s WHERE { ?s ?p ?o }")
            .await
            .unwrap_err();
        assert_eq!(err.code(), "UPSTREAM_UNAVAILABLE");
    }
}
