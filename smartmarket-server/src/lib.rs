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

pub mod api;
pub mod catalog;
pub mod config;
pub mod services;

use std::sync::Arc;

use anyhow::Result;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use smartmarket_reasoner::{ReasonerAdapter, ReasonerAdapterConfig};
use smartmarket_sparql::{SparqlClient, SparqlClientConfig, SparqlExecutor};

use api::AppState;
use catalog::CategoryCatalog;
use config::ServerConfig;
use services::{AnalysisService, ComparisonService, ProductService, RecommendationService};

/// Wire services onto an executor. Separated from transport setup so
/// tests can drive the router with a stub executor.
pub fn build_state(config: &ServerConfig, executor: Arc<dyn SparqlExecutor>) -> AppState {
    build_state_with_catalog(config, executor, CategoryCatalog::empty())
}

pub fn build_state_with_catalog(
    config: &ServerConfig,
    executor: Arc<dyn SparqlExecutor>,
    catalog: CategoryCatalog,
) -> AppState {
    let reasoner = config.reasoner.enabled.then(|| {
        Arc::new(ReasonerAdapter::new(
            executor.clone(),
            ReasonerAdapterConfig {
                kind: config.reasoner.kind,
                cache_ttl: config.reasoning_cache_ttl(),
                ..Default::default()
            },
        ))
    });

    let products = Arc::new(ProductService::new(
        executor.clone(),
        config.pagination.clone(),
    ));
    let comparisons = Arc::new(ComparisonService::new(executor.clone(), products.clone()));
    let recommendations = Arc::new(RecommendationService::new(
        executor.clone(),
        reasoner.clone(),
        config.recommendation.clone(),
    ));
    let analysis = Arc::new(AnalysisService::new(executor.clone()));

    AppState {
        executor,
        products,
        comparisons,
        recommendations,
        analysis,
        catalog: Arc::new(catalog),
        reasoner,
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(api::health::root))
        .route("/health", get(api::health::health_check))
        .route("/api/v1/health", get(api::health::health_check))
        .route("/api/v1/products/", get(api::products::list_products))
        .route(
            "/api/v1/products/search/",
            get(api::products::search_products),
        )
        .route("/api/v1/products/:id", get(api::products::get_product))
        .route(
            "/api/v1/products/:id/similar",
            get(api::products::similar_products),
        )
        .route(
            "/api/v1/products/:id/compatible",
            get(api::products::compatible_products),
        )
        .route(
            "/api/v1/products/:id/incompatible",
            get(api::products::incompatible_products),
        )
        .route(
            "/api/v1/comparisons/",
            post(api::comparisons::compare_products),
        )
        .route(
            "/api/v1/comparisons/by-specs",
            post(api::comparisons::compare_by_specs),
        )
        .route(
            "/api/v1/comparisons/best-value/:category",
            get(api::comparisons::best_value),
        )
        .route(
            "/api/v1/recommendations/users/:user_id",
            get(api::recommendations::user_recommendations),
        )
        .route(
            "/api/v1/recommendations/users/:user_id/budget",
            get(api::recommendations::budget_products),
        )
        .route(
            "/api/v1/recommendations/users/:user_id/personalized",
            get(api::recommendations::personalized_recommendations),
        )
        .route(
            "/api/v1/analysis/price-ranges",
            get(api::analysis::price_ranges),
        )
        .route(
            "/api/v1/analysis/vendors",
            get(api::analysis::vendor_statistics),
        )
        .route(
            "/api/v1/analysis/brands",
            get(api::analysis::brand_comparison),
        )
        .route(
            "/api/v1/analysis/overview",
            get(api::analysis::market_overview),
        )
        .route(
            "/api/v1/analysis/categories/:categoria/insights",
            get(api::analysis::category_insights),
        )
        .with_state(state)
}

pub async fn run_server(config: ServerConfig) -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "smartmarket_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting SmartMarket Server");
    tracing::info!("Configuration: {:#?}", config);

    config.validate()?;

    let client = SparqlClient::new(SparqlClientConfig {
        endpoint: config.store.endpoint.clone(),
        repository: config.store.repository.clone(),
        username: config.store.username.clone(),
        password: config.store.password.clone(),
        timeout: config.query_timeout(),
        ..Default::default()
    })?;
    let executor: Arc<dyn SparqlExecutor> = Arc::new(client);

    // One snapshot of the subclass tree for the process lifetime
    let catalog = CategoryCatalog::load(&executor).await;

    let state = build_state_with_catalog(&config, executor, catalog);

    let app = build_router(state)
        .layer(if config.server.enable_cors {
            // Allow-all is the development default; deployments are
            // expected to sit behind a reverse proxy.
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            CorsLayer::new()
        })
        .layer(TraceLayer::new_for_http());

    let addr = config.socket_addr()?;
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
