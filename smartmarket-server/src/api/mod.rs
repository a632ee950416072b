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

pub mod analysis;
pub mod comparisons;
pub mod health;
pub mod products;
pub mod recommendations;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use smartmarket_core::MarketError;
use smartmarket_reasoner::ReasonerAdapter;
use smartmarket_sparql::SparqlExecutor;

use crate::catalog::CategoryCatalog;
use crate::services::{
    AnalysisService, ComparisonService, ProductService, RecommendationService,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub executor: Arc<dyn SparqlExecutor>,
    pub products: Arc<ProductService>,
    pub comparisons: Arc<ComparisonService>,
    pub recommendations: Arc<RecommendationService>,
    pub analysis: Arc<AnalysisService>,
    pub catalog: Arc<CategoryCatalog>,
    pub reasoner: Option<Arc<ReasonerAdapter>>,
}

/// Stable wire shape for every error.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub code: &'static str,
}

pub struct ApiError(pub MarketError);

impl From<MarketError> for ApiError {
    fn from(e: MarketError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            MarketError::Validation(_) | MarketError::InvalidComparisonSize(_) => {
                StatusCode::BAD_REQUEST
            }
            MarketError::NotFound(_)
            | MarketError::ProductsNotFound(_)
            | MarketError::UserNotFound(_)
            | MarketError::EmptyDataSet(_) => StatusCode::NOT_FOUND,
            MarketError::UpstreamUnavailable(_)
            | MarketError::QueryError(_)
            | MarketError::Reasoner(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let detail = match &self.0 {
            MarketError::ProductsNotFound(ids) => Some(ids.join(", ")),
            _ => None,
        };

        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }

        let body = ErrorResponse {
            error: self.0.to_string(),
            detail,
            code: self.0.code(),
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
