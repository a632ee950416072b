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

//! Error taxonomy shared by every layer.
//!
//! Services return `MarketError`; the HTTP layer maps each variant 1:1
//! to a status code and a stable machine-readable code. Raw upstream
//! error text never reaches a client unfiltered.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MarketError>;

#[derive(Debug, Clone, Error)]
pub enum MarketError {
    /// Bad input caught before any upstream query is issued.
    #[error("invalid input: {0}")]
    Validation(String),

    /// A single entity (product, category, ...) does not exist.
    #[error("{0}")]
    NotFound(String),

    /// One comparison request may miss several products; all missing
    /// ids are aggregated instead of failing on the first one.
    #[error("products not found: {}", .0.join(", "))]
    ProductsNotFound(Vec<String>),

    #[error("user not found: {0}")]
    UserNotFound(String),

    /// Fewer than 2, more than 10, or duplicate product ids.
    #[error("{0}")]
    InvalidComparisonSize(String),

    /// An aggregate over zero rows; surfaced explicitly instead of NaN.
    #[error("empty data set: {0}")]
    EmptyDataSet(String),

    /// The triple store did not answer (connect failure or timeout).
    #[error("triple store unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The triple store answered with a non-2xx status or garbage.
    #[error("query failed: {0}")]
    QueryError(String),

    #[error("reasoning failed: {0}")]
    Reasoner(String),
}

impl MarketError {
    /// Stable machine-readable code carried in every error response.
    pub fn code(&self) -> &'static str {
        match self {
            MarketError::Validation(_) => "VALIDATION_ERROR",
            MarketError::NotFound(_) => "NOT_FOUND",
            MarketError::ProductsNotFound(_) => "PRODUCT_NOT_FOUND",
            MarketError::UserNotFound(_) => "USER_NOT_FOUND",
            MarketError::InvalidComparisonSize(_) => "INVALID_COMPARISON_SIZE",
            MarketError::EmptyDataSet(_) => "EMPTY_DATA_SET",
            MarketError::UpstreamUnavailable(_) => "UPSTREAM_UNAVAILABLE",
            MarketError::QueryError(_) => "QUERY_ERROR",
            MarketError::Reasoner(_) => "REASONER_ERROR",
        }
    }

    /// True for failures worth one internal retry before surfacing.
    ///
    /// Only connectivity failures qualify. A store that answered with a
    /// rejection will reject the same query again, so retrying it only
    /// doubles the latency of a deterministic error.
    pub fn is_transient(&self) -> bool {
        matches!(self, MarketError::UpstreamUnavailable(_))
    }
}
