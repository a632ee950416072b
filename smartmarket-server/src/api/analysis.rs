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

use axum::extract::{Path, State};
use axum::Json;

use smartmarket_core::{BrandStats, CategoryStats};

use super::{ApiResult, AppState};
use crate::services::{CategoryInsights, MarketOverview, VendorReport};

pub async fn price_ranges(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<CategoryStats>>> {
    Ok(Json(state.analysis.price_ranges().await?))
}

pub async fn vendor_statistics(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<VendorReport>>> {
    Ok(Json(state.analysis.vendors().await?))
}

pub async fn brand_comparison(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<BrandStats>>> {
    Ok(Json(state.analysis.brands().await?))
}

pub async fn market_overview(
    State(state): State<AppState>,
) -> ApiResult<Json<MarketOverview>> {
    Ok(Json(state.analysis.overview().await?))
}

pub async fn category_insights(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> ApiResult<Json<CategoryInsights>> {
    Ok(Json(state.analysis.category_insights(&category).await?))
}
