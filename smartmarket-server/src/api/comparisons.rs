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

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::products::LimitParam;
use super::{ApiResult, AppState};
use crate::services::{BestValueEntry, ComparisonReport, SpecRow};

#[derive(Debug, Deserialize)]
pub struct CompareRequest {
    pub product_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompareBySpecsRequest {
    pub product_ids: Vec<String>,
    pub specs: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CompareBySpecsResponse {
    pub product_ids: Vec<String>,
    pub rows: Vec<SpecRow>,
}

pub async fn compare_products(
    State(state): State<AppState>,
    Json(request): Json<CompareRequest>,
) -> ApiResult<Json<ComparisonReport>> {
    Ok(Json(state.comparisons.compare(&request.product_ids).await?))
}

pub async fn compare_by_specs(
    State(state): State<AppState>,
    Json(request): Json<CompareBySpecsRequest>,
) -> ApiResult<Json<CompareBySpecsResponse>> {
    let rows = state
        .comparisons
        .compare_by_specs(&request.product_ids, &request.specs)
        .await?;
    Ok(Json(CompareBySpecsResponse {
        product_ids: request.product_ids,
        rows,
    }))
}

pub async fn best_value(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(params): Query<LimitParam>,
) -> ApiResult<Json<Vec<BestValueEntry>>> {
    let limit = params.limit.unwrap_or(10).clamp(1, 20);
    Ok(Json(state.comparisons.best_value(&category, limit).await?))
}
