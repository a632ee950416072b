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
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use smartmarket_core::{Product, Recommendation};

use super::{ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct RecommendationParams {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct PersonalizedParams {
    pub categoria: Option<String>,
    pub max_precio: Option<Decimal>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub user_id: String,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Serialize)]
pub struct BudgetResponse {
    pub user_id: String,
    pub products: Vec<Product>,
}

fn clamp_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(10).clamp(1, 50)
}

pub async fn user_recommendations(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(params): Query<RecommendationParams>,
) -> ApiResult<Json<RecommendationsResponse>> {
    let recommendations = state
        .recommendations
        .for_user(&user_id, clamp_limit(params.limit))
        .await?;
    Ok(Json(RecommendationsResponse {
        user_id,
        recommendations,
    }))
}

pub async fn personalized_recommendations(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(params): Query<PersonalizedParams>,
) -> ApiResult<Json<RecommendationsResponse>> {
    let recommendations = state
        .recommendations
        .personalized(
            &user_id,
            params.categoria.as_deref(),
            params.max_precio,
            clamp_limit(params.limit),
        )
        .await?;
    Ok(Json(RecommendationsResponse {
        user_id,
        recommendations,
    }))
}

pub async fn budget_products(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<BudgetResponse>> {
    let products = state.recommendations.within_budget(&user_id).await?;
    Ok(Json(BudgetResponse { user_id, products }))
}
