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

use smartmarket_core::Product;
use smartmarket_sparql::SearchFilters;

use super::{ApiResult, AppState};
use crate::services::IncompatibleEntry;

#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_page")]
    pub page: u64,
    pub page_size: Option<u64>,
}

fn default_page() -> u64 {
    1
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub categoria: Option<String>,
    pub min_precio: Option<Decimal>,
    pub max_precio: Option<Decimal>,
    pub marca: Option<String>,
    pub keyword: Option<String>,
    #[serde(default = "default_page")]
    pub page: u64,
    pub page_size: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct LimitParam {
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub products: Vec<Product>,
    pub page: u64,
    pub count: usize,
}

pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<ProductListResponse>> {
    let products = state.products.list(params.page, params.page_size).await?;
    Ok(Json(ProductListResponse {
        count: products.len(),
        page: params.page,
        products,
    }))
}

pub async fn search_products(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<ProductListResponse>> {
    let filters = SearchFilters {
        category: params.categoria,
        min_price: params.min_precio,
        max_price: params.max_precio,
        brand: params.marca,
        keyword: params.keyword,
    };
    let products = state
        .products
        .search(&filters, params.page, params.page_size)
        .await?;
    Ok(Json(ProductListResponse {
        count: products.len(),
        page: params.page,
        products,
    }))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> ApiResult<Json<Product>> {
    Ok(Json(state.products.get(&product_id).await?))
}

pub async fn similar_products(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Query(params): Query<LimitParam>,
) -> ApiResult<Json<Vec<Product>>> {
    let limit = params.limit.unwrap_or(5).clamp(1, 20);
    Ok(Json(state.products.similar(&product_id, limit).await?))
}

pub async fn compatible_products(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(state.products.compatible(&product_id).await?))
}

pub async fn incompatible_products(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> ApiResult<Json<Vec<IncompatibleEntry>>> {
    Ok(Json(state.products.incompatible(&product_id).await?))
}
