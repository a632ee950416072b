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

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use smartmarket_core::{MarketError, Product, ProductComparison, Result};
use smartmarket_sparql::{
    decimal_var, f64_var, id_var, int_var, queries, str_var, Binding, SparqlExecutor,
};

use super::products::{term_to_json, ProductService};

pub struct ComparisonService {
    executor: Arc<dyn SparqlExecutor>,
    products: Arc<ProductService>,
}

/// Side-by-side view of 2-10 products.
#[derive(Debug, Serialize)]
pub struct ComparisonReport {
    pub products: Vec<Product>,
    pub spec_names: Vec<String>,
    pub spec_matrix: Vec<SpecRow>,
    pub differences: Vec<SpecRow>,
    pub best_price: BestPrice,
    pub price_spread: Decimal,
}

#[derive(Debug, Serialize)]
pub struct SpecRow {
    pub name: String,
    /// One slot per product in request order; absent values stay null.
    pub values: Vec<Option<Value>>,
}

#[derive(Debug, Serialize)]
pub struct BestPrice {
    pub id: String,
    pub name: String,
    pub price: Decimal,
}

#[derive(Debug, Serialize)]
pub struct BestValueEntry {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub ram_gb: Option<i64>,
    pub almacenamiento_gb: Option<i64>,
    pub value_score: Option<f64>,
}

impl ComparisonService {
    pub fn new(executor: Arc<dyn SparqlExecutor>, products: Arc<ProductService>) -> Self {
        Self { executor, products }
    }

    /// Fetch every product concurrently, aggregate the missing ids into
    /// a single error, then derive the comparison.
    pub async fn compare(&self, product_ids: &[String]) -> Result<ComparisonReport> {
        ProductComparison::check_ids(product_ids)?;

        let fetches = product_ids.iter().map(|id| self.products.get(id));
        let mut found = Vec::with_capacity(product_ids.len());
        let mut missing = Vec::new();
        for (id, outcome) in product_ids.iter().zip(join_all(fetches).await) {
            match outcome {
                Ok(product) => found.push(product),
                Err(MarketError::NotFound(_)) => missing.push(id.clone()),
                Err(e) => return Err(e),
            }
        }
        if !missing.is_empty() {
            return Err(MarketError::ProductsNotFound(missing));
        }

        let comparison = ProductComparison::new(found)?;
        Ok(report_from(&comparison))
    }

    /// Projection of the fixed spec columns onto caller-chosen names.
    /// Unknown names yield an all-null row rather than an error.
    pub async fn compare_by_specs(
        &self,
        product_ids: &[String],
        spec_names: &[String],
    ) -> Result<Vec<SpecRow>> {
        ProductComparison::check_ids(product_ids)?;

        let query = queries::compare_products(product_ids)?;
        let results = self.executor.select(&query).await?;

        let mut by_id: HashMap<&str, &Binding> = HashMap::new();
        for row in results.rows() {
            if let Some(id) = id_var(row, "producto") {
                by_id.entry(id).or_insert(row);
            }
        }

        let missing: Vec<String> = product_ids
            .iter()
            .filter(|id| !by_id.contains_key(id.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(MarketError::ProductsNotFound(missing));
        }

        let rows = spec_names
            .iter()
            .map(|name| {
                let column = spec_column(name);
                let values = product_ids
                    .iter()
                    .map(|id| {
                        column.and_then(|var| {
                            by_id[id.as_str()].get(var).map(term_to_json)
                        })
                    })
                    .collect();
                SpecRow {
                    name: name.clone(),
                    values,
                }
            })
            .collect();
        Ok(rows)
    }

    pub async fn best_value(&self, category: &str, limit: u64) -> Result<Vec<BestValueEntry>> {
        let query = queries::best_value_in_category(category, limit)?;
        let results = self.executor.select(&query).await?;
        let entries = results
            .rows()
            .iter()
            .filter_map(|row| {
                Some(BestValueEntry {
                    id: id_var(row, "producto")?.to_string(),
                    name: str_var(row, "nombre")?.to_string(),
                    price: decimal_var(row, "precio")?,
                    ram_gb: int_var(row, "ram"),
                    almacenamiento_gb: int_var(row, "almacenamiento"),
                    value_score: f64_var(row, "valorScore"),
                })
            })
            .collect();
        Ok(entries)
    }
}

fn report_from(comparison: &ProductComparison) -> ComparisonReport {
    let best = comparison.best_price();
    ComparisonReport {
        spec_names: comparison.spec_names(),
        spec_matrix: spec_rows(comparison.spec_matrix()),
        differences: spec_rows(comparison.differences()),
        best_price: BestPrice {
            id: best.id.clone(),
            name: best.name.clone(),
            price: best.price,
        },
        price_spread: comparison.price_spread(),
        products: comparison.products().to_vec(),
    }
}

fn spec_rows(matrix: Vec<(String, Vec<Option<Value>>)>) -> Vec<SpecRow> {
    matrix
        .into_iter()
        .map(|(name, values)| SpecRow { name, values })
        .collect()
}

/// Result variable backing a requested spec name, if any.
fn spec_column(name: &str) -> Option<&'static str> {
    match name {
        "ram_gb" | "ram" => Some("ram"),
        "almacenamiento_gb" | "almacenamiento" => Some("almacenamiento"),
        "pulgadas" => Some("pulgadas"),
        "procesador" => Some("procesador"),
        "so" => Some("so"),
        _ => None,
    }
}
