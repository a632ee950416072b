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

//! Market-wide aggregates over the GROUP BY queries. All statistics
//! are computed per request from store data; nothing is persisted.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;

use smartmarket_core::{
    percentile_at_or_below, BrandStats, CategoryStats, MarketError, Result, VendorStats,
};
use smartmarket_sparql::{
    decimal_var, id_var, int_var, queries, str_var, validate_local_name, Binding, SparqlExecutor,
};

pub struct AnalysisService {
    executor: Arc<dyn SparqlExecutor>,
}

#[derive(Debug, Serialize)]
pub struct VendorReport {
    #[serde(flatten)]
    pub stats: VendorStats,
    /// Average at or below the global average across vendors.
    pub competitive: bool,
}

#[derive(Debug, Serialize)]
pub struct MarketOverview {
    pub total_products: u64,
    pub total_categories: usize,
    pub global_avg_price: Decimal,
    pub top_category: String,
    pub top_vendor: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CategoryInsights {
    pub category: String,
    pub stats: CategoryStats,
    pub price_range: Decimal,
    /// Percentile of this category's average among all category
    /// averages, inclusive at-or-below.
    pub avg_price_percentile: f64,
    /// Percentile below the median marks the category as competitive.
    pub competitive: bool,
}

impl AnalysisService {
    pub fn new(executor: Arc<dyn SparqlExecutor>) -> Self {
        Self { executor }
    }

    pub async fn price_ranges(&self) -> Result<Vec<CategoryStats>> {
        let results = self
            .executor
            .select(&queries::price_range_by_category())
            .await?;
        let stats = results
            .rows()
            .iter()
            .filter_map(category_stats)
            .collect();
        Ok(stats)
    }

    pub async fn vendors(&self) -> Result<Vec<VendorReport>> {
        let results = self.executor.select(&queries::vendor_statistics()).await?;
        let stats: Vec<VendorStats> = results
            .rows()
            .iter()
            .filter_map(vendor_stats)
            .collect();
        if stats.is_empty() {
            return Err(MarketError::EmptyDataSet(
                "no vendor data available".into(),
            ));
        }

        let global_avg = stats.iter().map(|s| s.avg_price).sum::<Decimal>()
            / Decimal::from(stats.len() as u64);
        let reports = stats
            .into_iter()
            .map(|stats| VendorReport {
                competitive: stats.avg_price <= global_avg,
                stats,
            })
            .collect();
        Ok(reports)
    }

    pub async fn brands(&self) -> Result<Vec<BrandStats>> {
        let results = self.executor.select(&queries::brand_comparison()).await?;
        let stats = results
            .rows()
            .iter()
            .filter_map(brand_stats)
            .collect();
        Ok(stats)
    }

    pub async fn overview(&self) -> Result<MarketOverview> {
        let categories = self.price_ranges().await?;
        if categories.is_empty() {
            return Err(MarketError::EmptyDataSet(
                "no category data available".into(),
            ));
        }

        let total_products = categories.iter().map(|c| c.product_count).sum();
        let global_avg_price = categories.iter().map(|c| c.avg_price).sum::<Decimal>()
            / Decimal::from(categories.len() as u64);
        // The aggregate query orders by count descending.
        let top_category = categories[0].category.clone();

        let top_vendor = match self.vendors().await {
            Ok(vendors) => vendors.first().map(|v| v.stats.vendor.clone()),
            Err(MarketError::EmptyDataSet(_)) => None,
            Err(e) => return Err(e),
        };

        Ok(MarketOverview {
            total_products,
            total_categories: categories.len(),
            global_avg_price,
            top_category,
            top_vendor,
        })
    }

    pub async fn category_insights(&self, category: &str) -> Result<CategoryInsights> {
        validate_local_name(category)?;
        let categories = self.price_ranges().await?;
        if categories.is_empty() {
            return Err(MarketError::EmptyDataSet(
                "no category data available".into(),
            ));
        }

        let stats = categories
            .iter()
            .find(|c| c.category == category)
            .cloned()
            .ok_or_else(|| {
                MarketError::NotFound(format!("category '{category}' not found"))
            })?;
        if stats.product_count == 0 {
            return Err(MarketError::EmptyDataSet(format!(
                "category '{category}' has no products"
            )));
        }

        let averages: Vec<Decimal> = categories.iter().map(|c| c.avg_price).collect();
        let percentile = percentile_at_or_below(&averages, stats.avg_price)
            .ok_or_else(|| MarketError::EmptyDataSet("no category averages".into()))?;

        Ok(CategoryInsights {
            category: category.to_string(),
            price_range: stats.price_range(),
            avg_price_percentile: percentile,
            competitive: percentile < 50.0,
            stats,
        })
    }
}

fn category_stats(row: &Binding) -> Option<CategoryStats> {
    Some(CategoryStats {
        category: id_var(row, "categoria")?.to_string(),
        min_price: decimal_var(row, "precioMinimo")?,
        max_price: decimal_var(row, "precioMaximo")?,
        avg_price: decimal_var(row, "precioPromedio")?,
        product_count: int_var(row, "totalProductos")? as u64,
    })
}

fn vendor_stats(row: &Binding) -> Option<VendorStats> {
    Some(VendorStats {
        vendor: str_var(row, "vendedor")?.to_string(),
        product_count: int_var(row, "totalProductos")? as u64,
        avg_price: decimal_var(row, "precioPromedio")?,
        min_price: decimal_var(row, "precioMinimo")?,
        max_price: decimal_var(row, "precioMaximo")?,
    })
}

fn brand_stats(row: &Binding) -> Option<BrandStats> {
    Some(BrandStats {
        brand: str_var(row, "marca")?.to_string(),
        product_count: int_var(row, "totalProductos")? as u64,
        avg_price: decimal_var(row, "precioPromedio")?,
    })
}
