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

//! Side-by-side product comparison, built per request and never
//! persisted.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde_json::Value;

use crate::error::{MarketError, Result};
use crate::product::Product;

/// An ordered comparison of 2 to 10 distinct products.
///
/// The product order is the caller's input order; every derived list
/// (spec matrix columns, best-price tie break) follows it.
#[derive(Debug, Clone)]
pub struct ProductComparison {
    products: Vec<Product>,
}

impl ProductComparison {
    pub const MIN_PRODUCTS: usize = 2;
    pub const MAX_PRODUCTS: usize = 10;

    pub fn new(products: Vec<Product>) -> Result<Self> {
        Self::check_ids(&products.iter().map(|p| p.id.clone()).collect::<Vec<_>>())?;
        Ok(Self { products })
    }

    /// Cardinality and uniqueness check, usable before any fetch.
    pub fn check_ids(ids: &[String]) -> Result<()> {
        if ids.len() < Self::MIN_PRODUCTS || ids.len() > Self::MAX_PRODUCTS {
            return Err(MarketError::InvalidComparisonSize(format!(
                "a comparison needs between {} and {} products, got {}",
                Self::MIN_PRODUCTS,
                Self::MAX_PRODUCTS,
                ids.len()
            )));
        }
        let unique: HashSet<&String> = ids.iter().collect();
        if unique.len() != ids.len() {
            return Err(MarketError::InvalidComparisonSize(
                "product ids in a comparison must be unique".into(),
            ));
        }
        Ok(())
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Union of spec names across all products, first-seen order, each
    /// name exactly once.
    pub fn spec_names(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut names = Vec::new();
        for product in &self.products {
            for key in product.specs.keys() {
                if seen.insert(key.clone()) {
                    names.push(key.clone());
                }
            }
        }
        names
    }

    /// For each spec name, one value per product in input order.
    /// A product without the spec contributes an explicit `None`.
    pub fn spec_matrix(&self) -> Vec<(String, Vec<Option<Value>>)> {
        self.spec_names()
            .into_iter()
            .map(|name| {
                let column = self
                    .products
                    .iter()
                    .map(|p| p.specs.get(&name).cloned())
                    .collect();
                (name, column)
            })
            .collect()
    }

    /// The rows of the matrix where at least two values differ.
    pub fn differences(&self) -> Vec<(String, Vec<Option<Value>>)> {
        self.spec_matrix()
            .into_iter()
            .filter(|(_, values)| {
                let distinct: HashSet<String> =
                    values.iter().map(|v| format!("{v:?}")).collect();
                distinct.len() > 1
            })
            .collect()
    }

    /// Minimum price; ties go to the product appearing first in input
    /// order.
    pub fn best_price(&self) -> &Product {
        self.products
            .iter()
            .min_by(|a, b| a.price.cmp(&b.price))
            .expect("a comparison always holds at least two products")
    }

    pub fn price_spread(&self) -> Decimal {
        let min = self.products.iter().map(|p| p.price).min().unwrap_or_default();
        let max = self.products.iter().map(|p| p.price).max().unwrap_or_default();
        max - min
    }
}
