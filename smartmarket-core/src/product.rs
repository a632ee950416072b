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

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{MarketError, Result};

/// A product reconstructed from triple-store bindings.
///
/// The id is the ontology individual's local name; `uri` keeps the full
/// IRI. `specs` is an open string-keyed map (insertion-ordered) for the
/// data properties that vary per category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(default)]
    pub specs: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

impl Product {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Decimal) -> Result<Self> {
        let product = Self {
            id: id.into(),
            name: name.into(),
            price,
            description: None,
            stock: None,
            category: None,
            brand: None,
            vendor: None,
            specs: Map::new(),
            uri: None,
        };
        product.validate()?;
        Ok(product)
    }

    /// Invariants: price and stock are never negative.
    pub fn validate(&self) -> Result<()> {
        if self.price < Decimal::ZERO {
            return Err(MarketError::Validation(format!(
                "product '{}' has a negative price",
                self.id
            )));
        }
        if matches!(self.stock, Some(s) if s < 0) {
            return Err(MarketError::Validation(format!(
                "product '{}' has a negative stock",
                self.id
            )));
        }
        Ok(())
    }

    /// Unknown stock counts as available.
    pub fn is_available(&self) -> bool {
        self.stock.map_or(true, |s| s > 0)
    }
}
