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

//! Market statistics as returned by the GROUP BY aggregate queries.
//!
//! The vendor competitiveness flag is not stored here: it is derived by
//! the analysis service against the global average fetched in the same
//! request.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryStats {
    pub category: String,
    pub min_price: Decimal,
    pub max_price: Decimal,
    pub avg_price: Decimal,
    pub product_count: u64,
}

impl CategoryStats {
    pub fn price_range(&self) -> Decimal {
        self.max_price - self.min_price
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorStats {
    pub vendor: String,
    pub product_count: u64,
    pub avg_price: Decimal,
    pub min_price: Decimal,
    pub max_price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandStats {
    pub brand: String,
    pub product_count: u64,
    pub avg_price: Decimal,
}

/// Percentile of `target` within `values`, inclusive at-or-below:
/// values equal to the target count as below it, so the maximum of the
/// set sits at the 100th percentile. Returns `None` for an empty set.
pub fn percentile_at_or_below(values: &[Decimal], target: Decimal) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let at_or_below = values.iter().filter(|v| **v <= target).count();
    Some(at_or_below as f64 / values.len() as f64 * 100.0)
}
