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

//! Domain model for the SmartMarket semantic marketplace.
//!
//! Everything here is a transient value object: entities are rebuilt
//! from triple-store bindings on every request and never written back.
//! This crate owns no I/O; it only knows invariants and derivations
//! (comparison matrices, best price, percentiles, recommendation order).

pub mod comparison;
pub mod error;
pub mod product;
pub mod recommendation;
pub mod stats;
pub mod user;

pub use comparison::ProductComparison;
pub use error::{MarketError, Result};
pub use product::Product;
pub use recommendation::{sort_recommendations, Recommendation};
pub use stats::{percentile_at_or_below, BrandStats, CategoryStats, VendorStats};
pub use user::UserProfile;
