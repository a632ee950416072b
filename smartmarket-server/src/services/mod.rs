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

//! Domain services: the layer between route handlers and the triple
//! store. Handlers validate transport concerns; services own query
//! selection, result mapping and the error taxonomy.

pub mod analysis;
pub mod comparisons;
pub mod products;
pub mod recommendations;

pub use analysis::{AnalysisService, CategoryInsights, MarketOverview, VendorReport};
pub use comparisons::{BestValueEntry, ComparisonReport, ComparisonService, SpecRow};
pub use products::{IncompatibleEntry, ProductService};
pub use recommendations::RecommendationService;
