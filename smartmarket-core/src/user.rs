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

/// A user profile read from the ontology. The ontology is the source of
/// truth; this layer never writes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_budget: Option<Decimal>,
    #[serde(default)]
    pub preferred_categories: Vec<String>,
    #[serde(default)]
    pub purchase_history: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

impl UserProfile {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            email: None,
            max_budget: None,
            preferred_categories: Vec::new(),
            purchase_history: Vec::new(),
            uri: None,
        }
    }

    /// No declared budget means everything is affordable.
    pub fn can_afford(&self, price: Decimal) -> bool {
        self.max_budget.map_or(true, |budget| price <= budget)
    }

    pub fn prefers_category(&self, category: &str) -> bool {
        self.preferred_categories.iter().any(|c| c == category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn budget_check() {
        let mut user = UserProfile::new("User_Ana");
        assert!(user.can_afford(dec!(1000000)));
        user.max_budget = Some(dec!(1500));
        assert!(user.can_afford(dec!(1500)));
        assert!(!user.can_afford(dec!(1500.01)));
    }

    #[test]
    fn category_preference() {
        let mut user = UserProfile::new("User_Ana");
        user.preferred_categories.push("Laptop".into());
        assert!(user.prefers_category("Laptop"));
        assert!(!user.prefers_category("Smartphone"));
    }
}
