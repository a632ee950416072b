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

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::product::Product;

/// A recommended product with the reason the rules derived it and an
/// optional score. Scores come from configurable weights, so only the
/// resulting order is contractual.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub product: Product,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Score descending; missing scores sink to the end; equal scores break
/// ties by price ascending.
pub fn sort_recommendations(recommendations: &mut [Recommendation]) {
    recommendations.sort_by(|a, b| {
        match (a.score, b.score) {
            (Some(sa), Some(sb)) => sb
                .partial_cmp(&sa)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.product.price.cmp(&b.product.price)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.product.price.cmp(&b.product.price),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn rec(id: &str, price: Decimal, score: Option<f64>) -> Recommendation {
        Recommendation {
            product: Product::new(id, id, price).unwrap(),
            reason: "test".into(),
            score,
            user_id: None,
        }
    }

    #[test]
    fn higher_score_comes_first() {
        let mut recs = vec![
            rec("A", dec!(10), Some(0.6)),
            rec("B", dec!(10), Some(1.0)),
            rec("C", dec!(10), Some(0.8)),
        ];
        sort_recommendations(&mut recs);
        let ids: Vec<_> = recs.iter().map(|r| r.product.id.as_str()).collect();
        assert_eq!(ids, vec!["B", "C", "A"]);
    }

    #[test]
    fn equal_scores_break_ties_by_price_ascending() {
        let mut recs = vec![
            rec("Expensive", dec!(900), Some(0.8)),
            rec("Cheap", dec!(100), Some(0.8)),
        ];
        sort_recommendations(&mut recs);
        assert_eq!(recs[0].product.id, "Cheap");
    }

    #[test]
    fn unscored_items_sink_to_the_end() {
        let mut recs = vec![
            rec("NoScore", dec!(1), None),
            rec("Scored", dec!(999), Some(0.1)),
        ];
        sort_recommendations(&mut recs);
        assert_eq!(recs[0].product.id, "Scored");
    }
}
