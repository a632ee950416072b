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

use rust_decimal::Decimal;
use tracing::debug;

use smartmarket_core::{
    sort_recommendations, MarketError, Product, Recommendation, Result, UserProfile,
};
use smartmarket_reasoner::ReasonerAdapter;
use smartmarket_sparql::{
    decimal_var, id_var, local_name, queries, str_var, Binding, SelectResults, SparqlExecutor,
};

use crate::config::RecommendationConfig;

pub struct RecommendationService {
    executor: Arc<dyn SparqlExecutor>,
    reasoner: Option<Arc<ReasonerAdapter>>,
    weights: RecommendationConfig,
}

impl RecommendationService {
    pub fn new(
        executor: Arc<dyn SparqlExecutor>,
        reasoner: Option<Arc<ReasonerAdapter>>,
        weights: RecommendationConfig,
    ) -> Self {
        Self {
            executor,
            reasoner,
            weights,
        }
    }

    /// Inferred query, through the cache when reasoning is enabled.
    async fn inferred(&self, query: &str) -> Result<Arc<SelectResults>> {
        match &self.reasoner {
            Some(adapter) => adapter.select_inferred(query).await,
            None => Ok(Arc::new(self.executor.select_inferred(query).await?)),
        }
    }

    /// Profile from the user's property table; no triples means no
    /// such user.
    pub async fn profile(&self, user_id: &str) -> Result<UserProfile> {
        let query = queries::user_profile(user_id)?;
        let results = self.executor.select(&query).await?;
        if results.is_empty() {
            return Err(MarketError::UserNotFound(format!(
                "user '{user_id}' not found"
            )));
        }
        Ok(profile_from_property_table(user_id, results.rows()))
    }

    pub async fn for_user(&self, user_id: &str, limit: usize) -> Result<Vec<Recommendation>> {
        self.profile(user_id).await?;
        let query = queries::user_recommendations(user_id, fetch_window(limit))?;
        let results = self.inferred(&query).await?;
        Ok(self.rank(user_id, results.rows(), limit))
    }

    pub async fn personalized(
        &self,
        user_id: &str,
        category: Option<&str>,
        max_price: Option<Decimal>,
        limit: usize,
    ) -> Result<Vec<Recommendation>> {
        self.profile(user_id).await?;
        let query = queries::personalized_recommendations(
            user_id,
            category,
            max_price,
            fetch_window(limit),
        )?;
        let results = self.inferred(&query).await?;
        Ok(self.rank(user_id, results.rows(), limit))
    }

    /// Everything the user can afford, most expensive first (store-side
    /// ordering).
    pub async fn within_budget(&self, user_id: &str) -> Result<Vec<Product>> {
        self.profile(user_id).await?;
        let query = queries::user_budget_products(user_id)?;
        let results = self.executor.select(&query).await?;
        let products = results
            .rows()
            .iter()
            .filter_map(row_product)
            .collect();
        Ok(products)
    }

    /// Distinct reasons for one product accumulate, so a product that
    /// matches several criteria outranks one matching a single
    /// stronger criterion. The combined score is capped at 1.0; the
    /// highest-weighted reason is the one surfaced. Order score desc /
    /// price asc, truncate.
    fn rank(&self, user_id: &str, rows: &[Binding], limit: usize) -> Vec<Recommendation> {
        let mut candidates: HashMap<String, (Product, Vec<(String, f64)>)> = HashMap::new();

        for row in rows {
            let Some(product) = row_product(row) else {
                continue;
            };
            let reason = str_var(row, "razon").unwrap_or("").to_string();
            let weight = self.score_for(&reason);

            let (_, reasons) = candidates
                .entry(product.id.clone())
                .or_insert_with(|| (product, Vec::new()));
            // Each reason counts once per product.
            if !reasons.iter().any(|(seen, _)| *seen == reason) {
                reasons.push((reason, weight));
            }
        }

        let mut recommendations: Vec<Recommendation> = candidates
            .into_values()
            .map(|(product, reasons)| {
                let score = reasons.iter().map(|(_, weight)| weight).sum::<f64>().min(1.0);
                let reason = reasons
                    .into_iter()
                    .max_by(|a, b| a.1.total_cmp(&b.1))
                    .map(|(reason, _)| reason)
                    .unwrap_or_default();
                Recommendation {
                    product,
                    reason,
                    score: Some(score),
                    user_id: Some(user_id.to_string()),
                }
            })
            .collect();
        sort_recommendations(&mut recommendations);
        recommendations.truncate(limit);
        debug!(
            user = user_id,
            count = recommendations.len(),
            "recommendations ranked"
        );
        recommendations
    }

    fn score_for(&self, reason: &str) -> f64 {
        match reason {
            "Recomendado por perfil" => self.weights.profile_weight,
            "Dentro de presupuesto" => self.weights.budget_weight,
            "Categoria preferida" => self.weights.category_weight,
            _ => self.weights.fallback_weight,
        }
    }
}

fn row_product(row: &Binding) -> Option<Product> {
    let id = id_var(row, "producto")?;
    let name = str_var(row, "nombre")?;
    let price = decimal_var(row, "precio")?;
    let mut product = Product::new(id, name, price).ok()?;
    product.uri = row.get("producto").map(|t| t.value.clone());
    Some(product)
}

fn profile_from_property_table(user_id: &str, rows: &[Binding]) -> UserProfile {
    let mut profile = UserProfile::new(user_id);
    for row in rows {
        let (Some(property), Some(value)) = (row.get("propiedad"), row.get("valor")) else {
            continue;
        };
        match local_name(&property.value) {
            "tieneNombre" => profile.name = Some(value.value.clone()),
            "tieneEmail" => profile.email = Some(value.value.clone()),
            "presupuestoMaximo" => {
                profile.max_budget = Decimal::from_str_exact(value.value.trim()).ok()
            }
            "prefiereCategoria" => profile
                .preferred_categories
                .push(local_name(&value.value).to_string()),
            "haComprado" => profile
                .purchase_history
                .push(local_name(&value.value).to_string()),
            _ => {}
        }
    }
    profile
}

/// Over-fetch so dedupe and ranking have candidates to discard.
fn fetch_window(limit: usize) -> u64 {
    (limit as u64).saturating_mul(3).max(30)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use smartmarket_sparql::{RdfTerm, ONTOLOGY_PREFIX};

    fn recommendation_row(id: &str, price: &str, reason: &str) -> Binding {
        let mut row = Binding::new();
        row.insert(
            "producto".into(),
            RdfTerm::uri(format!("{ONTOLOGY_PREFIX}{id}")),
        );
        row.insert("nombre".into(), RdfTerm::literal(id));
        row.insert("precio".into(), RdfTerm::literal(price));
        row.insert("razon".into(), RdfTerm::literal(reason));
        row
    }

    fn service() -> RecommendationService {
        struct NoopExecutor;

        #[async_trait::async_trait]
        impl SparqlExecutor for NoopExecutor {
            async fn select(&self, _query: &str) -> Result<SelectResults> {
                Ok(SelectResults::from_rows(&[], Vec::new()))
            }

            async fn select_inferred(&self, query: &str) -> Result<SelectResults> {
                self.select(query).await
            }
        }

        RecommendationService::new(
            Arc::new(NoopExecutor),
            None,
            RecommendationConfig::default(),
        )
    }

    #[test]
    fn profile_reasons_outscore_budget_and_category() {
        let svc = service();
        let rows = vec![
            recommendation_row("P_Budget", "100", "Dentro de presupuesto"),
            recommendation_row("P_Profile", "900", "Recomendado por perfil"),
            recommendation_row("P_Category", "50", "Categoria preferida"),
        ];
        let ranked = svc.rank("User_Ana", &rows, 10);
        let ids: Vec<&str> = ranked.iter().map(|r| r.product.id.as_str()).collect();
        assert_eq!(ids, vec!["P_Profile", "P_Budget", "P_Category"]);
    }

    #[test]
    fn duplicate_products_collapse_and_surface_the_best_reason() {
        let svc = service();
        let rows = vec![
            recommendation_row("P1", "100", "Dentro de presupuesto"),
            recommendation_row("P1", "100", "Recomendado por perfil"),
        ];
        let ranked = svc.rank("User_Ana", &rows, 10);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].reason, "Recomendado por perfil");
        // 1.0 + 0.8, capped.
        assert_eq!(ranked[0].score, Some(1.0));
    }

    #[test]
    fn matching_several_criteria_outranks_a_single_stronger_one() {
        let svc = service();
        let rows = vec![
            recommendation_row("P_Single", "100", "Dentro de presupuesto"),
            // Repeats of one reason do not inflate the score.
            recommendation_row("P_Single", "100", "Dentro de presupuesto"),
            recommendation_row("P_Both", "900", "Dentro de presupuesto"),
            recommendation_row("P_Both", "900", "Categoria preferida"),
        ];
        let ranked = svc.rank("User_Ana", &rows, 10);
        assert_eq!(ranked[0].product.id, "P_Both");
        assert_eq!(ranked[0].reason, "Dentro de presupuesto");
        assert_eq!(ranked[0].score, Some(1.0));
        assert_eq!(ranked[1].product.id, "P_Single");
        assert_eq!(ranked[1].score, Some(0.8));
    }

    #[test]
    fn equal_scores_order_by_price_ascending() {
        let svc = service();
        let rows = vec![
            recommendation_row("P_Pricey", "900", "Dentro de presupuesto"),
            recommendation_row("P_Cheap", "100", "Dentro de presupuesto"),
        ];
        let ranked = svc.rank("User_Ana", &rows, 10);
        assert_eq!(ranked[0].product.id, "P_Cheap");
        assert_eq!(ranked[0].product.price, dec!(100));
    }

    #[test]
    fn rank_truncates_to_the_limit() {
        let svc = service();
        let rows: Vec<Binding> = (0..8)
            .map(|i| recommendation_row(&format!("P{i}"), "100", "Categoria preferida"))
            .collect();
        assert_eq!(svc.rank("User_Ana", &rows, 3).len(), 3);
    }

    #[test]
    fn profile_is_assembled_from_property_rows() {
        let mut rows = Vec::new();
        let mut push = |property: &str, value: RdfTerm| {
            let mut row = Binding::new();
            row.insert(
                "propiedad".into(),
                RdfTerm::uri(format!("{ONTOLOGY_PREFIX}{property}")),
            );
            row.insert("valor".into(), value);
            rows.push(row);
        };
        push("tieneNombre", RdfTerm::literal("Ana"));
        push("presupuestoMaximo", RdfTerm::literal("1500.00"));
        push(
            "prefiereCategoria",
            RdfTerm::uri(format!("{ONTOLOGY_PREFIX}Laptop")),
        );
        push(
            "haComprado",
            RdfTerm::uri(format!("{ONTOLOGY_PREFIX}Telefono_Pixel8")),
        );

        let profile = profile_from_property_table("User_Ana", &rows);
        assert_eq!(profile.name.as_deref(), Some("Ana"));
        assert_eq!(profile.max_budget, Some(dec!(1500.00)));
        assert!(profile.prefers_category("Laptop"));
        assert_eq!(profile.purchase_history, vec!["Telefono_Pixel8"]);
    }
}
