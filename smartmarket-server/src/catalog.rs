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

//! Ontology category catalog, loaded once at startup.
//!
//! The subclass tree under `sc:Producto` changes only when the ontology
//! is redeployed, so a single read-only snapshot serves the process
//! lifetime. A failed load degrades to an empty catalog rather than
//! refusing to start; the health endpoint reports which of the two
//! happened.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use smartmarket_core::Result;
use smartmarket_sparql::{id_var, queries, SparqlExecutor};

#[derive(Debug, Clone)]
pub struct CategoryCatalog {
    /// Category local name -> parent local name (root has no entry).
    parents: HashMap<String, Option<String>>,
    loaded: bool,
}

impl CategoryCatalog {
    pub fn empty() -> Self {
        Self {
            parents: HashMap::new(),
            loaded: false,
        }
    }

    /// Query the subclass tree; on upstream failure, log and fall back
    /// to an empty catalog.
    pub async fn load(executor: &Arc<dyn SparqlExecutor>) -> Self {
        match Self::try_load(executor).await {
            Ok(catalog) => {
                info!(categories = catalog.len(), "ontology category catalog loaded");
                catalog
            }
            Err(e) => {
                warn!(error = %e, "category catalog load failed, starting with empty catalog");
                Self::empty()
            }
        }
    }

    async fn try_load(executor: &Arc<dyn SparqlExecutor>) -> Result<Self> {
        let results = executor.select(&queries::category_hierarchy()).await?;

        let mut parents = HashMap::new();
        for row in results.rows() {
            let Some(category) = id_var(row, "categoria") else {
                continue;
            };
            let parent = id_var(row, "padre").map(str::to_string);
            // A category appears once per parent edge; keep the first.
            parents
                .entry(category.to_string())
                .or_insert(parent);
        }

        Ok(Self {
            parents,
            loaded: true,
        })
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Hint only: an unloaded catalog cannot rule a category out.
    pub fn knows(&self, category: &str) -> bool {
        self.parents.contains_key(category)
    }

    pub fn categories(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.parents.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;

    use smartmarket_core::MarketError;
    use smartmarket_sparql::{Binding, RdfTerm, SelectResults, ONTOLOGY_PREFIX};

    struct FixedExecutor(Vec<Binding>);

    #[async_trait]
    impl SparqlExecutor for FixedExecutor {
        async fn select(&self, _query: &str) -> Result<SelectResults> {
            Ok(SelectResults::from_rows(
                &["categoria", "padre"],
                self.0.clone(),
            ))
        }

        async fn select_inferred(&self, query: &str) -> Result<SelectResults> {
            self.select(query).await
        }
    }

    struct FailingExecutor;

    #[async_trait]
    impl SparqlExecutor for FailingExecutor {
        async fn select(&self, _query: &str) -> Result<SelectResults> {
            Err(MarketError::UpstreamUnavailable("store down".into()))
        }

        async fn select_inferred(&self, query: &str) -> Result<SelectResults> {
            self.select(query).await
        }
    }

    fn edge(category: &str, parent: Option<&str>) -> Binding {
        let mut row = Binding::new();
        row.insert(
            "categoria".into(),
            RdfTerm::uri(format!("{ONTOLOGY_PREFIX}{category}")),
        );
        if let Some(parent) = parent {
            row.insert(
                "padre".into(),
                RdfTerm::uri(format!("{ONTOLOGY_PREFIX}{parent}")),
            );
        }
        row
    }

    #[tokio::test]
    async fn loads_the_subclass_tree() {
        let executor: Arc<dyn SparqlExecutor> = Arc::new(FixedExecutor(vec![
            edge("Producto", None),
            edge("Laptop", Some("Producto")),
            edge("LaptopGaming", Some("Laptop")),
        ]));

        let catalog = CategoryCatalog::load(&executor).await;
        assert!(catalog.is_loaded());
        assert_eq!(catalog.len(), 3);
        assert!(catalog.knows("LaptopGaming"));
        assert!(!catalog.knows("Telefono"));
        assert_eq!(catalog.categories(), vec!["Laptop", "LaptopGaming", "Producto"]);
    }

    #[tokio::test]
    async fn upstream_failure_degrades_to_empty() {
        let executor: Arc<dyn SparqlExecutor> = Arc::new(FailingExecutor);
        let catalog = CategoryCatalog::load(&executor).await;
        assert!(!catalog.is_loaded());
        assert!(catalog.is_empty());
    }
}
