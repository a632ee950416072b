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

use std::sync::Arc;

use async_trait::async_trait;

use smartmarket_core::{MarketError, Result};
use smartmarket_sparql::{SelectResults, SparqlExecutor};

use crate::ReasonerKind;

/// One description-logic backend. The store performs the actual
/// entailment; the backend knows its name and reports reasoner-side
/// failures under its own label. Which backend runs is decided by
/// configuration, never at call sites.
#[async_trait]
pub trait ReasonerBackend: Send + Sync {
    fn name(&self) -> &'static str;

    async fn infer(
        &self,
        executor: &Arc<dyn SparqlExecutor>,
        query: &str,
    ) -> Result<SelectResults>;
}

macro_rules! store_backed_reasoner {
    ($type:ident, $kind:expr) => {
        pub struct $type;

        #[async_trait]
        impl ReasonerBackend for $type {
            fn name(&self) -> &'static str {
                $kind.as_str()
            }

            async fn infer(
                &self,
                executor: &Arc<dyn SparqlExecutor>,
                query: &str,
            ) -> Result<SelectResults> {
                executor.select_inferred(query).await.map_err(|e| match e {
                    MarketError::QueryError(msg) => {
                        MarketError::Reasoner(format!("{}: {msg}", $kind.as_str()))
                    }
                    other => other,
                })
            }
        }
    };
}

store_backed_reasoner!(PelletBackend, ReasonerKind::Pellet);
store_backed_reasoner!(HermitBackend, ReasonerKind::Hermit);
store_backed_reasoner!(FactPpBackend, ReasonerKind::FactPp);

/// Backend for a configured kind.
pub fn backend_for(kind: ReasonerKind) -> Box<dyn ReasonerBackend> {
    match kind {
        ReasonerKind::Pellet => Box::new(PelletBackend),
        ReasonerKind::Hermit => Box::new(HermitBackend),
        ReasonerKind::FactPp => Box::new(FactPpBackend),
    }
}
