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

//! Inference adapter over the triple store's attached OWL reasoner.
//!
//! Inference is expensive, so inferred result sets are cached by a
//! fingerprint of the query text and reasoner kind. Concurrent
//! requests for the same fingerprint coalesce into a single upstream
//! call; the rest await the shared result.

pub mod adapter;
pub mod backend;
pub mod fingerprint;

pub use adapter::{ReasonerAdapter, ReasonerAdapterConfig};
pub use backend::{backend_for, ReasonerBackend};
pub use fingerprint::Fingerprint;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use smartmarket_core::MarketError;

/// Reasoner attached to the store. All kinds share the inference
/// protocol; the kind only participates in cache keying so switching
/// reasoners never serves stale entailments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasonerKind {
    #[default]
    Pellet,
    Hermit,
    #[serde(rename = "factpp")]
    FactPp,
}

impl ReasonerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonerKind::Pellet => "pellet",
            ReasonerKind::Hermit => "hermit",
            ReasonerKind::FactPp => "factpp",
        }
    }
}

impl fmt::Display for ReasonerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReasonerKind {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pellet" => Ok(ReasonerKind::Pellet),
            "hermit" => Ok(ReasonerKind::Hermit),
            "factpp" | "fact++" => Ok(ReasonerKind::FactPp),
            other => Err(MarketError::Validation(format!(
                "unknown reasoner '{other}', expected pellet, hermit or factpp"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_from_str() {
        for kind in [ReasonerKind::Pellet, ReasonerKind::Hermit, ReasonerKind::FactPp] {
            assert_eq!(kind.as_str().parse::<ReasonerKind>().unwrap(), kind);
        }
    }

    #[test]
    fn fact_plus_plus_spelling_is_accepted() {
        assert_eq!("Fact++".parse::<ReasonerKind>().unwrap(), ReasonerKind::FactPp);
    }

    #[test]
    fn unknown_kind_is_a_validation_error() {
        let err = "jena".parse::<ReasonerKind>().unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }
}
