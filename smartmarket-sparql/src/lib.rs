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

//! SPARQL templating and transport for the SmartMarket backend.
//!
//! Three concerns live here: building syntactically valid, escaped
//! query text from user-supplied filters (`queries`), executing it over
//! HTTP against a GraphDB-style repository endpoint (`client`), and
//! parsing the SPARQL 1.1 JSON results format back into typed values
//! (`results`). Services depend on the [`SparqlExecutor`] trait, not on
//! the concrete client, so tests can substitute canned binding sets.

pub mod client;
pub mod queries;
pub mod results;

pub use client::{SparqlClient, SparqlClientConfig, SparqlExecutor};
pub use queries::{escape_literal, validate_local_name, SearchFilters};
pub use results::{
    decimal_var, f64_var, id_var, int_var, local_name, str_var, Binding, RdfTerm, SelectResults,
};

/// Ontology namespace every query is written against.
pub const ONTOLOGY_PREFIX: &str = "http://smartcompare.com/ontologia#";
