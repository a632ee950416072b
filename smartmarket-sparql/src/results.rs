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

//! SPARQL 1.1 JSON results format (`application/sparql-results+json`).

use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One solution row: variable name to bound term.
pub type Binding = HashMap<String, RdfTerm>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectResults {
    #[serde(default)]
    pub head: Head,
    #[serde(default)]
    pub results: BindingSet,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Head {
    #[serde(default)]
    pub vars: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BindingSet {
    #[serde(default)]
    pub bindings: Vec<Binding>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RdfTerm {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    #[serde(rename = "xml:lang", default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

impl RdfTerm {
    pub fn uri(value: impl Into<String>) -> Self {
        Self {
            kind: "uri".into(),
            value: value.into(),
            datatype: None,
            lang: None,
        }
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            kind: "literal".into(),
            value: value.into(),
            datatype: None,
            lang: None,
        }
    }

    pub fn is_uri(&self) -> bool {
        self.kind == "uri"
    }
}

impl SelectResults {
    pub fn is_empty(&self) -> bool {
        self.results.bindings.is_empty()
    }

    pub fn rows(&self) -> &[Binding] {
        &self.results.bindings
    }

    /// Test/stub helper: assemble a result set from literal rows.
    pub fn from_rows(vars: &[&str], rows: Vec<Binding>) -> Self {
        Self {
            head: Head {
                vars: vars.iter().map(|v| v.to_string()).collect(),
            },
            results: BindingSet { bindings: rows },
        }
    }
}

/// The local name of an IRI: the fragment after `#`, or the last path
/// segment when there is no fragment.
pub fn local_name(uri: &str) -> &str {
    if let Some(idx) = uri.rfind('#') {
        &uri[idx + 1..]
    } else if let Some(idx) = uri.rfind('/') {
        &uri[idx + 1..]
    } else {
        uri
    }
}

pub fn str_var<'a>(binding: &'a Binding, var: &str) -> Option<&'a str> {
    binding.get(var).map(|t| t.value.as_str())
}

/// Local name of a URI-valued variable.
pub fn id_var<'a>(binding: &'a Binding, var: &str) -> Option<&'a str> {
    binding.get(var).map(|t| local_name(&t.value))
}

pub fn decimal_var(binding: &Binding, var: &str) -> Option<Decimal> {
    binding
        .get(var)
        .and_then(|t| Decimal::from_str(t.value.trim()).ok())
}

pub fn int_var(binding: &Binding, var: &str) -> Option<i64> {
    binding.get(var).and_then(|t| {
        let v = t.value.trim();
        // Aggregate COUNTs sometimes come back typed as decimals.
        v.parse::<i64>()
            .ok()
            .or_else(|| v.parse::<f64>().ok().map(|f| f as i64))
    })
}

pub fn f64_var(binding: &Binding, var: &str) -> Option<f64> {
    binding.get(var).and_then(|t| t.value.trim().parse().ok())
}
