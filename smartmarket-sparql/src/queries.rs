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

//! Parameterized SPARQL templates for the marketplace catalog.
//!
//! Every user-supplied value is validated or escaped before it is
//! interpolated: ontology local names must match a closed charset, and
//! string literals are escaped for quotes, backslashes and newlines.
//! Category filters use the transitive-subclass form
//! (`rdf:type/rdfs:subClassOf*`) so a superclass query matches every
//! subclass instance.

use rust_decimal::Decimal;

use smartmarket_core::{MarketError, Result};

/// Prefix block prepended to queries that do not declare their own.
pub const PREFIXES: &str = "\
PREFIX sc: <http://smartcompare.com/ontologia#>
PREFIX owl: <http://www.w3.org/2002/07/owl#>
PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#>
PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
PREFIX xsd: <http://www.w3.org/2001/XMLSchema#>

";

pub fn with_prefixes(query: &str) -> String {
    if query.to_uppercase().contains("PREFIX") {
        query.to_string()
    } else {
        format!("{PREFIXES}{query}")
    }
}

/// An ontology local name: leading alphanumeric or underscore, then
/// alphanumerics, underscores or hyphens. Anything else is rejected
/// before it can reach query text.
pub fn validate_local_name(name: &str) -> Result<&str> {
    let mut chars = name.chars();
    let valid_head = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_');
    let valid_tail = chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid_head && valid_tail {
        Ok(name)
    } else {
        Err(MarketError::Validation(format!(
            "'{name}' is not a valid ontology identifier"
        )))
    }
}

/// Escape a string for use inside a double-quoted SPARQL literal.
pub fn escape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

/// Search filters for the product catalog. All optional, combined with
/// logical AND.
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    pub category: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub brand: Option<String>,
    pub keyword: Option<String>,
}

impl SearchFilters {
    /// Fails before any query text is produced.
    pub fn validate(&self) -> Result<()> {
        if let Some(min) = self.min_price {
            if min < Decimal::ZERO {
                return Err(MarketError::Validation("min_precio must be >= 0".into()));
            }
        }
        if let Some(max) = self.max_price {
            if max < Decimal::ZERO {
                return Err(MarketError::Validation("max_precio must be >= 0".into()));
            }
        }
        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            if max < min {
                return Err(MarketError::Validation(
                    "max_precio must be greater than or equal to min_precio".into(),
                ));
            }
        }
        if let Some(category) = &self.category {
            validate_local_name(category)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
            && self.brand.is_none()
            && self.keyword.is_none()
    }
}

pub fn all_products(limit: u64, offset: u64) -> String {
    format!(
        "\
SELECT DISTINCT ?producto ?nombre ?precio ?descripcion ?stock ?marca ?vendedor
WHERE {{
    ?producto rdf:type/rdfs:subClassOf* sc:Producto .
    ?producto sc:tieneNombre ?nombre .
    ?producto sc:tienePrecio ?precio .

    OPTIONAL {{ ?producto sc:tieneDescripcion ?descripcion }}
    OPTIONAL {{ ?producto sc:tieneStock ?stock }}
    OPTIONAL {{
        ?producto sc:tieneMarca ?marcaUri .
        ?marcaUri sc:tieneNombre ?marca .
    }}
    OPTIONAL {{
        ?producto sc:vendidoPor ?vendedorUri .
        ?vendedorUri sc:tieneNombre ?vendedor .
    }}
}}
ORDER BY ?nombre
LIMIT {limit}
OFFSET {offset}
"
    )
}

/// Property table for a single individual.
pub fn product_by_id(product_id: &str) -> Result<String> {
    let id = validate_local_name(product_id)?;
    Ok(format!(
        "\
SELECT ?propiedad ?valor
WHERE {{
    sc:{id} ?propiedad ?valor .
}}
"
    ))
}

pub fn search_products(filters: &SearchFilters, limit: u64, offset: u64) -> Result<String> {
    filters.validate()?;

    let mut clauses = Vec::new();
    if let Some(category) = &filters.category {
        let category = validate_local_name(category)?;
        clauses.push(format!(
            "?producto rdf:type/rdfs:subClassOf* sc:{category} ."
        ));
    }
    if let Some(min) = filters.min_price {
        clauses.push(format!("FILTER(?precio >= {min})"));
    }
    if let Some(max) = filters.max_price {
        clauses.push(format!("FILTER(?precio <= {max})"));
    }
    if let Some(brand) = &filters.brand {
        let brand = escape_literal(brand);
        clauses.push(format!(
            "?producto sc:tieneMarca ?marcaUri .\n    ?marcaUri sc:tieneNombre \"{brand}\" ."
        ));
    }
    if let Some(keyword) = &filters.keyword {
        let keyword = escape_literal(&keyword.to_lowercase());
        clauses.push(format!(
            "{{
        ?producto sc:tieneNombre ?n .
        FILTER(CONTAINS(LCASE(?n), \"{keyword}\"))
    }}
    UNION
    {{
        ?producto sc:tieneDescripcion ?d .
        FILTER(CONTAINS(LCASE(?d), \"{keyword}\"))
    }}"
        ));
    }
    let filter_clause = clauses.join("\n    ");

    Ok(format!(
        "\
SELECT DISTINCT ?producto ?nombre ?precio ?stock ?marca ?vendedor ?categoria
WHERE {{
    ?producto rdf:type ?categoria .
    ?producto rdf:type/rdfs:subClassOf* sc:Producto .
    ?producto sc:tieneNombre ?nombre .
    ?producto sc:tienePrecio ?precio .

    {filter_clause}

    OPTIONAL {{ ?producto sc:tieneStock ?stock }}
    OPTIONAL {{
        ?producto sc:tieneMarca ?marcaUri .
        ?marcaUri sc:tieneNombre ?marca .
    }}
    OPTIONAL {{
        ?producto sc:vendidoPor ?vendedorUri .
        ?vendedorUri sc:tieneNombre ?vendedor .
    }}
}}
ORDER BY ?precio
LIMIT {limit}
OFFSET {offset}
"
    ))
}

/// Similarity is symmetric in the ontology, so both directions are
/// queried, plus the technical-equivalence relation.
pub fn similar_products(product_id: &str, limit: u64) -> Result<String> {
    let id = validate_local_name(product_id)?;
    Ok(format!(
        "\
SELECT DISTINCT ?similar ?nombre ?precio ?marca
WHERE {{
    {{ sc:{id} sc:esSimilarA ?similar . }}
    UNION
    {{ ?similar sc:esSimilarA sc:{id} . }}
    UNION
    {{ sc:{id} sc:esEquivalenteTecnico ?similar . }}

    ?similar sc:tieneNombre ?nombre .
    ?similar sc:tienePrecio ?precio .

    OPTIONAL {{
        ?similar sc:tieneMarca ?marcaUri .
        ?marcaUri sc:tieneNombre ?marca .
    }}
}}
LIMIT {limit}
"
    ))
}

pub fn compatible_products(product_id: &str) -> Result<String> {
    let id = validate_local_name(product_id)?;
    Ok(format!(
        "\
SELECT DISTINCT ?compatible ?nombre ?precio
WHERE {{
    {{ sc:{id} sc:esCompatibleCon ?compatible . }}
    UNION
    {{ ?compatible sc:esCompatibleCon sc:{id} . }}

    ?compatible sc:tieneNombre ?nombre .
    ?compatible sc:tienePrecio ?precio .
}}
"
    ))
}

pub fn incompatible_products(product_id: &str) -> Result<String> {
    let id = validate_local_name(product_id)?;
    Ok(format!(
        "\
SELECT DISTINCT ?incompatible ?nombre ?razon
WHERE {{
    {{ sc:{id} sc:incompatibleCon ?incompatible . }}
    UNION
    {{ ?incompatible sc:incompatibleCon sc:{id} . }}

    ?incompatible sc:tieneNombre ?nombre .

    OPTIONAL {{
        sc:{id} sc:tieneSistemaOperativo ?so1 .
        ?incompatible sc:tieneSistemaOperativo ?so2 .
        FILTER(?so1 != ?so2)
        BIND(\"Sistema operativo diferente\" AS ?razon)
    }}
}}
"
    ))
}

/// Side-by-side fetch of the known spec properties for a fixed set of
/// individuals.
pub fn compare_products(product_ids: &[String]) -> Result<String> {
    let mut values = Vec::with_capacity(product_ids.len());
    for id in product_ids {
        values.push(format!("sc:{}", validate_local_name(id)?));
    }
    let values = values.join(" ");

    Ok(format!(
        "\
SELECT ?producto ?nombre ?precio ?ram ?almacenamiento ?pulgadas ?procesador ?so
WHERE {{
    VALUES ?producto {{ {values} }}

    ?producto sc:tieneNombre ?nombre .
    ?producto sc:tienePrecio ?precio .

    OPTIONAL {{ ?producto sc:tieneRAM_GB ?ram }}
    OPTIONAL {{ ?producto sc:tieneAlmacenamiento_GB ?almacenamiento }}
    OPTIONAL {{ ?producto sc:tienePulgadas ?pulgadas }}
    OPTIONAL {{ ?producto sc:procesadorModelo ?procesador }}
    OPTIONAL {{
        ?producto sc:tieneSistemaOperativo ?soUri .
        ?soUri sc:tieneNombre ?so .
    }}
}}
"
    ))
}

pub fn best_value_in_category(category: &str, limit: u64) -> Result<String> {
    let category = validate_local_name(category)?;
    Ok(format!(
        "\
SELECT ?producto ?nombre ?precio ?ram ?almacenamiento
    ((?ram + ?almacenamiento) / ?precio AS ?valorScore)
WHERE {{
    ?producto rdf:type/rdfs:subClassOf* sc:{category} .
    ?producto sc:tieneNombre ?nombre .
    ?producto sc:tienePrecio ?precio .
    ?producto sc:tieneRAM_GB ?ram .
    ?producto sc:tieneAlmacenamiento_GB ?almacenamiento .

    FILTER(?precio > 0)
}}
ORDER BY DESC(?valorScore)
LIMIT {limit}
"
    ))
}

/// Recommendations derived by the SWRL rules plus the two asserted
/// relations; each branch binds the reason the product qualified.
pub fn user_recommendations(user_id: &str, limit: u64) -> Result<String> {
    let id = validate_local_name(user_id)?;
    Ok(format!(
        "\
SELECT DISTINCT ?producto ?nombre ?precio ?razon
WHERE {{
    {{
        ?producto sc:esRecomendadoPara sc:{id} .
        BIND(\"Recomendado por perfil\" AS ?razon)
    }}
    UNION
    {{
        ?producto sc:estaDentroPresupuesto sc:{id} .
        BIND(\"Dentro de presupuesto\" AS ?razon)
    }}
    UNION
    {{
        sc:{id} sc:prefiereCategoria ?categoria .
        ?producto rdf:type/rdfs:subClassOf* ?categoria .
        BIND(\"Categoria preferida\" AS ?razon)
    }}

    ?producto sc:tieneNombre ?nombre .
    ?producto sc:tienePrecio ?precio .
}}
LIMIT {limit}
"
    ))
}

/// Recommendation query narrowed by caller filters: an optional
/// category membership clause and an optional price ceiling.
pub fn personalized_recommendations(
    user_id: &str,
    category: Option<&str>,
    max_price: Option<Decimal>,
    limit: u64,
) -> Result<String> {
    let id = validate_local_name(user_id)?;
    let mut clauses = Vec::new();
    if let Some(category) = category {
        let category = validate_local_name(category)?;
        clauses.push(format!(
            "?producto rdf:type/rdfs:subClassOf* sc:{category} ."
        ));
    }
    if let Some(max) = max_price {
        if max < Decimal::ZERO {
            return Err(MarketError::Validation("max_precio must be >= 0".into()));
        }
        clauses.push(format!("FILTER(?precio <= {max})"));
    }
    let filter_clause = clauses.join("\n    ");

    Ok(format!(
        "\
SELECT DISTINCT ?producto ?nombre ?precio ?razon
WHERE {{
    {{
        ?producto sc:esRecomendadoPara sc:{id} .
        BIND(\"Recomendado por perfil\" AS ?razon)
    }}
    UNION
    {{
        ?producto sc:estaDentroPresupuesto sc:{id} .
        BIND(\"Dentro de presupuesto\" AS ?razon)
    }}
    UNION
    {{
        sc:{id} sc:prefiereCategoria ?categoria .
        ?producto rdf:type/rdfs:subClassOf* ?categoria .
        BIND(\"Categoria preferida\" AS ?razon)
    }}

    ?producto sc:tieneNombre ?nombre .
    ?producto sc:tienePrecio ?precio .

    {filter_clause}
}}
LIMIT {limit}
"
    ))
}

pub fn user_budget_products(user_id: &str) -> Result<String> {
    let id = validate_local_name(user_id)?;
    Ok(format!(
        "\
SELECT ?producto ?nombre ?precio
WHERE {{
    sc:{id} sc:presupuestoMaximo ?presupuesto .

    ?producto rdf:type/rdfs:subClassOf* sc:Producto .
    ?producto sc:tieneNombre ?nombre .
    ?producto sc:tienePrecio ?precio .

    FILTER(?precio <= ?presupuesto)
}}
ORDER BY DESC(?precio)
"
    ))
}

/// Property table for a user individual; empty means unknown user.
pub fn user_profile(user_id: &str) -> Result<String> {
    let id = validate_local_name(user_id)?;
    Ok(format!(
        "\
SELECT ?propiedad ?valor
WHERE {{
    sc:{id} ?propiedad ?valor .
}}
"
    ))
}

pub fn price_range_by_category() -> String {
    "\
SELECT ?categoria
    (MIN(?precio) AS ?precioMinimo)
    (MAX(?precio) AS ?precioMaximo)
    (AVG(?precio) AS ?precioPromedio)
    (COUNT(?producto) AS ?totalProductos)
WHERE {
    ?producto rdf:type ?categoria .
    ?categoria rdfs:subClassOf* sc:Producto .
    ?producto sc:tienePrecio ?precio .
}
GROUP BY ?categoria
ORDER BY DESC(?totalProductos)
"
    .to_string()
}

pub fn vendor_statistics() -> String {
    "\
SELECT ?vendedor
    (COUNT(?producto) AS ?totalProductos)
    (AVG(?precio) AS ?precioPromedio)
    (MIN(?precio) AS ?precioMinimo)
    (MAX(?precio) AS ?precioMaximo)
WHERE {
    ?producto sc:vendidoPor ?vendedorUri .
    ?vendedorUri sc:tieneNombre ?vendedor .
    ?producto sc:tienePrecio ?precio .
}
GROUP BY ?vendedor
ORDER BY DESC(?totalProductos)
"
    .to_string()
}

pub fn brand_comparison() -> String {
    "\
SELECT ?marca
    (COUNT(?producto) AS ?totalProductos)
    (AVG(?precio) AS ?precioPromedio)
WHERE {
    ?producto sc:tieneMarca ?marcaUri .
    ?marcaUri sc:tieneNombre ?marca .
    ?producto sc:tienePrecio ?precio .
}
GROUP BY ?marca
HAVING (COUNT(?producto) > 0)
ORDER BY DESC(?totalProductos)
"
    .to_string()
}

/// Category tree under sc:Producto, loaded once at startup.
pub fn category_hierarchy() -> String {
    "\
SELECT DISTINCT ?categoria ?padre
WHERE {
    ?categoria rdfs:subClassOf* sc:Producto .
    OPTIONAL { ?categoria rdfs:subClassOf ?padre . }
}
"
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn local_names_accept_the_catalog_charset() {
        assert!(validate_local_name("Laptop_Dell_XPS13").is_ok());
        assert!(validate_local_name("User_Ana").is_ok());
        assert!(validate_local_name("X-200").is_ok());
    }

    #[test]
    fn local_names_reject_injection_attempts() {
        assert!(validate_local_name("x . ?s ?p ?o").is_err());
        assert!(validate_local_name("a} UNION {").is_err());
        assert!(validate_local_name("").is_err());
        assert!(validate_local_name("-leading-hyphen").is_err());
    }

    #[test]
    fn literals_are_escaped() {
        assert_eq!(escape_literal(r#"a"b"#), r#"a\"b"#);
        assert_eq!(escape_literal("a\\b"), "a\\\\b");
        assert_eq!(escape_literal("a\nb"), "a\\nb");
    }

    #[test]
    fn inverted_price_range_fails_validation() {
        let filters = SearchFilters {
            min_price: Some(dec!(1500)),
            max_price: Some(dec!(500)),
            ..Default::default()
        };
        let err = filters.validate().unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert!(search_products(&filters, 20, 0).is_err());
    }

    #[test]
    fn category_filter_uses_the_transitive_subclass_form() {
        let filters = SearchFilters {
            category: Some("Laptop".into()),
            ..Default::default()
        };
        let query = search_products(&filters, 20, 0).unwrap();
        assert!(query.contains("rdf:type/rdfs:subClassOf* sc:Laptop"));
    }

    #[test]
    fn keyword_filter_is_lowercased_and_escaped() {
        let filters = SearchFilters {
            keyword: Some("Gaming \"Pro\"".into()),
            ..Default::default()
        };
        let query = search_products(&filters, 20, 0).unwrap();
        assert!(query.contains(r#"gaming \"pro\""#));
    }

    #[test]
    fn comparison_values_clause_lists_every_id() {
        let ids = vec!["A1".to_string(), "B2".to_string()];
        let query = compare_products(&ids).unwrap();
        assert!(query.contains("VALUES ?producto { sc:A1 sc:B2 }"));
    }

    #[test]
    fn prefixes_are_not_duplicated() {
        let with = with_prefixes("PREFIX sc: <x>\nSELECT * WHERE { ?s ?p ?o }");
        assert_eq!(with.matches("PREFIX sc:").count(), 1);
        let without = with_prefixes("SELECT * WHERE { ?s ?p ?o }");
        assert!(without.starts_with("PREFIX sc:"));
    }
}
