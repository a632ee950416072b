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
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use smartmarket_core::{MarketError, Product, Result};
use smartmarket_sparql::{
    decimal_var, id_var, int_var, local_name, queries, str_var, Binding, RdfTerm, SearchFilters,
    SparqlExecutor, ONTOLOGY_PREFIX,
};

use crate::config::PaginationConfig;

/// Data properties with a fixed column in the comparison matrix; their
/// property-table values land in `specs` under these keys.
const SPEC_PROPERTIES: &[(&str, &str)] = &[
    ("tieneRAM_GB", "ram_gb"),
    ("tieneAlmacenamiento_GB", "almacenamiento_gb"),
    ("tienePulgadas", "pulgadas"),
    ("procesadorModelo", "procesador"),
    ("tieneSistemaOperativo", "so"),
];

pub struct ProductService {
    executor: Arc<dyn SparqlExecutor>,
    pagination: PaginationConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct IncompatibleEntry {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ProductService {
    pub fn new(executor: Arc<dyn SparqlExecutor>, pagination: PaginationConfig) -> Self {
        Self {
            executor,
            pagination,
        }
    }

    fn page_window(&self, page: u64, page_size: Option<u64>) -> Result<(u64, u64)> {
        if page == 0 {
            return Err(MarketError::Validation("page must be >= 1".into()));
        }
        let size = page_size
            .unwrap_or(self.pagination.default_page_size)
            .clamp(1, self.pagination.max_page_size);
        Ok((size, (page - 1) * size))
    }

    pub async fn list(&self, page: u64, page_size: Option<u64>) -> Result<Vec<Product>> {
        let (limit, offset) = self.page_window(page, page_size)?;
        let results = self.executor.select(&queries::all_products(limit, offset)).await?;
        collect_products(results.rows())
    }

    pub async fn search(
        &self,
        filters: &SearchFilters,
        page: u64,
        page_size: Option<u64>,
    ) -> Result<Vec<Product>> {
        let (limit, offset) = self.page_window(page, page_size)?;
        let query = queries::search_products(filters, limit, offset)?;
        let results = self.executor.select(&query).await?;
        collect_products(results.rows())
    }

    /// Full product from its property table; 404 when the individual
    /// has no triples.
    pub async fn get(&self, product_id: &str) -> Result<Product> {
        let query = queries::product_by_id(product_id)?;
        let results = self.executor.select(&query).await?;
        if results.is_empty() {
            return Err(MarketError::NotFound(format!(
                "product '{product_id}' not found"
            )));
        }
        product_from_property_table(product_id, results.rows())
    }

    pub async fn similar(&self, product_id: &str, limit: u64) -> Result<Vec<Product>> {
        self.get(product_id).await?;
        let results = self
            .executor
            .select(&queries::similar_products(product_id, limit)?)
            .await?;
        results
            .rows()
            .iter()
            .map(|row| related_product(row, "similar"))
            .collect()
    }

    pub async fn compatible(&self, product_id: &str) -> Result<Vec<Product>> {
        self.get(product_id).await?;
        let results = self
            .executor
            .select(&queries::compatible_products(product_id)?)
            .await?;
        results
            .rows()
            .iter()
            .map(|row| related_product(row, "compatible"))
            .collect()
    }

    pub async fn incompatible(&self, product_id: &str) -> Result<Vec<IncompatibleEntry>> {
        self.get(product_id).await?;
        let results = self
            .executor
            .select(&queries::incompatible_products(product_id)?)
            .await?;
        let entries = results
            .rows()
            .iter()
            .filter_map(|row| {
                Some(IncompatibleEntry {
                    id: id_var(row, "incompatible")?.to_string(),
                    name: str_var(row, "nombre")?.to_string(),
                    reason: str_var(row, "razon").map(str::to_string),
                })
            })
            .collect();
        Ok(entries)
    }
}

/// Fold list/search rows into products. Multi-typed individuals come
/// back as one row per class; the first ontology class other than the
/// root wins as the category.
pub(crate) fn collect_products(rows: &[Binding]) -> Result<Vec<Product>> {
    let mut products: Vec<Product> = Vec::new();
    let mut by_id: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let Some(id) = id_var(row, "producto") else {
            continue;
        };

        if let Some(&idx) = by_id.get(id) {
            if products[idx].category.is_none() {
                products[idx].category = row_category(row);
            }
            continue;
        }

        let name = str_var(row, "nombre").ok_or_else(|| {
            MarketError::QueryError(format!("product '{id}' row missing name binding"))
        })?;
        let price = decimal_var(row, "precio").ok_or_else(|| {
            MarketError::QueryError(format!("product '{id}' row missing price binding"))
        })?;

        let mut product = build_product(id, name, price, row)?;
        product.category = row_category(row);
        by_id.insert(id.to_string(), products.len());
        products.push(product);
    }

    debug!(count = products.len(), "products collected from result set");
    Ok(products)
}

fn build_product(id: &str, name: &str, price: Decimal, row: &Binding) -> Result<Product> {
    let mut product = Product::new(id, name, price)?;
    product.description = str_var(row, "descripcion").map(str::to_string);
    product.stock = int_var(row, "stock");
    product.brand = str_var(row, "marca").map(str::to_string);
    product.vendor = str_var(row, "vendedor").map(str::to_string);
    product.uri = row.get("producto").map(|t| t.value.clone());
    product.validate()?;
    Ok(product)
}

fn row_category(row: &Binding) -> Option<String> {
    let term = row.get("categoria")?;
    if !term.value.starts_with(ONTOLOGY_PREFIX) {
        return None;
    }
    let name = local_name(&term.value);
    if name == "Producto" {
        return None;
    }
    Some(name.to_string())
}

fn related_product(row: &Binding, id_variable: &str) -> Result<Product> {
    let id = id_var(row, id_variable).ok_or_else(|| {
        MarketError::QueryError(format!("related row missing '{id_variable}' binding"))
    })?;
    let name = str_var(row, "nombre").unwrap_or(id);
    let price = decimal_var(row, "precio").unwrap_or(Decimal::ZERO);
    let mut product = Product::new(id, name, price)?;
    product.brand = str_var(row, "marca").map(str::to_string);
    product.uri = row.get(id_variable).map(|t| t.value.clone());
    Ok(product)
}

/// Assemble a product from `?propiedad ?valor` rows. Recognized spec
/// properties land under their matrix key; any other data property
/// goes into the open specs map under its own local name.
pub(crate) fn product_from_property_table(id: &str, rows: &[Binding]) -> Result<Product> {
    let mut name: Option<String> = None;
    let mut price: Option<Decimal> = None;
    let mut description: Option<String> = None;
    let mut stock: Option<i64> = None;
    let mut category: Option<String> = None;
    let mut brand: Option<String> = None;
    let mut vendor: Option<String> = None;
    let mut specs = serde_json::Map::new();

    for row in rows {
        let (Some(property), Some(value)) = (row.get("propiedad"), row.get("valor")) else {
            continue;
        };
        let prop_name = local_name(&property.value);

        match prop_name {
            "tieneNombre" => name = Some(value.value.clone()),
            "tienePrecio" => price = Decimal::from_str_exact(value.value.trim()).ok(),
            "tieneDescripcion" => description = Some(value.value.clone()),
            "tieneStock" => stock = value.value.trim().parse().ok(),
            "tieneMarca" => brand = Some(local_name(&value.value).to_string()),
            "vendidoPor" => vendor = Some(local_name(&value.value).to_string()),
            "type" if value.value.starts_with(ONTOLOGY_PREFIX) => {
                let class = local_name(&value.value);
                if class != "Producto" && category.is_none() {
                    category = Some(class.to_string());
                }
            }
            _ => {
                if let Some((_, key)) =
                    SPEC_PROPERTIES.iter().find(|(p, _)| *p == prop_name)
                {
                    specs.insert(key.to_string(), term_to_json(value));
                } else if !value.is_uri() && property.value.starts_with(ONTOLOGY_PREFIX) {
                    specs.insert(prop_name.to_string(), term_to_json(value));
                }
            }
        }
    }

    let name = name.ok_or_else(|| {
        MarketError::QueryError(format!("product '{id}' has no name property"))
    })?;
    let price = price.ok_or_else(|| {
        MarketError::QueryError(format!("product '{id}' has no price property"))
    })?;

    let mut product = Product::new(id, name, price)?;
    product.description = description;
    product.stock = stock;
    product.category = category;
    product.brand = brand;
    product.vendor = vendor;
    product.specs = specs;
    product.uri = Some(format!("{ONTOLOGY_PREFIX}{id}"));
    product.validate()?;
    Ok(product)
}

/// Typed literals become JSON numbers where the datatype says so; URIs
/// collapse to their local name.
pub(crate) fn term_to_json(term: &RdfTerm) -> Value {
    if term.is_uri() {
        return Value::String(local_name(&term.value).to_string());
    }
    let raw = term.value.trim();
    match term.datatype.as_deref().map(local_name) {
        Some("integer" | "int" | "long" | "nonNegativeInteger") => raw
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(term.value.clone())),
        Some("decimal" | "double" | "float") => raw
            .parse::<f64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(term.value.clone())),
        Some("boolean") => raw
            .parse::<bool>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(term.value.clone())),
        _ => Value::String(term.value.clone()),
    }
}
