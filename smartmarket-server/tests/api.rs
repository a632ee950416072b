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

//! End-to-end route tests over an in-process store stub.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::Router;
use http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use smartmarket_core::Result;
use smartmarket_server::config::ServerConfig;
use smartmarket_server::{build_state, build_router};
use smartmarket_sparql::{Binding, RdfTerm, SelectResults, SparqlExecutor, ONTOLOGY_PREFIX};

/// Answers queries from a tiny fixed catalog by inspecting the query
/// text the way the store would.
struct ScriptedStore {
    calls: AtomicUsize,
}

impl ScriptedStore {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn literal(value: &str) -> RdfTerm {
    RdfTerm::literal(value)
}

fn typed(value: &str, datatype: &str) -> RdfTerm {
    let mut t = RdfTerm::literal(value);
    t.datatype = Some(format!("http://www.w3.org/2001/XMLSchema#{datatype}"));
    t
}

fn uri(local: &str) -> RdfTerm {
    RdfTerm::uri(format!("{ONTOLOGY_PREFIX}{local}"))
}

fn property_row(property: &str, value: RdfTerm) -> Binding {
    let mut row = Binding::new();
    row.insert("propiedad".into(), uri(property));
    row.insert("valor".into(), value);
    row
}

fn product_table(name: &str, price: &str, ram: &str, storage: &str) -> Vec<Binding> {
    vec![
        property_row("tieneNombre", literal(name)),
        property_row("tienePrecio", typed(price, "decimal")),
        property_row("tieneRAM_GB", typed(ram, "integer")),
        property_row("tieneAlmacenamiento_GB", typed(storage, "integer")),
    ]
}

fn recommendation_row(id: &str, name: &str, price: &str, reason: &str) -> Binding {
    let mut row = Binding::new();
    row.insert("producto".into(), uri(id));
    row.insert("nombre".into(), literal(name));
    row.insert("precio".into(), typed(price, "decimal"));
    row.insert("razon".into(), literal(reason));
    row
}

fn category_row(name: &str, min: &str, max: &str, avg: &str, count: &str) -> Binding {
    let mut row = Binding::new();
    row.insert("categoria".into(), uri(name));
    row.insert("precioMinimo".into(), typed(min, "decimal"));
    row.insert("precioMaximo".into(), typed(max, "decimal"));
    row.insert("precioPromedio".into(), typed(avg, "decimal"));
    row.insert("totalProductos".into(), typed(count, "integer"));
    row
}

#[async_trait]
impl SparqlExecutor for ScriptedStore {
    async fn select(&self, query: &str) -> Result<SelectResults> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        // Property tables for individuals
        if query.contains("sc:Laptop_XPS ?propiedad") {
            return Ok(SelectResults::from_rows(
                &["propiedad", "valor"],
                product_table("Dell XPS 13", "1299.99", "16", "512"),
            ));
        }
        if query.contains("sc:Laptop_Air ?propiedad") {
            let mut rows = product_table("MacBook Air", "1199.00", "8", "256");
            rows.push(property_row("tienePulgadas", typed("13.6", "decimal")));
            return Ok(SelectResults::from_rows(&["propiedad", "valor"], rows));
        }
        if query.contains("sc:User_Ana ?propiedad") {
            return Ok(SelectResults::from_rows(
                &["propiedad", "valor"],
                vec![
                    property_row("tieneNombre", literal("Ana")),
                    property_row("presupuestoMaximo", typed("1500.00", "decimal")),
                ],
            ));
        }

        // Recommendations (reasoning path also lands here via the stub)
        if query.contains("esRecomendadoPara") {
            return Ok(SelectResults::from_rows(
                &["producto", "nombre", "precio", "razon"],
                vec![
                    recommendation_row("P_Budget", "Budget pick", "300", "Dentro de presupuesto"),
                    recommendation_row("P_Profile", "Profile pick", "900", "Recomendado por perfil"),
                    recommendation_row("P_Budget", "Budget pick", "300", "Categoria preferida"),
                ],
            ));
        }

        // Category aggregates
        if query.contains("GROUP BY ?categoria") {
            return Ok(SelectResults::from_rows(
                &["categoria", "precioMinimo", "precioMaximo", "precioPromedio", "totalProductos"],
                vec![
                    category_row("Laptop", "500", "2000", "1200", "10"),
                    category_row("Telefono", "200", "1400", "700", "8"),
                    category_row("Tablet", "150", "900", "400", "5"),
                ],
            ));
        }
        if query.contains("GROUP BY ?vendedor") {
            let mut cheap = Binding::new();
            cheap.insert("vendedor".into(), literal("TechWorld"));
            cheap.insert("totalProductos".into(), typed("12", "integer"));
            cheap.insert("precioPromedio".into(), typed("600", "decimal"));
            cheap.insert("precioMinimo".into(), typed("150", "decimal"));
            cheap.insert("precioMaximo".into(), typed("1200", "decimal"));

            let mut pricey = Binding::new();
            pricey.insert("vendedor".into(), literal("LuxGadgets"));
            pricey.insert("totalProductos".into(), typed("4", "integer"));
            pricey.insert("precioPromedio".into(), typed("1800", "decimal"));
            pricey.insert("precioMinimo".into(), typed("900", "decimal"));
            pricey.insert("precioMaximo".into(), typed("2500", "decimal"));

            return Ok(SelectResults::from_rows(
                &["vendedor", "totalProductos", "precioPromedio", "precioMinimo", "precioMaximo"],
                vec![cheap, pricey],
            ));
        }

        // Anything else resolves to no bindings (unknown individuals)
        Ok(SelectResults::from_rows(&[], Vec::new()))
    }

    async fn select_inferred(&self, query: &str) -> Result<SelectResults> {
        self.select(query).await
    }
}

fn test_app() -> (Router, Arc<ScriptedStore>) {
    let store = Arc::new(ScriptedStore::new());
    let executor: Arc<dyn SparqlExecutor> = store.clone();
    let state = build_state(&ServerConfig::default(), executor);
    (build_router(state), store)
}

async fn get(app: Router, path: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::get(path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn post_json(app: Router, path: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::post(path)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn get_product_returns_the_property_table_view() {
    let (app, _) = test_app();
    let (status, body) = get(app, "/api/v1/products/Laptop_XPS").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "Laptop_XPS");
    assert_eq!(body["name"], "Dell XPS 13");
    assert_eq!(body["specs"]["ram_gb"], 16);
}

#[tokio::test]
async fn unknown_product_is_404_with_stable_code() {
    let (app, _) = test_app();
    let (status, body) = get(app, "/api/v1/products/Nope").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
    assert!(body["error"].as_str().unwrap().contains("Nope"));
}

#[tokio::test]
async fn comparison_reports_best_price_and_spec_union() {
    let (app, _) = test_app();
    let (status, body) = post_json(
        app,
        "/api/v1/comparisons/",
        json!({ "product_ids": ["Laptop_XPS", "Laptop_Air"] }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    // Cheaper of the two wins
    assert_eq!(body["best_price"]["id"], "Laptop_Air");
    // Union keeps first-seen order: XPS specs first, Air-only specs after
    let names: Vec<&str> = body["spec_names"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["ram_gb", "almacenamiento_gb", "pulgadas"]);
    // The XPS has no pulgadas value: explicit null, not a default
    let matrix = body["spec_matrix"].as_array().unwrap();
    let pulgadas = matrix.iter().find(|r| r["name"] == "pulgadas").unwrap();
    assert_eq!(pulgadas["values"][0], Value::Null);
}

#[tokio::test]
async fn undersized_comparison_is_rejected_before_any_query() {
    let (app, store) = test_app();
    let (status, body) = post_json(
        app,
        "/api/v1/comparisons/",
        json!({ "product_ids": ["Laptop_XPS"] }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_COMPARISON_SIZE");
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn missing_comparison_ids_are_aggregated() {
    let (app, _) = test_app();
    let (status, body) = post_json(
        app,
        "/api/v1/comparisons/",
        json!({ "product_ids": ["Laptop_XPS", "Ghost_A", "Ghost_B"] }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "PRODUCT_NOT_FOUND");
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.contains("Ghost_A") && detail.contains("Ghost_B"));
}

#[tokio::test]
async fn inverted_price_range_fails_without_touching_the_store() {
    let (app, store) = test_app();
    let (status, body) = get(
        app,
        "/api/v1/products/search/?min_precio=1500&max_precio=500",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn recommendations_are_ranked_and_deduped() {
    let (app, _) = test_app();
    let (status, body) = get(app, "/api/v1/recommendations/users/User_Ana").await;

    assert_eq!(status, StatusCode::OK);
    let recs = body["recommendations"].as_array().unwrap();
    assert_eq!(recs.len(), 2);
    // P_Budget matches budget and category, so its capped score ties
    // the profile match and the cheaper product wins the tie. Its
    // strongest reason is the one surfaced.
    assert_eq!(recs[0]["product"]["id"], "P_Budget");
    assert_eq!(recs[0]["reason"], "Dentro de presupuesto");
    assert_eq!(recs[0]["score"], 1.0);
    assert_eq!(recs[1]["product"]["id"], "P_Profile");
    assert_eq!(recs[1]["score"], 1.0);
}

#[tokio::test]
async fn unknown_user_is_404() {
    let (app, _) = test_app();
    let (status, body) = get(app, "/api/v1/recommendations/users/User_Nadie").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "USER_NOT_FOUND");
}

#[tokio::test]
async fn category_insights_use_the_inclusive_percentile() {
    let (app, _) = test_app();
    let (status, body) = get(app, "/api/v1/analysis/categories/Laptop/insights").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["avg_price_percentile"], 100.0);
    assert_eq!(body["competitive"], false);
}

#[tokio::test]
async fn vendor_competitiveness_compares_against_the_global_average() {
    let (app, _) = test_app();
    let (status, body) = get(app, "/api/v1/analysis/vendors").await;

    assert_eq!(status, StatusCode::OK);
    let vendors = body.as_array().unwrap();
    let tech = vendors.iter().find(|v| v["vendor"] == "TechWorld").unwrap();
    let lux = vendors.iter().find(|v| v["vendor"] == "LuxGadgets").unwrap();
    assert_eq!(tech["competitive"], true);
    assert_eq!(lux["competitive"], false);
}

#[tokio::test]
async fn overview_summarizes_the_market() {
    let (app, _) = test_app();
    let (status, body) = get(app, "/api/v1/analysis/overview").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_products"], 23);
    assert_eq!(body["total_categories"], 3);
    assert_eq!(body["top_category"], "Laptop");
    assert_eq!(body["top_vendor"], "TechWorld");
}

#[tokio::test]
async fn health_reports_store_and_reasoner_state() {
    let (app, _) = test_app();
    let (status, body) = get(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"], "ok");
    assert_eq!(body["reasoner"]["kind"], "pellet");
}
