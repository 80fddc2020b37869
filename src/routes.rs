// Copyright (c) 2025 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    error::{ApiError, StatsError},
    registry::SymbolRegistry,
    structs::{AddBatchRequest, StatsQuery, StatsSnapshot},
};
use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    routing::{get, post},
};
use serde_json::{Value, json};
use std::sync::Arc;

/// Assemble the API router.
pub(crate) fn api_router(registry: Arc<SymbolRegistry>) -> Router {
    Router::new()
        .route("/add_batch", post(add_batch))
        .route("/stats", get(stats))
        .route("/symbols", get(symbols))
        .route("/health", get(health))
        .with_state(registry)
}

/// `POST /add_batch`. Admission runs on the blocking pool since a full batch
/// fans out to eight windows per value.
async fn add_batch(
    State(registry): State<Arc<SymbolRegistry>>,
    req: Result<Json<AddBatchRequest>, JsonRejection>,
) -> Result<(), ApiError> {
    let Json(req) = req.map_err(|e: JsonRejection| StatsError::invalid(e.body_text()))?;
    let symbol: String = req
        .symbol
        .ok_or_else(|| StatsError::invalid("symbol cannot be empty"))?;
    let values: Vec<Option<f64>> = req
        .values
        .ok_or_else(|| StatsError::invalid("values cannot be empty"))?;
    let count: usize = values.len();

    let res = {
        let symbol: String = symbol.clone();
        tokio::task::spawn_blocking(move || registry.ingest_opt(&symbol, &values)).await?
    };
    match res {
        Ok(()) => {
            tracing::debug!("ingested {count} values for '{}'", symbol.trim());
            Ok(())
        }
        Err(e) => {
            if matches!(e, StatsError::Overflow { .. }) {
                tracing::warn!("batch for '{}' partially applied: {e}", symbol.trim());
            }
            Err(e.into())
        }
    }
}

/// `GET /stats?symbol=S&k=K`.
async fn stats(
    State(registry): State<Arc<SymbolRegistry>>,
    q: Result<Query<StatsQuery>, QueryRejection>,
) -> Result<Json<StatsSnapshot>, ApiError> {
    let Query(q) = q.map_err(|e: QueryRejection| StatsError::invalid(e.body_text()))?;
    let symbol: String = q.symbol.unwrap_or_default();
    let snap: StatsSnapshot = registry.query(&symbol, q.k)?;
    Ok(Json(snap))
}

async fn symbols(State(registry): State<Arc<SymbolRegistry>>) -> Json<Vec<String>> {
    Json(registry.symbols())
}

async fn health(State(registry): State<Arc<SymbolRegistry>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "symbols": registry.len(),
        "extrema": registry.policy().to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
        response::Response,
    };
    use tower::ServiceExt;

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp: Response = app.clone().oneshot(req).await.unwrap();
        let status: StatusCode = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: Value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn post_batch(body: Value) -> Request<Body> {
        Request::post("/add_batch")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_stats(query: &str) -> Request<Body> {
        Request::get(format!("/stats?{query}")).body(Body::empty()).unwrap()
    }

    fn app() -> Router {
        api_router(Arc::new(SymbolRegistry::default()))
    }

    #[tokio::test]
    async fn test_add_batch_then_stats() {
        let app: Router = app();
        let batch: Value = json!({"symbol": "TEST", "values": [1.0, 2.0, 3.0, 4.0, 5.0]});
        let (status, _) = send(&app, post_batch(batch)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app, get_stats("symbol=TEST&k=1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"min": 1.0, "max": 5.0, "last": 5.0, "avg": 3.0, "var": 2.0})
        );
    }

    #[tokio::test]
    async fn test_unknown_symbol_is_zero() {
        let (status, body) = send(&app(), get_stats("symbol=NONE&k=1")).await;
        assert_eq!(status, StatusCode::OK);
        for field in ["min", "max", "last", "avg", "var"] {
            assert_eq!(body[field], json!(0.0), "field {field}");
        }
    }

    #[tokio::test]
    async fn test_client_errors() {
        let app: Router = app();
        let queries: [&str; 7] = [
            "symbol=T&k=0",
            "symbol=T&k=9",
            "k=1",
            "symbol=%20&k=1",
            "symbol=T&k=abc",
            "symbol=T",
            "symbol=T&k=1.5",
        ];
        for query in queries {
            let (status, resp) = send(&app, get_stats(query)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "query {query}");
            assert!(
                resp["error"].as_str().unwrap().starts_with("invalid input"),
                "query {query}"
            );
        }

        for body in [
            json!({"values": [1.0]}),
            json!({"symbol": "", "values": [1.0]}),
            json!({"symbol": "T"}),
            json!({"symbol": "T", "values": null}),
            json!({"symbol": "T", "values": []}),
            json!({"symbol": "T", "values": [1.0, null]}),
            json!({"symbol": "T", "values": ["x"]}),
            json!({"symbol": 42, "values": [1.0]}),
            json!([1.0, 2.0]),
        ] {
            let (status, resp) = send(&app, post_batch(body.clone())).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body {body}");
            assert!(resp["error"].as_str().unwrap().starts_with("invalid input"), "body {body}");
        }

        // malformed JSON and a missing content type are reported the same way
        let garbled: Request<Body> = Request::post("/add_batch")
            .header("content-type", "application/json")
            .body(Body::from("{\"symbol\": \"T\", \"values\": [1.0,"))
            .unwrap();
        let untyped: Request<Body> = Request::post("/add_batch")
            .body(Body::from(r#"{"symbol": "T", "values": [1.0]}"#))
            .unwrap();
        for req in [garbled, untyped] {
            let (status, resp) = send(&app, req).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(resp["error"].as_str().unwrap().starts_with("invalid input"));
        }

        let (_, health) = send(&app, Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(health["symbols"], json!(0));
    }

    #[tokio::test]
    async fn test_overflow_is_client_error() {
        let app: Router = app();
        let batch: Value = json!({"symbol": "E", "values": [1e308, 1e308]});
        let (status, resp) = send(&app, post_batch(batch)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(resp["error"].as_str().unwrap().starts_with("overflow"));

        let (_, body) = send(&app, get_stats("symbol=E&k=1")).await;
        assert_eq!(body["last"], json!(1e308));
    }

    #[tokio::test]
    async fn test_oversized_batch() {
        let app: Router = app();
        let values: Vec<f64> = (0..10_001).map(|i| i as f64).collect();
        let full: Value = json!({"symbol": "BIG", "values": &values[..10_000]});
        let (status, _) = send(&app, post_batch(full)).await;
        assert_eq!(status, StatusCode::OK);
        let oversized: Value = json!({"symbol": "BIG", "values": values});
        let (status, _) = send(&app, post_batch(oversized)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = send(&app, get_stats("symbol=BIG&k=4")).await;
        assert_eq!(body["last"], json!(9_999.0));
        assert_eq!(body["avg"], json!(4_999.5));
    }

    #[tokio::test]
    async fn test_symbols_listing() {
        let app: Router = app();
        for symbol in ["MSFT", " AAPL "] {
            let batch: Value = json!({"symbol": symbol, "values": [1.0]});
            let (status, _) = send(&app, post_batch(batch)).await;
            assert_eq!(status, StatusCode::OK);
        }
        let (_, body) = send(&app, Request::get("/symbols").body(Body::empty()).unwrap()).await;
        assert_eq!(body, json!(["AAPL", "MSFT"]));
    }
}
