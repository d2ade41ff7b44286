#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use choicegate_api::config::ServerConfig;
use choicegate_api::routes;
use choicegate_api::state::AppState;
use choicegate_api::store::FormStore;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        forms_path: PathBuf::from("forms.json"),
    }
}

/// Form 1: radio `10` (slim/wide) drives select `30` (sizes) and checkbox
/// `31` (extras). Target `40` points at a field that is not on the form.
pub fn test_forms() -> FormStore {
    FormStore::from_json(json!([{
        "id": 1,
        "title": "Shirt order",
        "fields": [
            {"id": 10, "label": "Cut", "type": "radio",
             "choices": [{"value": "slim", "text": "Slim"}, {"value": "wide", "text": "Wide"}]},
            {"id": 12, "label": "Notes", "type": "textarea"},
            {"id": 30, "label": "Size", "type": "select",
             "choices": [{"value": "s", "text": "Small"}, {"value": "m", "text": "Medium"},
                         {"value": "l", "text": "Large"}]},
            {"id": 31, "label": "Extras", "type": "checkbox",
             "choices": [{"value": "pocket", "text": "Pocket"}, {"value": "logo", "text": "Logo"},
                         {"text": "Gift wrap"}]}
        ],
        "conditional_choices": {
            "mode": "first_match",
            "targets": {
                "30": {"enabled": true, "groups": [
                    {"id": "g1", "label": "Slim", "enabled": true, "logicType": "all",
                     "rules": [{"fieldId": 10, "operator": "is", "value": "slim"}],
                     "choices": ["s", "m"]}
                ]},
                "31": {"enabled": true, "groups": [
                    {"id": "g2", "label": "Wide", "enabled": true, "logicType": "any",
                     "rules": [{"fieldId": 10, "operator": "is", "value": "wide"},
                               {"fieldId": 12, "operator": "contains", "value": "gift"}],
                     "choices": ["Gift wrap"]}
                ]},
                "32": {"enabled": false, "groups": []},
                "40": {"enabled": true, "groups": [
                    {"id": "g3", "label": "Ghost", "enabled": true,
                     "rules": [{"fieldId": 10, "operator": "is", "value": "slim"}],
                     "choices": ["x"]}
                ]}
            }
        }
    }]))
    .expect("valid test forms")
}

/// Build the full application router with all middleware layers.
///
/// Mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack production uses.
pub fn build_test_app(forms: FormStore) -> Router {
    let state = AppState {
        config: Arc::new(test_config()),
        forms: Arc::new(forms),
    };

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

/// Send a GET request through the router.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// Send a POST request with a JSON body through the router.
pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
