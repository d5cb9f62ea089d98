//! Axum integration: the Web Thing REST surface.
//!
//! | Endpoint | Method | Purpose |
//! |----------|--------|---------|
//! | `/` | GET | Thing description |
//! | `/properties` | GET | All property values |
//! | `/properties/{name}` | GET | One property value |
//! | `/properties/{name}` | PUT | Write a property (`{"updateRate": 10}`) |
//! | `/static/*` | GET | Static directory, including `current.jpg` |
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use photo_cycler::{axum_ext, Config, PhotoCycler};
//!
//! let config = Config::new("/srv/photos", "/srv/static").validate()?;
//! let device = Arc::new(PhotoCycler::initialize(&config)?);
//! let app = axum_ext::router(device, &config.static_path);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8888").await?;
//! axum::serve(listener, app).await?;
//! ```

use std::path::Path;
use std::sync::Arc;

use axum::extract::{Path as AxumPath, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::{thing, Error, PhotoCycler};

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::InvalidPropertyValue { .. } | Error::ReadOnlyProperty(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::UnknownProperty(_) => StatusCode::NOT_FOUND,
            Error::Configuration(_) | Error::Tick(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Build the router for `device`, serving `static_path` under `/static`.
pub fn router(device: Arc<PhotoCycler>, static_path: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/", get(describe))
        .route("/properties", get(properties))
        .route("/properties/{name}", get(get_property).put(put_property))
        .nest_service("/static", ServeDir::new(static_path.as_ref()))
        .layer(TraceLayer::new_for_http())
        .with_state(device)
}

/// GET / - thing description
async fn describe() -> Json<Value> {
    Json(thing::thing_description())
}

/// GET /properties
async fn properties(State(device): State<Arc<PhotoCycler>>) -> Json<Value> {
    Json(Value::Object(device.properties()))
}

/// GET /properties/{name}
async fn get_property(
    State(device): State<Arc<PhotoCycler>>,
    AxumPath(name): AxumPath<String>,
) -> Result<Json<Value>, Error> {
    let value = device.property(&name)?;
    Ok(Json(json!({ name: value })))
}

/// PUT /properties/{name} - body must be `{"<name>": value}`
async fn put_property(
    State(device): State<Arc<PhotoCycler>>,
    AxumPath(name): AxumPath<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, Error> {
    // Unknown names are 404 even when the body is also wrong
    device.property(&name)?;

    let value = body
        .get(&name)
        .ok_or_else(|| Error::invalid_value(&name, "missing from request body"))?;

    match device.set_property(&name, value) {
        Ok(stored) => Ok(Json(json!({ name: stored }))),
        Err(e) => {
            tracing::warn!(property = %name, "rejected property write: {}", e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::ImageCycler;
    use axum::body::Body;
    use axum::http::{header, Request};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn app(static_path: &Path) -> (Router, Arc<PhotoCycler>) {
        let store = Arc::new(MemoryStore::with_photos(&["/p/a.jpg"]));
        let device = Arc::new(PhotoCycler::with_cycler(ImageCycler::new(store), 5.0).unwrap());
        (router(device.clone(), static_path), device)
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn put(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("PUT")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_thing_description() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _device) = app(dir.path());

        let (status, body) = send(app, get("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "Photo Cycler");
        assert_eq!(body["properties"]["updateRate"]["unit"], "second");
    }

    #[tokio::test]
    async fn test_get_properties() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _device) = app(dir.path());

        let (status, body) = send(app.clone(), get("/properties")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "updateRate": 5, "image": null }));

        let (status, body) = send(app.clone(), get("/properties/updateRate")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "updateRate": 5 }));

        let (status, _) = send(app, get("/properties/brightness")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_put_update_rate() {
        let dir = tempfile::tempdir().unwrap();
        let (app, device) = app(dir.path());

        let (status, body) = send(
            app,
            put("/properties/updateRate", json!({ "updateRate": 10 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "updateRate": 10 }));
        assert_eq!(device.update_rate(), 10.0);
    }

    #[tokio::test]
    async fn test_put_rejections_keep_state() {
        let dir = tempfile::tempdir().unwrap();
        let (app, device) = app(dir.path());

        let (status, body) = send(
            app.clone(),
            put("/properties/updateRate", json!({ "updateRate": -1 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("negative"));

        let (status, _) = send(
            app.clone(),
            put("/properties/updateRate", json!({ "rate": 3 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            app.clone(),
            put("/properties/image", json!({ "image": null })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(app, put("/properties/brightness", json!({ "brightness": 1 }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        assert_eq!(device.update_rate(), 5.0);
    }

    #[tokio::test]
    async fn test_static_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html></html>").unwrap();
        let (app, _device) = app(dir.path());

        let response = app.clone().oneshot(get("/static/index.html")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.oneshot(get("/static/current.jpg")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_error_status_codes() {
        let response = Error::UnknownProperty("x".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = Error::Tick("boom".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
