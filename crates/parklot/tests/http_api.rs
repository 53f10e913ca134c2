//! Integration tests driving the HTTP router end to end.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use parklot::blob::MemoryBlobStore;
use parklot::config::ServerConfig;
use parklot::http::router;
use parklot::service::PhotoSettings;
use parklot::storage::{MemoryStore, SqliteStore};
use parklot::{Backends, ParkingService};

const PHOTO: &[u8] = b"\xff\xd8\xff\xe0fake-jpeg";

fn memory_router() -> Router {
    let backends = Backends::new(
        Arc::new(MemoryStore::new()),
        Arc::new(MemoryBlobStore::new("http://localhost/blobs")),
    );
    router(
        ParkingService::new(backends, PhotoSettings::default()),
        &ServerConfig::default(),
    )
}

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> Result<(StatusCode, Value), String> {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(payload) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string())),
        None => builder.body(Body::empty()),
    }
    .map_err(|err| format!("build request: {err}"))?;

    let response = router
        .clone()
        .oneshot(req)
        .await
        .map_err(|err| format!("route request: {err}"))?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .map_err(|err| format!("read response body: {err}"))?;
    let parsed = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).map_err(|err| format!("parse response body: {err}"))?
    };
    Ok((status, parsed))
}

async fn register(router: &Router) -> Result<String, String> {
    let (status, body) = send(
        router,
        Method::POST,
        "/registerParkingLot",
        Some(json!({ "name": "Main St", "timeZone": "UTC" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    Ok(body["parkingLotId"].as_str().unwrap_or_default().to_string())
}

async fn add_car(router: &Router, lot_id: &str, plate: &str) -> Result<String, String> {
    let (status, body) = send(
        router,
        Method::POST,
        "/addCar",
        Some(json!({
            "parkingLotId": lot_id,
            "numberPlate": plate,
            "imageBase64": STANDARD.encode(PHOTO),
            "timeOfEntry": "1999-01-01T00:00:00Z",
        })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK, "add car failed: {body}");
    Ok(body["uniqueCode"].as_str().unwrap_or_default().to_string())
}

#[tokio::test]
async fn full_lifecycle_over_http() -> Result<(), String> {
    let router = memory_router();
    let lot_id = register(&router).await?;
    let code = add_car(&router, &lot_id, "ABC123").await?;
    assert!(!code.is_empty());

    let uri = format!("/getCurrentCars?parkingLotId={lot_id}");
    let (status, body) = send(&router, Method::GET, &uri, None).await?;
    assert_eq!(status, StatusCode::OK);
    let cars = body["cars"].as_array().cloned().unwrap_or_default();
    assert_eq!(cars.len(), 1);
    assert_eq!(cars[0]["carNumberPlate"], "ABC123");
    assert_eq!(cars[0]["uniqueCode"], code.as_str());
    assert!(cars[0].get("timeOfExit").is_none());
    // Entry time is server time, not the client-supplied value.
    assert_ne!(cars[0]["timeOfEntry"], "1999-01-01T00:00:00Z");

    let (status, body) = send(
        &router,
        Method::POST,
        "/removeCar",
        Some(json!({ "parkingLotId": lot_id, "identifier": "ABC123" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["timeOfEntry"].is_string());
    assert!(body["timeOfExit"].is_string());

    let (_, body) = send(&router, Method::GET, &uri, None).await?;
    assert_eq!(body["cars"], json!([]));

    let history_uri = format!("/getCarHistory?parkingLotId={lot_id}");
    let (status, body) = send(&router, Method::GET, &history_uri, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cars"][0]["uniqueCode"], code.as_str());
    assert!(body["cars"][0]["timeOfExit"].is_string());
    Ok(())
}

#[tokio::test]
async fn missing_fields_are_bad_requests() -> Result<(), String> {
    let router = memory_router();
    let lot_id = register(&router).await?;

    let cases = [
        ("/registerParkingLot", json!({ "name": "No zone" })),
        ("/addCar", json!({ "parkingLotId": lot_id, "imageBase64": "aGk=" })),
        ("/addCar", json!({ "parkingLotId": lot_id, "numberPlate": "P" })),
        ("/removeCar", json!({ "parkingLotId": lot_id })),
        ("/removeCar", json!({ "identifier": "P" })),
    ];
    for (uri, payload) in cases {
        let (status, body) = send(&router, Method::POST, uri, Some(payload)).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["success"], false);
        assert!(body["error"].is_string());
    }

    let (status, _) = send(&router, Method::GET, "/getCurrentCars", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_bad_request() -> Result<(), String> {
    let router = memory_router();
    let req = Request::builder()
        .method(Method::POST)
        .uri("/registerParkingLot")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .map_err(|err| err.to_string())?;
    let response = router.oneshot(req).await.map_err(|err| err.to_string())?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn unknown_lot_and_car_are_not_found() -> Result<(), String> {
    let router = memory_router();

    let (status, body) = send(
        &router,
        Method::POST,
        "/addCar",
        Some(json!({ "parkingLotId": "nope", "numberPlate": "P", "imageBase64": "aGk=" })),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "parking lot not found: nope");

    let lot_id = register(&router).await?;
    let (status, body) = send(
        &router,
        Method::POST,
        "/removeCar",
        Some(json!({ "parkingLotId": lot_id, "identifier": "GHOST" })),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "car not found: GHOST");

    let (status, body) = send(&router, Method::GET, "/getCurrentCars?parkingLotId=nope", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cars"], json!([]));
    Ok(())
}

#[tokio::test]
async fn photo_is_served_behind_signature() -> Result<(), String> {
    let router = memory_router();
    let lot_id = register(&router).await?;
    add_car(&router, &lot_id, "PHOTO1").await?;

    let (_, body) = send(
        &router,
        Method::GET,
        &format!("/getCurrentCars?parkingLotId={lot_id}"),
        None,
    )
    .await?;
    let image_url = body["cars"][0]["imageUrl"].as_str().unwrap_or_default().to_string();
    let path_and_query = image_url
        .strip_prefix("http://localhost")
        .ok_or("unexpected image url")?;

    let req = Request::builder()
        .uri(path_and_query)
        .body(Body::empty())
        .map_err(|err| err.to_string())?;
    let response = router.clone().oneshot(req).await.map_err(|err| err.to_string())?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");
    let bytes = axum::body::to_bytes(response.into_body(), 1024)
        .await
        .map_err(|err| err.to_string())?;
    assert_eq!(&bytes[..], PHOTO);

    let tampered = path_and_query.replace("sig=", "sig=00");
    let (status, body) = send(&router, Method::GET, &tampered, None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);

    let unsigned = path_and_query.split('?').next().unwrap_or_default();
    let (status, _) = send(&router, Method::GET, unsigned, None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn health_and_unknown_route() -> Result<(), String> {
    let router = memory_router();
    let (status, body) = send(&router, Method::GET, "/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));

    let (status, body) = send(&router, Method::GET, "/nope", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    Ok(())
}

#[tokio::test]
async fn oversized_body_is_rejected() -> Result<(), String> {
    let backends = Backends::new(
        Arc::new(MemoryStore::new()),
        Arc::new(MemoryBlobStore::default()),
    );
    let server = ServerConfig {
        max_body_bytes: 64,
        ..ServerConfig::default()
    };
    let router = router(ParkingService::new(backends, PhotoSettings::default()), &server);

    let payload = json!({ "name": "x".repeat(200), "timeZone": "UTC" });
    let req = Request::builder()
        .method(Method::POST)
        .uri("/registerParkingLot")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .map_err(|err| err.to_string())?;
    let status = router
        .oneshot(req)
        .await
        .map_err(|err| err.to_string())?
        .status();
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    Ok(())
}

#[tokio::test]
async fn sqlite_backend_round_trip() -> Result<(), String> {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let store = SqliteStore::open(dir.path().join("lots.db")).map_err(|err| err.to_string())?;
    let backends = Backends::new(Arc::new(store), Arc::new(MemoryBlobStore::default()));
    let router = router(
        ParkingService::new(backends, PhotoSettings::default()),
        &ServerConfig::default(),
    );

    let lot_id = register(&router).await?;
    let first = add_car(&router, &lot_id, "SAME").await?;
    let second = add_car(&router, &lot_id, "SAME").await?;
    let expected = std::cmp::min(first.clone(), second.clone());

    let (status, body) = send(
        &router,
        Method::POST,
        "/removeCar",
        Some(json!({ "parkingLotId": lot_id, "identifier": "SAME" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["uniqueCode"], expected.as_str());

    let (_, body) = send(
        &router,
        Method::GET,
        &format!("/getCurrentCars?parkingLotId={lot_id}"),
        None,
    )
    .await?;
    assert_eq!(body["cars"].as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn empty_post_bodies_are_bad_requests() -> Result<(), String> {
    let router = memory_router();
    for uri in ["/registerParkingLot", "/addCar", "/removeCar"] {
        for content_type in [None, Some("application/json")] {
            let mut builder = Request::builder().method(Method::POST).uri(uri);
            if let Some(value) = content_type {
                builder = builder.header(header::CONTENT_TYPE, value);
            }
            let req = builder.body(Body::empty()).map_err(|err| err.to_string())?;
            let response = router.clone().oneshot(req).await.map_err(|err| err.to_string())?;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri} {content_type:?}");
            let bytes = axum::body::to_bytes(response.into_body(), 1024)
                .await
                .map_err(|err| err.to_string())?;
            let body: Value = serde_json::from_slice(&bytes).map_err(|err| err.to_string())?;
            assert_eq!(body["success"], false);
        }
    }
    Ok(())
}

#[tokio::test]
async fn form_encoded_bodies_are_accepted() -> Result<(), String> {
    let router = memory_router();
    let req = Request::builder()
        .method(Method::POST)
        .uri("/registerParkingLot")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("name=Form+Lot&timeZone=UTC"))
        .map_err(|err| err.to_string())?;
    let response = router.clone().oneshot(req).await.map_err(|err| err.to_string())?;
    assert_eq!(response.status(), StatusCode::OK);

    let req = Request::builder()
        .method(Method::POST)
        .uri("/removeCar")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("identifier=P"))
        .map_err(|err| err.to_string())?;
    let response = router.oneshot(req).await.map_err(|err| err.to_string())?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn entry_and_exit_times_follow_the_server_clock() -> Result<(), String> {
    let router = memory_router();
    let lot_id = register(&router).await?;

    let start = Utc::now();
    let code = add_car(&router, &lot_id, "TIME1").await?;

    let (_, body) = send(
        &router,
        Method::GET,
        &format!("/getCurrentCars?parkingLotId={lot_id}"),
        None,
    )
    .await?;
    let entry: DateTime<Utc> =
        serde_json::from_value(body["cars"][0]["timeOfEntry"].clone()).map_err(|e| e.to_string())?;
    assert!(entry >= start, "entry {entry} precedes call start {start}");
    assert!(entry <= Utc::now());

    let (status, body) = send(
        &router,
        Method::POST,
        "/removeCar",
        Some(json!({ "parkingLotId": lot_id, "identifier": code })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let entered: DateTime<Utc> =
        serde_json::from_value(body["timeOfEntry"].clone()).map_err(|e| e.to_string())?;
    let exited: DateTime<Utc> =
        serde_json::from_value(body["timeOfExit"].clone()).map_err(|e| e.to_string())?;
    assert_eq!(entered, entry);
    assert!(exited >= entered);
    Ok(())
}
