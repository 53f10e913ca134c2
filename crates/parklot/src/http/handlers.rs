//! Route handlers.
//!
//! Handlers only translate between JSON and [`ParkingService`] calls; all
//! validation beyond JSON shape happens in the service.
//!
//! [`ParkingService`]: crate::service::ParkingService

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{FromRequest, Path, Query, Request, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::response::{ApiError, Success};
use super::AppState;
use crate::blob::SignatureError;
use crate::model::{CarRecord, Checkout};
use crate::service::decode_image_base64;

type Shared = State<Arc<AppState>>;

/// Body of `POST /registerParkingLot`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterLotRequest {
    /// Display name of the lot.
    pub name: Option<String>,
    /// Time zone identifier.
    pub time_zone: Option<String>,
}

/// Body of `POST /addCar`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCarRequest {
    /// Lot to check into.
    pub parking_lot_id: Option<String>,
    /// Licence plate.
    pub number_plate: Option<String>,
    /// Entry photo, base64 encoded.
    pub image_base64: Option<String>,
    /// Client's idea of the entry time. Ignored; entry time is server time.
    pub time_of_entry: Option<serde_json::Value>,
}

/// Body of `POST /removeCar`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveCarRequest {
    /// Lot to check out of.
    pub parking_lot_id: Option<String>,
    /// Unique code or licence plate.
    pub identifier: Option<String>,
}

/// Query string of the listing routes.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LotQuery {
    /// Lot to list.
    pub parking_lot_id: Option<String>,
}

/// Query string of a signed blob URL.
#[derive(Debug, Default, Deserialize)]
pub struct BlobQuery {
    /// Expiry as unix seconds.
    pub expires: Option<i64>,
    /// Hex signature.
    pub sig: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Registered {
    parking_lot_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Added {
    unique_code: String,
}

#[derive(Debug, Serialize)]
struct Cars {
    cars: Vec<CarRecord>,
}

/// A POST body given as JSON or as an urlencoded form.
///
/// An empty body yields `T::default()`, so absent inputs surface as
/// missing-field errors rather than content-type rejections.
#[derive(Debug)]
pub struct RequestBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for RequestBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));
        if is_form {
            let Form(value) = Form::<T>::from_request(req, state).await?;
            return Ok(Self(value));
        }

        let bytes = Bytes::from_request(req, state).await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(T::default()));
        }
        let Json(value) = Json::<T>::from_bytes(&bytes)?;
        Ok(Self(value))
    }
}

fn field(value: Option<&String>) -> &str {
    value.map_or("", String::as_str)
}

/// `POST /registerParkingLot`
pub async fn register_parking_lot(
    State(state): Shared,
    RequestBody(body): RequestBody<RegisterLotRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let parking_lot_id = state
        .service
        .register_lot(field(body.name.as_ref()), field(body.time_zone.as_ref()))
        .await?;
    Ok(Success::json(Registered { parking_lot_id }))
}

/// `POST /addCar`
pub async fn add_car(
    State(state): Shared,
    RequestBody(body): RequestBody<AddCarRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(claimed) = &body.time_of_entry {
        debug!(%claimed, "Ignoring client-supplied entry time");
    }

    let lot_id = field(body.parking_lot_id.as_ref());
    let plate = field(body.number_plate.as_ref());
    let image = decode_image_base64(field(body.image_base64.as_ref()))?;

    let unique_code = state.service.add_car(lot_id, plate, &image).await?;
    Ok(Success::json(Added { unique_code }))
}

/// `POST /removeCar`
pub async fn remove_car(
    State(state): Shared,
    RequestBody(body): RequestBody<RemoveCarRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let checkout: Checkout = state
        .service
        .remove_car(
            field(body.parking_lot_id.as_ref()),
            field(body.identifier.as_ref()),
        )
        .await?;
    Ok(Success::json(checkout))
}

/// `GET /getCurrentCars?parkingLotId=`
pub async fn get_current_cars(
    State(state): Shared,
    query: Result<Query<LotQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;
    let cars = state
        .service
        .list_current(field(query.parking_lot_id.as_ref()))
        .await?;
    Ok(Success::json(Cars { cars }))
}

/// `GET /getCarHistory?parkingLotId=`
pub async fn get_car_history(
    State(state): Shared,
    query: Result<Query<LotQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;
    let cars = state
        .service
        .list_history(field(query.parking_lot_id.as_ref()))
        .await?;
    Ok(Success::json(Cars { cars }))
}

/// `GET /blobs/*path?expires=&sig=`
pub async fn get_blob(
    State(state): Shared,
    Path(path): Path<String>,
    query: Result<Query<BlobQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query?;
    let (Some(expires), Some(sig)) = (query.expires, query.sig) else {
        return Err(SignatureError::Mismatch.into());
    };

    let backends = state.service.backends();
    backends
        .blobs
        .signer()
        .verify(&path, expires, &sig, backends.clock.now())?;

    match backends.blobs.get(&path).await? {
        Some(blob) => Ok(([(header::CONTENT_TYPE, blob.content_type)], blob.bytes).into_response()),
        None => Err(ApiError::new(
            StatusCode::NOT_FOUND,
            format!("blob not found: {path}"),
        )),
    }
}

/// `GET /health`
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Any unknown route.
pub async fn not_found() -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "route not found")
}
