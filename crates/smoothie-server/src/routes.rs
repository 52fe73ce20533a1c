//! HTTP routes
//!
//! | Method | Path                          | Body / query              | Success            |
//! |--------|-------------------------------|---------------------------|--------------------|
//! | GET    | `/health`                     |                           | 200                |
//! | GET    | `/ingredients`                |                           | 200 `[Ingredient]` |
//! | GET    | `/nutrition?ingredient=NAME`  |                           | 200 facts          |
//! | POST   | `/orders`                     | `PlaceOrderRequest`       | 201 receipt        |
//! | GET    | `/orders/pending`             |                           | 200 `[Order]`      |
//! | POST   | `/orders/updates`             | `[{id, filled}]`          | 200 merge outcome  |
//!
//! Every error answers with an [`ErrorBody`].

use crate::dto::{ErrorBody, HealthBody, NutritionQuery, PlaceOrderRequest};
use serde::Serialize;
use smoothie_core::{LookupError, OrderEdit, Shop, ShopError};
use std::convert::Infallible;
use std::sync::Arc;
use uuid::Uuid;
use warp::http::StatusCode;
use warp::reply::{Json, WithStatus};
use warp::{Filter, Rejection, Reply};

/// Largest accepted JSON body
const MAX_BODY_BYTES: u64 = 16 * 1024;

/// All routes, with rejection recovery and a per-request tracing span
pub fn routes(shop: Arc<Shop>) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let health = warp::path!("health")
        .and(warp::get())
        .map(|| warp::reply::json(&HealthBody { status: "ok" }));

    let ingredients = warp::path!("ingredients")
        .and(warp::get())
        .and(with_shop(shop.clone()))
        .and_then(list_ingredients);

    let nutrition = warp::path!("nutrition")
        .and(warp::get())
        .and(warp::query::<NutritionQuery>())
        .and(with_shop(shop.clone()))
        .and_then(ingredient_nutrition);

    let place = warp::path!("orders")
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and(with_shop(shop.clone()))
        .and_then(place_order);

    let pending = warp::path!("orders" / "pending")
        .and(warp::get())
        .and(with_shop(shop.clone()))
        .and_then(pending_orders);

    let updates = warp::path!("orders" / "updates")
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and(with_shop(shop))
        .and_then(submit_updates);

    health
        .or(ingredients)
        .or(nutrition)
        .or(place)
        .or(pending)
        .or(updates)
        .recover(handle_rejection)
        .with(warp::trace(|info| {
            tracing::info_span!(
                "request",
                request_id = %Uuid::new_v4(),
                method = %info.method(),
                path = %info.path()
            )
        }))
}

fn with_shop(shop: Arc<Shop>) -> impl Filter<Extract = (Arc<Shop>,), Error = Infallible> + Clone {
    warp::any().map(move || shop.clone())
}

async fn list_ingredients(shop: Arc<Shop>) -> Result<WithStatus<Json>, Infallible> {
    Ok(respond(shop.ingredients().await, StatusCode::OK))
}

async fn ingredient_nutrition(
    query: NutritionQuery,
    shop: Arc<Shop>,
) -> Result<WithStatus<Json>, Infallible> {
    Ok(respond(shop.nutrition(&query.ingredient).await, StatusCode::OK))
}

async fn place_order(
    request: PlaceOrderRequest,
    shop: Arc<Shop>,
) -> Result<WithStatus<Json>, Infallible> {
    let result = shop
        .place_order(&request.customer_name, &request.ingredients)
        .await;
    Ok(respond(result, StatusCode::CREATED))
}

async fn pending_orders(shop: Arc<Shop>) -> Result<WithStatus<Json>, Infallible> {
    Ok(respond(shop.pending().await, StatusCode::OK))
}

async fn submit_updates(
    edits: Vec<OrderEdit>,
    shop: Arc<Shop>,
) -> Result<WithStatus<Json>, Infallible> {
    Ok(respond(shop.submit_updates(&edits).await, StatusCode::OK))
}

fn respond<T: Serialize>(result: Result<T, ShopError>, ok: StatusCode) -> WithStatus<Json> {
    match result {
        Ok(value) => warp::reply::with_status(warp::reply::json(&value), ok),
        Err(err) => error_reply(&err),
    }
}

/// HTTP status for a shop error
#[must_use]
pub fn status_for(err: &ShopError) -> StatusCode {
    match err {
        ShopError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ShopError::Persistence(_) | ShopError::Lookup(LookupError::Disabled) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        ShopError::Lookup(LookupError::NotFound(_)) => StatusCode::NOT_FOUND,
        ShopError::Lookup(_) => StatusCode::BAD_GATEWAY,
    }
}

fn error_reply(err: &ShopError) -> WithStatus<Json> {
    let status = status_for(err);
    if err.is_persistence() {
        tracing::error!("Request failed: {}", err);
    } else {
        tracing::info!("Request rejected: {}", err);
    }
    let body = ErrorBody::new(err.kind(), err.to_string());
    warp::reply::with_status(warp::reply::json(&body), status)
}

async fn handle_rejection(rejection: Rejection) -> Result<WithStatus<Json>, Infallible> {
    let (status, kind, message) = if rejection.is_not_found() {
        (StatusCode::NOT_FOUND, "not_found", "no such route".to_string())
    } else if let Some(e) = rejection.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, "bad_request", e.to_string())
    } else if let Some(e) = rejection.find::<warp::reject::InvalidQuery>() {
        (StatusCode::BAD_REQUEST, "bad_request", e.to_string())
    } else if rejection.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "bad_request", "request body too large".to_string())
    } else if rejection.find::<warp::reject::LengthRequired>().is_some() {
        (StatusCode::LENGTH_REQUIRED, "bad_request", "content length required".to_string())
    } else if rejection.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "bad_request", "method not allowed".to_string())
    } else {
        tracing::error!("Unhandled rejection: {:?}", rejection);
        (StatusCode::INTERNAL_SERVER_ERROR, "internal", "internal error".to_string())
    };

    let body = ErrorBody::new(kind, message);
    Ok(warp::reply::with_status(warp::reply::json(&body), status))
}
