use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use models::checkout::{CheckoutRequest, PlacedOrder};
use serde::Serialize;

use crate::errors::JsonApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub success: bool,
    pub order: PlacedOrder,
    pub persisted: bool,
}

#[utoipa::path(
    post,
    path = "/checkout",
    tag = "checkout",
    request_body = crate::openapi::CheckoutRequestDoc,
    responses(
        (status = 200, description = "Order accepted; `persisted` is false if storage failed", body = crate::openapi::CheckoutResponseDoc),
        (status = 400, description = "Missing customer details, unknown size or payment method", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn checkout(
    State(state): State<AppState>,
    payload: Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<Json<CheckoutResponse>, JsonApiError> {
    let Json(request) = payload?;
    let receipt = state.checkout.place_order(request).await?;
    Ok(Json(CheckoutResponse { success: true, order: receipt.order, persisted: receipt.persisted }))
}
