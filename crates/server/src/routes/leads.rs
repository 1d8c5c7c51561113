use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use models::document::Document;
use models::lead::LeadKind;
use serde_json::Value;
use tracing::info;

use crate::errors::JsonApiError;
use crate::state::AppState;

fn wrap(key: &str, value: Value) -> Json<Document> {
    let mut body = Document::new();
    body.insert(key.to_string(), value);
    Json(body)
}

async fn list_kind(state: &AppState, kind: LeadKind) -> Result<Json<Document>, JsonApiError> {
    let records = state.leads.list(kind).await?;
    info!(kind = kind.plural(), count = records.len(), "list leads");
    Ok(wrap(kind.plural(), Value::Array(records.into_iter().map(Value::Object).collect())))
}

async fn create_kind(
    state: &AppState,
    kind: LeadKind,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Document>), JsonApiError> {
    let Json(body) = payload?;
    let record = state.leads.create(kind, body).await?;
    Ok((StatusCode::CREATED, wrap(kind.singular(), Value::Object(record))))
}

#[utoipa::path(get, path = "/orders", tag = "leads",
    responses((status = 200, description = "`{orders: [...]}`, newest first", body = crate::openapi::LeadListDoc)))]
pub async fn list_orders(State(state): State<AppState>) -> Result<Json<Document>, JsonApiError> {
    list_kind(&state, LeadKind::Order).await
}

#[utoipa::path(post, path = "/orders", tag = "leads", request_body = crate::openapi::LeadDoc,
    responses((status = 201, description = "`{order}`; any fields accepted", body = crate::openapi::LeadDoc)))]
pub async fn create_order(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Document>), JsonApiError> {
    create_kind(&state, LeadKind::Order, payload).await
}

#[utoipa::path(get, path = "/retailers", tag = "leads",
    responses((status = 200, description = "`{enquiries: [...]}`, newest first", body = crate::openapi::LeadListDoc)))]
pub async fn list_retailers(State(state): State<AppState>) -> Result<Json<Document>, JsonApiError> {
    list_kind(&state, LeadKind::RetailerEnquiry).await
}

#[utoipa::path(post, path = "/retailers", tag = "leads", request_body = crate::openapi::LeadDoc,
    responses((status = 201, description = "`{enquiry}`; any fields accepted", body = crate::openapi::LeadDoc)))]
pub async fn create_retailer(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Document>), JsonApiError> {
    create_kind(&state, LeadKind::RetailerEnquiry, payload).await
}

#[utoipa::path(get, path = "/campus-invites", tag = "leads",
    responses((status = 200, description = "`{invites: [...]}`, newest first", body = crate::openapi::LeadListDoc)))]
pub async fn list_campus_invites(State(state): State<AppState>) -> Result<Json<Document>, JsonApiError> {
    list_kind(&state, LeadKind::CampusInvite).await
}

#[utoipa::path(post, path = "/campus-invites", tag = "leads", request_body = crate::openapi::CampusInviteDoc,
    responses(
        (status = 201, description = "`{invite}`", body = crate::openapi::LeadDoc),
        (status = 400, description = "First missing required field", body = crate::openapi::ErrorDoc)
    ))]
pub async fn create_campus_invite(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Document>), JsonApiError> {
    create_kind(&state, LeadKind::CampusInvite, payload).await
}
