use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    Json,
};
use common::types::Success;
use models::testimonial::{PublicTestimonial, Testimonial, TestimonialInput, TestimonialPatch, EDIT_TOKEN_FIELD};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::errors::JsonApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TestimonialList {
    pub testimonials: Vec<PublicTestimonial>,
}

#[derive(Debug, Serialize)]
pub struct TestimonialBody<T> {
    pub testimonial: T,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    pub id: Option<String>,
    pub token: Option<String>,
}

fn take_string(body: &mut serde_json::Map<String, Value>, key: &str) -> String {
    match body.remove(key) {
        Some(Value::String(s)) => s,
        _ => String::new(),
    }
}

#[utoipa::path(
    get,
    path = "/testimonials",
    tag = "testimonials",
    responses((status = 200, description = "All testimonials, newest first, without edit tokens", body = crate::openapi::TestimonialListDoc))
)]
pub async fn list(State(state): State<AppState>) -> Result<Json<TestimonialList>, JsonApiError> {
    let testimonials = state.testimonials.list().await?;
    info!(count = testimonials.len(), "list testimonials");
    Ok(Json(TestimonialList { testimonials }))
}

#[utoipa::path(
    post,
    path = "/testimonials",
    tag = "testimonials",
    request_body = crate::openapi::TestimonialInputDoc,
    responses(
        (status = 201, description = "Created; the only response carrying the edit token", body = crate::openapi::CreatedTestimonialDoc),
        (status = 400, description = "Validation error", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<TestimonialInput>, JsonRejection>,
) -> Result<(StatusCode, Json<TestimonialBody<Testimonial>>), JsonApiError> {
    let Json(input) = payload?;
    let testimonial = state.testimonials.create(input).await?;
    Ok((StatusCode::CREATED, Json(TestimonialBody { testimonial })))
}

#[utoipa::path(
    put,
    path = "/testimonials",
    tag = "testimonials",
    request_body = crate::openapi::TestimonialUpdateDoc,
    responses(
        (status = 200, description = "Updated testimonial, without edit token", body = crate::openapi::PublicTestimonialBodyDoc),
        (status = 400, description = "Validation error", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Unknown id or wrong edit token", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn update(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<TestimonialBody<PublicTestimonial>>, JsonApiError> {
    let Json(body) = payload?;
    let Value::Object(mut body) = body else {
        return Err(JsonApiError::bad_request("request body must be a JSON object"));
    };
    let id = take_string(&mut body, "id");
    let token = take_string(&mut body, EDIT_TOKEN_FIELD);
    let patch: TestimonialPatch =
        serde_json::from_value(Value::Object(body)).map_err(|e| JsonApiError::bad_request(e.to_string()))?;
    let testimonial = state.testimonials.update(&id, &token, patch).await?;
    Ok(Json(TestimonialBody { testimonial }))
}

#[utoipa::path(
    delete,
    path = "/testimonials",
    tag = "testimonials",
    params(
        ("id" = String, Query, description = "Testimonial id"),
        ("token" = String, Query, description = "Edit token returned at creation")
    ),
    responses(
        (status = 200, description = "Deleted", body = crate::openapi::SuccessDoc),
        (status = 400, description = "Missing id", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Unknown id or wrong edit token", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn delete(
    State(state): State<AppState>,
    Query(q): Query<DeleteQuery>,
) -> Result<Json<Success>, JsonApiError> {
    let id = q.id.unwrap_or_default();
    let token = q.token.unwrap_or_default();
    state.testimonials.delete(&id, &token).await?;
    Ok(Json(Success::OK))
}
