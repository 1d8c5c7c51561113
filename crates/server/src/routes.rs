pub mod checkout;
pub mod leads;
pub mod ops;
pub mod testimonials;
pub mod upload;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    set_header::SetResponseHeaderLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::openapi::ApiDoc;
use crate::state::AppState;

// Room for multipart boundaries and headers around the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;
// Room for the rest of a testimonial around its inlined media.
const JSON_OVERHEAD: usize = 64 * 1024;

/// Largest testimonial body: one upload inlined as a base64 data URL.
pub fn testimonial_body_limit(max_upload_bytes: usize) -> usize {
    max_upload_bytes.div_ceil(3) * 4 + JSON_OVERHEAD
}

/// Build the full application router: storefront API, uploads, ops and docs.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let upload_limit = state.uploads.max_bytes() + MULTIPART_OVERHEAD;
    let testimonial_limit = testimonial_body_limit(state.uploads.max_bytes());

    // served with the stored type only, never sniffed
    let uploads = Router::new()
        .nest_service("/uploads", ServeDir::new(state.uploads.root()))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ));

    let api = Router::new()
        .route(
            "/testimonials",
            get(testimonials::list)
                .post(testimonials::create)
                .put(testimonials::update)
                .delete(testimonials::delete)
                .layer(DefaultBodyLimit::max(testimonial_limit)),
        )
        .route(
            "/testimonials/upload",
            post(upload::upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/orders", get(leads::list_orders).post(leads::create_order))
        .route("/retailers", get(leads::list_retailers).post(leads::create_retailer))
        .route(
            "/campus-invites",
            get(leads::list_campus_invites).post(leads::create_campus_invite),
        )
        .route("/checkout", post(checkout::checkout));

    let operational = Router::new()
        .route("/health", get(ops::health))
        .route("/metrics", get(ops::metrics));

    Router::new()
        .merge(api)
        .merge(operational)
        .merge(uploads)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 5xx
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
