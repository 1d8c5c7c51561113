use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use service::media::MediaUploads;
use service::storage::{memory::MemoryStore, DocumentStore};
use tower::ServiceExt;

use server::routes;
use server::state::AppState;

fn app_with(store: Arc<dyn DocumentStore>) -> Router {
    app_with_upload_limit(store, 1024)
}

fn app_with_upload_limit(store: Arc<dyn DocumentStore>, max_bytes: usize) -> Router {
    let uploads_dir = std::env::temp_dir().join(format!("breezy_api_{}", uuid::Uuid::new_v4()));
    let uploads = MediaUploads::new(uploads_dir, max_bytes);
    let state = AppState::new(store, &configs::ShopConfig::default(), uploads);
    routes::build_router(state, tower_http::cors::CorsLayer::very_permissive())
}

fn app() -> Router {
    app_with(Arc::new(MemoryStore::new()))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            req = req.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let resp = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
    (status, json)
}

async fn upload(app: &Router, file_name: &str, content_type: &str, data: &str) -> axum::response::Response {
    let boundary = "breezyboundary";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n{data}\r\n--{boundary}--\r\n"
    );
    let req = Request::builder()
        .method(Method::POST)
        .uri("/testimonials/upload")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
        .body(Body::from(body))
        .unwrap();
    app.clone().oneshot(req).await.unwrap()
}

async fn create_testimonial(app: &Router, body: Value) -> (String, String) {
    let (status, json) = send(app, Method::POST, "/testimonials", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    let t = &json["testimonial"];
    (t["id"].as_str().unwrap().to_string(), t["editToken"].as_str().unwrap().to_string())
}

#[tokio::test]
async fn created_testimonial_token_is_absent_from_listing() {
    let app = app();
    let (status, json) = send(&app, Method::POST, "/testimonials", Some(json!({"text": "Great product", "rating": 5}))).await;
    assert_eq!(status, StatusCode::CREATED);
    let token = json["testimonial"]["editToken"].as_str().unwrap().to_string();
    assert_eq!(json["testimonial"]["name"], "Anonymous");
    assert_eq!(json["testimonial"]["role"], "Community Member");

    create_testimonial(&app, json!({"text": "Second", "rating": 4, "name": "Meera"})).await;

    let (status, list) = send(&app, Method::GET, "/testimonials", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["testimonials"].as_array().unwrap().len(), 2);
    let raw = list.to_string();
    assert!(!raw.contains(&token));
    assert!(!raw.contains("editToken"));
}

#[tokio::test]
async fn create_response_timestamp_matches_listing() {
    let app = app();
    let (_, created) = send(&app, Method::POST, "/testimonials", Some(json!({"text": "Great product", "rating": 5}))).await;
    let created_at = created["testimonial"]["createdAt"].as_str().unwrap().to_string();
    // RFC 3339 with exactly three fractional digits
    assert_eq!(created_at.len(), "2024-01-01T00:00:00.000Z".len(), "{created_at}");
    assert!(created_at.ends_with('Z'));

    let (_, list) = send(&app, Method::GET, "/testimonials", None).await;
    assert_eq!(list["testimonials"][0]["createdAt"], created_at.as_str());

    let (_, invite) = send(
        &app,
        Method::POST,
        "/campus-invites",
        Some(json!({
            "campusName": "IIT Delhi", "cityState": "Delhi", "contactName": "Asha",
            "contactEmail": "asha@example.com", "contactPhone": "98765"
        })),
    )
    .await;
    let (_, invites) = send(&app, Method::GET, "/campus-invites", None).await;
    assert_eq!(invites["invites"][0]["createdAt"], invite["invite"]["createdAt"]);
}

#[tokio::test]
async fn update_with_wrong_token_is_404_and_leaves_entity_unchanged() {
    let app = app();
    let (id, token) = create_testimonial(&app, json!({"text": "Great product", "rating": 5})).await;

    let (status, json) = send(
        &app,
        Method::PUT,
        "/testimonials",
        Some(json!({"id": id, "editToken": "not-the-token", "text": "hijacked"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let wrong_token_error = json["error"].clone();

    let (status, json) = send(
        &app,
        Method::PUT,
        "/testimonials",
        Some(json!({"id": "testimonial-unknown", "editToken": token, "text": "hijacked"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], wrong_token_error);

    let (_, list) = send(&app, Method::GET, "/testimonials", None).await;
    assert_eq!(list["testimonials"][0]["text"], "Great product");

    let (status, json) = send(
        &app,
        Method::PUT,
        "/testimonials",
        Some(json!({"id": id, "editToken": token, "text": "Even better", "rating": 4, "createdAt": "1999-01-01T00:00:00Z"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["testimonial"]["text"], "Even better");
    assert_eq!(json["testimonial"]["rating"], 4);
    assert!(json["testimonial"].get("editToken").is_none());
    assert_ne!(json["testimonial"]["createdAt"], "1999-01-01T00:00:00Z");
}

#[tokio::test]
async fn delete_is_token_gated_and_repeat_delete_is_404() {
    let app = app();
    let (id, token) = create_testimonial(&app, json!({"text": "Great product", "rating": 5})).await;

    let (status, _) = send(&app, Method::DELETE, &format!("/testimonials?id={id}&token=wrong"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::DELETE, &format!("/testimonials?id={id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) = send(&app, Method::DELETE, &format!("/testimonials?id={id}&token={token}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"success": true}));

    let (status, json) = send(&app, Method::DELETE, &format!("/testimonials?id={id}&token={token}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "testimonial not found or edit token invalid");

    let (status, json) = send(&app, Method::DELETE, "/testimonials", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "id is required");
}

#[tokio::test]
async fn testimonial_validation_errors_are_400() {
    let app = app();
    let (status, json) = send(&app, Method::POST, "/testimonials", Some(json!({"rating": 5}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "text is required");

    let (status, json) = send(&app, Method::POST, "/testimonials", Some(json!({"text": "ok", "rating": 9}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "rating must be between 1 and 5");

    let (status, json) = send(
        &app,
        Method::POST,
        "/testimonials",
        Some(json!({"text": "ok", "rating": 5, "media": [{"type": "image", "url": "blob:http://x/1"}]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().starts_with("media[0].url"));

    let req = Request::builder()
        .method(Method::POST)
        .uri("/testimonials")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::POST, "/testimonials", Some(json!({"text": "ok", "rating": "five"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn campus_invite_names_first_missing_field() {
    let app = app();
    let (status, json) = send(
        &app,
        Method::POST,
        "/campus-invites",
        Some(json!({"campusName": "IIT Delhi", "cityState": "", "contactEmail": "a@b.c"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "cityState is required");

    let complete = json!({
        "campusName": "IIT Delhi", "cityState": "Delhi", "contactName": "Asha",
        "contactEmail": "asha@example.com", "contactPhone": "98765"
    });
    for field in ["contactEmail", "contactPhone"] {
        let mut absent = complete.clone();
        absent.as_object_mut().unwrap().remove(field);
        let mut blank = complete.clone();
        blank[field] = json!("   ");
        for body in [absent, blank] {
            let (status, json) = send(&app, Method::POST, "/campus-invites", Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(json["error"], format!("{field} is required"));
        }
    }

    let (status, json) = send(
        &app,
        Method::POST,
        "/campus-invites",
        Some(json!({
            "campusName": "IIT Delhi", "cityState": "Delhi", "contactName": "Asha",
            "contactEmail": "asha@example.com", "contactPhone": "98765"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(json["invite"]["id"].as_str().unwrap().starts_with("campus-invite-"));

    let (_, list) = send(&app, Method::GET, "/campus-invites", None).await;
    assert_eq!(list["invites"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn orders_and_retailers_accept_anything_and_list_newest_first() {
    let app = app();
    let (status, first) = send(&app, Method::POST, "/orders", Some(json!({}))).await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, second) = send(&app, Method::POST, "/orders", Some(json!({"product": "pads", "qty": 2}))).await;
    assert_eq!(second["order"]["qty"], 2);
    assert_eq!(second["order"]["status"], "received");
    let (_, paid) = send(&app, Method::POST, "/orders", Some(json!({"product": "pads", "status": "paid"}))).await;
    assert_eq!(paid["order"]["status"], "paid");

    let (_, list) = send(&app, Method::GET, "/orders", None).await;
    let orders = list["orders"].as_array().unwrap();
    assert_eq!(orders[0]["id"], paid["order"]["id"]);
    assert_eq!(orders[1]["id"], second["order"]["id"]);
    assert_eq!(orders[2]["id"], first["order"]["id"]);

    let (status, json) = send(&app, Method::POST, "/retailers", Some(json!({"storeName": "Corner"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["enquiry"]["storeName"], "Corner");
    let (_, list) = send(&app, Method::GET, "/retailers", None).await;
    assert_eq!(list["enquiries"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn checkout_prices_from_config() {
    let app = app();
    let (status, json) = send(
        &app,
        Method::POST,
        "/checkout",
        Some(json!({"size": "XL", "paymentMethod": "cod", "customer": {"name": "Riya", "phone": "98765", "address": "Pune"}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["persisted"], true);
    assert_eq!(json["order"]["price"], 199);
    assert_eq!(json["order"]["currency"], "INR");

    let (status, json) = send(&app, Method::POST, "/checkout", Some(json!({"customer": {"name": "Riya"}}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "customer.phone is required");
}

#[tokio::test]
async fn upload_stores_file_and_serves_it_back() {
    let app = app();
    let boundary = "breezyboundary";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"p.png\"\r\nContent-Type: image/png\r\n\r\nPNGDATA\r\n--{boundary}--\r\n"
    );
    let req = Request::builder()
        .method(Method::POST)
        .uri("/testimonials/upload")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
        .body(Body::from(body))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json: Value = serde_json::from_slice(&to_bytes(resp.into_body(), usize::MAX).await.unwrap()).unwrap();
    assert_eq!(json["type"], "image");
    assert!(json["dataUrl"].as_str().unwrap().starts_with("data:image/png;base64,"));
    let url = json["url"].as_str().unwrap().to_string();
    assert!(url.starts_with("/uploads/testimonials/"));

    let resp = app
        .clone()
        .oneshot(Request::builder().uri(&url).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(&to_bytes(resp.into_body(), usize::MAX).await.unwrap()[..], b"PNGDATA");
}

#[tokio::test]
async fn upload_rejects_non_media_and_missing_file() {
    let app = app();
    let boundary = "b0";
    let text_part = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"a.txt\"\r\nContent-Type: text/plain\r\n\r\nhello\r\n--{boundary}--\r\n"
    );
    let other_part = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--{boundary}--\r\n"
    );
    for body in [text_part, other_part] {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/testimonials/upload")
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
            .body(Body::from(body))
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn health_reports_backend_and_docs_are_served() {
    let app = app();
    let (status, json) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"status": "ok", "storage": "memory"}));

    let (status, json) = send(&app, Method::GET, "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["paths"].get("/testimonials").is_some());

    let resp = app
        .clone()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn served_uploads_are_never_markup() {
    let app = app();
    let resp = upload(&app, "x.html", "image/png", "<script>alert(1)</script>").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json: Value = serde_json::from_slice(&to_bytes(resp.into_body(), usize::MAX).await.unwrap()).unwrap();
    let url = json["url"].as_str().unwrap().to_string();
    assert!(url.ends_with(".png"), "stored as {url}");

    let resp = app
        .clone()
        .oneshot(Request::builder().uri(&url).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let served_as = resp.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert_eq!(served_as, "image/png");
    assert!(!served_as.contains("html") && !served_as.contains("svg"));
    assert_eq!(resp.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");

    for (name, content_type) in [("x.svg", "image/svg+xml"), ("x.html", "text/html"), ("x.png", "application/xhtml+xml")] {
        let resp = upload(&app, name, content_type, "<svg onload=alert(1)/>").await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{content_type} accepted");
    }
}

#[tokio::test]
async fn testimonial_can_carry_an_inlined_upload() {
    let app = app_with_upload_limit(Arc::new(MemoryStore::new()), 4 * 1024 * 1024);
    let data_url = format!("data:image/png;base64,{}", "A".repeat(3 * 1024 * 1024));
    let (status, json) = send(
        &app,
        Method::POST,
        "/testimonials",
        Some(json!({"text": "Photo attached", "rating": 5, "media": [{"type": "image", "url": data_url}]})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    assert_eq!(json["testimonial"]["media"][0]["url"].as_str().unwrap().len(), data_url.len());
}

#[tokio::test]
async fn oversized_testimonial_body_is_413() {
    let app = app();
    let filler = "A".repeat(routes::testimonial_body_limit(1024) + 1);
    let (status, json) = send(&app, Method::POST, "/testimonials", Some(json!({"text": filler, "rating": 5}))).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(json["error"].as_str().unwrap().starts_with("invalid JSON body"));
}
