//! OpenAPI document. Schemas here mirror the JSON shapes of the handlers;
//! the domain types themselves stay free of documentation derives.

use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

#[derive(Serialize, ToSchema)]
pub struct ErrorDoc {
    pub error: String,
}

#[derive(Serialize, ToSchema)]
pub struct HealthDoc {
    pub status: String,
    /// `memory`, `file` or `postgres`.
    pub storage: String,
}

#[derive(Serialize, ToSchema)]
pub struct SuccessDoc {
    pub success: bool,
}

#[derive(Serialize, ToSchema)]
pub struct MediaItemDoc {
    /// `image` or `video`.
    #[serde(rename = "type")]
    pub kind: String,
    /// `/uploads/...`, `data:` or `http(s)` locator.
    pub url: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicTestimonialDoc {
    pub id: String,
    pub name: String,
    pub role: String,
    pub text: String,
    pub avatar: String,
    pub rating: u8,
    pub media: Vec<MediaItemDoc>,
    pub created_at: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestimonialDoc {
    pub id: String,
    /// Keep this: it is the only way to edit or delete the testimonial later.
    pub edit_token: String,
    pub name: String,
    pub role: String,
    pub text: String,
    pub avatar: String,
    pub rating: u8,
    pub media: Vec<MediaItemDoc>,
    pub created_at: String,
}

#[derive(Serialize, ToSchema)]
pub struct TestimonialListDoc {
    pub testimonials: Vec<PublicTestimonialDoc>,
}

#[derive(Serialize, ToSchema)]
pub struct CreatedTestimonialDoc {
    pub testimonial: TestimonialDoc,
}

#[derive(Serialize, ToSchema)]
pub struct PublicTestimonialBodyDoc {
    pub testimonial: PublicTestimonialDoc,
}

#[derive(Serialize, ToSchema)]
pub struct TestimonialInputDoc {
    pub name: Option<String>,
    pub role: Option<String>,
    pub text: String,
    /// 1 to 5.
    pub rating: u8,
    pub avatar: Option<String>,
    pub media: Option<Vec<MediaItemDoc>>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestimonialUpdateDoc {
    pub id: String,
    pub edit_token: String,
    pub name: Option<String>,
    pub role: Option<String>,
    pub text: Option<String>,
    pub rating: Option<u8>,
    pub avatar: Option<String>,
    pub media: Option<Vec<MediaItemDoc>>,
}

#[derive(Serialize, ToSchema)]
pub struct UploadDoc {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadedMediaDoc {
    pub url: String,
    pub data_url: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Lead record: server-set `id` and `createdAt` plus the submitted fields.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadDoc {
    pub id: String,
    pub created_at: String,
}

#[derive(Serialize, ToSchema)]
pub struct LeadListDoc {
    pub items: Vec<LeadDoc>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CampusInviteDoc {
    pub campus_name: String,
    pub city_state: String,
    pub contact_name: String,
    pub contact_role: Option<String>,
    pub contact_email: String,
    pub contact_phone: String,
    pub preferred_month: Option<String>,
    pub campus_note: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct CustomerDoc {
    pub name: String,
    pub phone: String,
    pub address: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequestDoc {
    pub size: Option<String>,
    /// `cod` (default) or `online`.
    pub payment_method: Option<String>,
    pub customer: CustomerDoc,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrderDoc {
    pub id: String,
    pub created_at: String,
    pub status: String,
    pub product: String,
    pub size: String,
    pub price: u32,
    pub currency: String,
    pub payment_method: String,
    pub customer: CustomerDoc,
}

#[derive(Serialize, ToSchema)]
pub struct CheckoutResponseDoc {
    pub success: bool,
    pub order: PlacedOrderDoc,
    pub persisted: bool,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::ops::health,
        crate::routes::testimonials::list,
        crate::routes::testimonials::create,
        crate::routes::testimonials::update,
        crate::routes::testimonials::delete,
        crate::routes::upload::upload,
        crate::routes::leads::list_orders,
        crate::routes::leads::create_order,
        crate::routes::leads::list_retailers,
        crate::routes::leads::create_retailer,
        crate::routes::leads::list_campus_invites,
        crate::routes::leads::create_campus_invite,
        crate::routes::checkout::checkout,
    ),
    components(
        schemas(
            ErrorDoc,
            HealthDoc,
            SuccessDoc,
            MediaItemDoc,
            PublicTestimonialDoc,
            TestimonialDoc,
            TestimonialListDoc,
            CreatedTestimonialDoc,
            PublicTestimonialBodyDoc,
            TestimonialInputDoc,
            TestimonialUpdateDoc,
            UploadDoc,
            UploadedMediaDoc,
            LeadDoc,
            LeadListDoc,
            CampusInviteDoc,
            CustomerDoc,
            CheckoutRequestDoc,
            PlacedOrderDoc,
            CheckoutResponseDoc,
        )
    ),
    tags(
        (name = "ops"),
        (name = "testimonials"),
        (name = "leads"),
        (name = "checkout")
    )
)]
pub struct ApiDoc;
