use once_cell::sync::Lazy;
use prometheus::{
    register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec, TextEncoder,
};

// Prometheus metrics (default registry)
pub static TESTIMONIALS_CREATED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("breezy_testimonials_created_total", "Testimonials created")
        .expect("register testimonials_created_total")
});

pub static TESTIMONIALS_UPDATED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("breezy_testimonials_updated_total", "Testimonials updated by their owner")
        .expect("register testimonials_updated_total")
});

pub static TESTIMONIALS_DELETED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("breezy_testimonials_deleted_total", "Testimonials deleted by their owner")
        .expect("register testimonials_deleted_total")
});

pub static MUTATIONS_REJECTED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "breezy_testimonial_mutations_rejected_total",
        "Updates/deletes refused because id and edit token did not match"
    )
    .expect("register mutations_rejected_total")
});

pub static LEADS_CREATED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!("breezy_leads_created_total", "Lead records captured", &["kind"])
        .expect("register leads_created_total")
});

pub static BEST_EFFORT_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "breezy_best_effort_persist_failures_total",
        "Storage failures swallowed by best-effort flows"
    )
    .expect("register best_effort_failures_total")
});

/// Register every metric so `/metrics` lists them before first use.
pub fn init() {
    Lazy::force(&TESTIMONIALS_CREATED_TOTAL);
    Lazy::force(&TESTIMONIALS_UPDATED_TOTAL);
    Lazy::force(&TESTIMONIALS_DELETED_TOTAL);
    Lazy::force(&MUTATIONS_REJECTED_TOTAL);
    Lazy::force(&LEADS_CREATED_TOTAL);
    Lazy::force(&BEST_EFFORT_FAILURES_TOTAL);
}

pub fn encode_metrics() -> (axum::http::StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (
        axum::http::StatusCode::OK,
        String::from_utf8(buffer).unwrap_or_default(),
    )
}
