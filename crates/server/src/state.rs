use std::sync::Arc;

use service::checkout::CheckoutService;
use service::leads::LeadService;
use service::media::MediaUploads;
use service::storage::DocumentStore;
use service::testimonials::TestimonialService;

/// Shared handler state. Every service holds the same injected store.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub testimonials: TestimonialService,
    pub leads: LeadService,
    pub checkout: CheckoutService,
    pub uploads: MediaUploads,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, shop: &configs::ShopConfig, uploads: MediaUploads) -> Self {
        Self {
            testimonials: TestimonialService::new(store.clone()),
            leads: LeadService::new(store.clone()),
            checkout: CheckoutService::new(store.clone(), service::checkout::catalogue_from(shop)),
            uploads,
            store,
        }
    }
}
