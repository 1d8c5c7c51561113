use std::sync::Arc;

use models::document::{Collection, Filter};
use models::testimonial::{
    PublicTestimonial, Testimonial, TestimonialInput, TestimonialPatch, EDIT_TOKEN_FIELD,
};
use tracing::{info, instrument, warn};

use crate::errors::ServiceError;
use crate::metrics;
use crate::storage::DocumentStore;

/// Testimonial CRUD. Reads are always redacted; writes are gated by the
/// edit token minted at creation.
#[derive(Clone)]
pub struct TestimonialService {
    store: Arc<dyn DocumentStore>,
}

impl TestimonialService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Validate and insert. The returned value is the only place the edit
    /// token is ever handed out.
    #[instrument(skip_all)]
    pub async fn create(&self, input: TestimonialInput) -> Result<Testimonial, ServiceError> {
        let testimonial = input.into_testimonial()?;
        self.store
            .insert(Collection::Testimonials, testimonial.to_document()?)
            .await?;
        metrics::TESTIMONIALS_CREATED_TOTAL.inc();
        info!(id = %testimonial.id, rating = testimonial.rating.get(), "testimonial created");
        Ok(testimonial)
    }

    /// Newest first, tokens stripped.
    #[instrument(skip_all)]
    pub async fn list(&self) -> Result<Vec<PublicTestimonial>, ServiceError> {
        let docs = self.store.find_all(Collection::Testimonials).await?;
        Ok(docs
            .into_iter()
            .filter_map(|doc| {
                let id = models::document::id_of(&doc).unwrap_or("<none>").to_string();
                match PublicTestimonial::from_document(doc) {
                    Ok(t) => Some(t),
                    Err(e) => {
                        warn!(%id, error = %e, "skipping unreadable testimonial");
                        None
                    }
                }
            })
            .collect())
    }

    /// Apply `patch` to the testimonial matching both `id` and `token`.
    #[instrument(skip(self, token, patch))]
    pub async fn update(
        &self,
        id: &str,
        token: &str,
        patch: TestimonialPatch,
    ) -> Result<PublicTestimonial, ServiceError> {
        let id = require_id(id)?;
        let set = patch.into_document()?;
        let updated = self
            .store
            .find_one_and_update(Collection::Testimonials, &owner_filter(id, token), set)
            .await?;
        let Some(doc) = updated else {
            metrics::MUTATIONS_REJECTED_TOTAL.inc();
            return Err(ServiceError::not_found_or_unauthorized());
        };
        let public = PublicTestimonial::from_document(doc)
            .map_err(|e| ServiceError::Db(format!("updated testimonial {id} is unreadable: {e}")))?;
        metrics::TESTIMONIALS_UPDATED_TOTAL.inc();
        info!("testimonial updated");
        Ok(public)
    }

    /// Remove the testimonial matching both `id` and `token`.
    #[instrument(skip(self, token))]
    pub async fn delete(&self, id: &str, token: &str) -> Result<(), ServiceError> {
        let id = require_id(id)?;
        let removed = self
            .store
            .delete_one(Collection::Testimonials, &owner_filter(id, token))
            .await?;
        if removed == 0 {
            metrics::MUTATIONS_REJECTED_TOTAL.inc();
            return Err(ServiceError::not_found_or_unauthorized());
        }
        metrics::TESTIMONIALS_DELETED_TOTAL.inc();
        info!("testimonial deleted");
        Ok(())
    }
}

fn require_id(id: &str) -> Result<&str, ServiceError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ServiceError::Validation("id is required".into()));
    }
    Ok(id)
}

// An empty token still goes through the store so both failure paths look the same.
fn owner_filter(id: &str, token: &str) -> Filter {
    Filter::by_id(id).eq_secret(EDIT_TOKEN_FIELD, token)
}
