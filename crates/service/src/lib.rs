//! Service layer: business operations over an injected document store.
//! - Testimonials with edit-token gated mutations.
//! - Append-only lead capture and best-effort checkout.
//! - Media uploads and the local media migration.

pub mod errors;
pub mod storage;
pub mod testimonials;
pub mod leads;
pub mod checkout;
pub mod media;
pub mod metrics;
pub mod runtime;
#[cfg(test)]
pub mod test_support;
