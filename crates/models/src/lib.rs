//! Domain types for the storefront backend.
//! - `document`: the JSON document vocabulary every storage backend speaks
//! - `testimonial`, `lead`, `checkout`: entities and their validation
//! - `stored_document` / `db`: SeaORM entity and connection for Postgres

pub mod errors;
pub mod db;
pub mod document;
pub mod stored_document;
pub mod testimonial;
pub mod lead;
pub mod checkout;
