//! Ingestion pipeline for both catalog entities.
//!
//! Every write walks the same path: structural validation, duplicate-id
//! rejection, derived-field enrichment, then a single engine write.
//! Enrichment failures occur strictly before the write, so a rejected
//! document never leaves partial state behind.

pub mod enrich;
pub mod service;

pub use service::CatalogService;
