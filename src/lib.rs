//! Catalog search service for university courses and timetables.
//!
//! Two document collections are indexed and searched through an external
//! document search engine held behind [`search::gateway::IndexGateway`]:
//!
//! - **Query compilation**: loosely structured, typed search parameters are
//!   compiled into a single weighted query tree per request
//!   ([`search::compiler`]).
//! - **Ingestion**: inbound documents are validated against a closed
//!   structural schema ([`schema`]), checked for duplicate ids, enriched
//!   with derived fields and cross-entity summaries ([`ingest`]), then
//!   written with the configured visibility mode.
//! - **API**: `search`/`add`/`remove` per entity over HTTP ([`api`]).

pub mod api;
pub mod config;
pub mod error;
pub mod ingest;
pub mod models;
pub mod schema;
pub mod search;
