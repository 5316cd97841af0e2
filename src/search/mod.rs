//! Query compilation and search-engine access.
//!
//! The module is split along the boundary the rest of the crate relies on:
//!
//! - [`query`]: the engine-agnostic query tree produced by compilation,
//!   including the two named ranking combinators (summed-OR and
//!   best-branch-plus-fraction).
//! - [`compiler`]: per-field matching strategies and the translation of
//!   typed, optional search parameters into one query tree per request.
//! - [`document`]: per-collection index schemas and the mapping between
//!   stored JSON documents and engine documents.
//! - [`gateway`]: the [`gateway::IndexGateway`] abstraction over the search
//!   engine and its tantivy-backed implementation. Only this module and
//!   [`document`] may name engine types.

pub mod compiler;
pub mod document;
pub mod gateway;
pub mod query;

pub use compiler::{
    compile_course, compile_timetable, CourseSearchParams, TimetableSearchParams, PAGE_SIZE,
};
pub use gateway::{Collection, Hit, IndexGateway, TantivyGateway};
pub use query::{Page, QueryNode, TermValue};
