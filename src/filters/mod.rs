//! Derivation of export rules into executable source filters.
//!
//! Each [`ExportSettings`](crate::models::ExportSettings) rule is compiled once into a
//! [`RuntimeExportSettings`], which owns a [`SourceFilter`] built from the rule's
//! `pathOpts`:
//!
//! - source directory containment (direct children or any descendant)
//! - an optional case-insensitive extension allow-list
//! - built-in filters (the double extension blocker)
//! - user text filters, literal or regex, each a [`CompiledFilter`]
//!
//! Compilation never fails. A text filter whose pattern or flags cannot be parsed is
//! logged and compiled to a filter that rejects every file, so a single bad entry only
//! disables its own rule.

pub mod compiled;
pub mod runtime;
pub mod source;

pub use compiled::{CompiledFilter, FilterError, has_double_extension};
pub use runtime::{RuntimeExportSettings, convert_all_to_runtime};
pub use source::SourceFilter;
