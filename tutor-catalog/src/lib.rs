//! tutor-catalog: Knowledge catalog for the tutor learning engine
//!
//! This crate defines the data model shared by the orchestration engine and
//! any transport layer:
//!
//! - **Subjects and items** - [`Subject`] and [`KnowledgeItem`] for teachable units
//! - **Questions** - [`Question`] and [`QuestionType`] with answer keys and rubrics
//! - **Catalog access** - [`KnowledgeCatalog`] trait and [`MemoryCatalog`] for
//!   read-mostly lookup of items and question banks
//!
//! The engine treats the catalog as read-only; administrative writes happen
//! through [`MemoryCatalog::add_item`] / [`MemoryCatalog::add_question`]
//! outside the learning loop.

pub mod catalog;
pub mod error;
pub mod types;

// Re-export key types for convenience
pub use catalog::{KnowledgeCatalog, MemoryCatalog};
pub use error::CatalogError;
pub use types::{KnowledgeItem, Question, QuestionFilter, QuestionType, Subject};
