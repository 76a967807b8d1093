//! In-memory query engine over the labeled text-emotion corpus.
//!
//! The dataset is loaded once into a [`QueryEngine`], which then answers
//! four read-only queries: random samples, per-emotion counts, substring
//! search and the overall label distribution. [`tools`] exposes the same
//! queries as JSON tool calls for an external transport.

pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod tools;

pub use config::EngineConfig;
pub use data::loader::{FileSource, LoadOptions, RecordSource};
pub use data::model::{Dataset, Emotion, RawRecord, Record};
pub use engine::QueryEngine;
pub use error::{EngineError, Result};
