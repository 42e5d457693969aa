//! Pipeline stages for one archiving run.
//!
//! - `window`: target-day selection
//! - `select`: best-submission dedup
//! - `render`: markdown record rendering
//! - `index`: archive index parse/merge/serialize
//! - `run`: orchestration

pub mod index;
pub mod render;
pub mod run;
pub mod select;
pub mod window;

pub use run::{publish_index, run_pipeline, RunOutcome};
