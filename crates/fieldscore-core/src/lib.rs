//! # fieldscore-core
//!
//! Structural accuracy scoring for JSON produced by LLM extraction calls.
//!
//! Given an *expected* tree (the ground-truth fixture) and a *generated* tree (what a
//! model returned), [`score`] walks both in lockstep, gives every expected leaf a
//! verdict, and reports how many matched together with an ordered trace of every
//! comparison. Matching is structural and value-exact, except that strings compare
//! case-insensitively.
//!
//! ## Quick start
//!
//! ```rust
//! use fieldscore_core::{score, Value};
//!
//! let expected = Value::from_json_str(r#"{"items":[1,2,3]}"#).unwrap();
//! let generated = Value::from_json_str(r#"{"items":[1,2]}"#).unwrap();
//!
//! let report = score(&expected, &generated);
//! assert_eq!((report.matched_leaves, report.total_leaves), (2, 3));
//! assert_eq!(report.container_events().count(), 1);
//! ```
//!
//! ## Modules
//!
//! - [`value`] — `Value` tree and its insertion-ordered `Map`
//! - [`path`] — `FieldPath` labels for trace entries
//! - [`compare`] — leaf counting, leaf equality, the recursive comparator
//! - [`report`] — `AccuracyReport` and trace events
//! - [`error`] — Error types for parsing inputs

pub mod compare;
pub mod error;
pub mod path;
pub mod report;
pub mod value;

pub use compare::{compare, count_leaves, leaves_equal, score, score_with, ScoreOptions};
pub use error::ScoreError;
pub use path::{FieldPath, PathSegment};
pub use report::{AccuracyReport, ContainerMismatch, ContainerMismatchKind, LeafVerdict, TraceEvent};
pub use value::{Map, Value};
