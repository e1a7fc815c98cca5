//! Accuracy report and the diagnostic trace events it carries.

use std::fmt;

use serde::Serialize;

use crate::path::FieldPath;
use crate::value::Value;

/// Outcome of comparing one expected leaf.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeafVerdict {
    pub path: FieldPath,
    pub expected: Value,
    /// `None` when the generated tree has no node at `path`.
    pub generated: Option<Value>,
    pub matched: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerMismatchKind {
    KeySetMismatch,
    LengthMismatch,
}

impl fmt::Display for ContainerMismatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeySetMismatch => f.write_str("key set mismatch"),
            Self::LengthMismatch => f.write_str("length mismatch"),
        }
    }
}

/// Two containers at the same path disagree in key set or length.
///
/// Diagnostic only: the affected leaves are scored through their own verdicts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerMismatch {
    pub path: FieldPath,
    pub kind: ContainerMismatchKind,
    pub detail: String,
}

/// One entry of the comparison trace, in traversal order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceEvent {
    Leaf(LeafVerdict),
    Container(ContainerMismatch),
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceEvent::Leaf(verdict) => {
                let generated = match &verdict.generated {
                    Some(value) => value.to_string(),
                    None => "<missing>".to_string(),
                };
                write!(
                    f,
                    "{}: expected={}, generated={} -> {}",
                    verdict.path,
                    verdict.expected,
                    generated,
                    if verdict.matched { "correct" } else { "incorrect" }
                )
            }
            TraceEvent::Container(event) => {
                write!(f, "{}: {} ({})", event.path, event.kind, event.detail)
            }
        }
    }
}

/// Aggregate result of scoring one generated tree against one expected tree.
///
/// `total_leaves` always equals `count_leaves(expected)`. `score` is
/// `matched_leaves / total_leaves`, or `0.0` when the expected tree has no leaves.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccuracyReport {
    pub total_leaves: usize,
    pub matched_leaves: usize,
    pub score: f64,
    pub trace: Vec<TraceEvent>,
}

impl AccuracyReport {
    pub(crate) fn new(total_leaves: usize, matched_leaves: usize, trace: Vec<TraceEvent>) -> Self {
        let score = if total_leaves > 0 {
            matched_leaves as f64 / total_leaves as f64
        } else {
            0.0
        };
        Self {
            total_leaves,
            matched_leaves,
            score,
            trace,
        }
    }

    /// Every leaf verdict, matched or not.
    pub fn leaf_verdicts(&self) -> impl Iterator<Item = &LeafVerdict> {
        self.trace.iter().filter_map(|event| match event {
            TraceEvent::Leaf(verdict) => Some(verdict),
            TraceEvent::Container(_) => None,
        })
    }

    /// Leaf verdicts that did not match.
    pub fn mismatches(&self) -> impl Iterator<Item = &LeafVerdict> {
        self.leaf_verdicts().filter(|verdict| !verdict.matched)
    }

    pub fn container_events(&self) -> impl Iterator<Item = &ContainerMismatch> {
        self.trace.iter().filter_map(|event| match event {
            TraceEvent::Container(mismatch) => Some(mismatch),
            TraceEvent::Leaf(_) => None,
        })
    }

    /// `true` when there was at least one leaf and every leaf matched.
    pub fn is_perfect(&self) -> bool {
        self.total_leaves > 0 && self.matched_leaves == self.total_leaves
    }

    /// The trace as text, one line per event.
    pub fn render_trace(&self) -> String {
        let mut out = String::new();
        for event in &self.trace {
            out.push_str(&event.to_string());
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for AccuracyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} leaves matched (score {:.4})",
            self.matched_leaves, self.total_leaves, self.score
        )
    }
}
