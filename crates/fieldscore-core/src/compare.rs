//! Structural comparison of an expected tree against a generated tree.
//!
//! The expected tree drives a single recursive walk. At every node the generated
//! tree is consulted for a counterpart:
//!
//! - no counterpart: every leaf below the expected node is recorded as unmatched
//! - map vs map: shared keys recurse, missing keys recurse as absent, keys only
//!   the generated side has are noted and otherwise ignored
//! - list vs list: elements pair by index, surplus expected elements recurse as
//!   absent, surplus generated elements are ignored
//! - anything else: a single leaf-equality test
//!
//! The score denominator always comes from [`count_leaves`] on the expected tree,
//! so nothing the generated side adds can change it.

use crate::path::FieldPath;
use crate::report::{AccuracyReport, ContainerMismatch, ContainerMismatchKind, LeafVerdict, TraceEvent};
use crate::value::{numbers_equal, Map, Value};

/// Knobs for [`score_with`]. The defaults give the behaviour of [`score`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreOptions {
    /// Count an expected `null` leaf as matched when the generated tree has no
    /// node at that path at all.
    ///
    /// Off by default: an explicit `null` and a missing key are different answers.
    pub null_matches_missing: bool,
}

/// Number of leaves (null, boolean, number, string) reachable from `value`.
///
/// Empty lists and maps contribute nothing.
///
/// ```
/// use fieldscore_core::{count_leaves, Value};
///
/// let value = Value::from_json_str(r#"{"a":1,"b":[true,null],"c":{}}"#).unwrap();
/// assert_eq!(count_leaves(&value), 3);
/// ```
pub fn count_leaves(value: &Value) -> usize {
    match value {
        Value::List(items) => items.iter().map(count_leaves).sum(),
        Value::Map(map) => map.values().map(count_leaves).sum(),
        Value::Null | Value::Boolean(_) | Value::Number(_) | Value::String(_) => 1,
    }
}

/// The leaf equality rule.
///
/// Strings compare case-insensitively. Every other pair must be the same variant
/// with the same value; `5` never equals `"5"` and `null` only equals `null`.
/// Containers never satisfy this test.
pub fn leaves_equal(expected: &Value, generated: &Value) -> bool {
    match (expected, generated) {
        (Value::String(a), Value::String(b)) => a == b || a.to_lowercase() == b.to_lowercase(),
        (Value::Null, Value::Null) => true,
        (Value::Boolean(a), Value::Boolean(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => numbers_equal(*a, *b),
        _ => false,
    }
}

/// Score `generated` against `expected`.
///
/// # Examples
///
/// ```
/// use fieldscore_core::{score, Value};
///
/// let expected = Value::from_json_str(r#"{"name":"Maria","age":90}"#).unwrap();
/// let generated = Value::from_json_str(r#"{"name":"MARIA"}"#).unwrap();
///
/// let report = score(&expected, &generated);
/// assert_eq!(report.matched_leaves, 1);
/// assert_eq!(report.total_leaves, 2);
/// assert_eq!(report.score, 0.5);
/// ```
pub fn score(expected: &Value, generated: &Value) -> AccuracyReport {
    score_with(expected, generated, &ScoreOptions::default())
}

/// [`score`] with explicit [`ScoreOptions`].
pub fn score_with(expected: &Value, generated: &Value, options: &ScoreOptions) -> AccuracyReport {
    let total = count_leaves(expected);
    let mut walker = Walker::new(options);
    let matched = walker.compare(&FieldPath::root(), expected, Some(generated));
    let report = AccuracyReport::new(total, matched, walker.trace);
    tracing::debug!(
        total = report.total_leaves,
        matched = report.matched_leaves,
        score = report.score,
        "scored generated tree"
    );
    report
}

/// Compare the subtree at `path`, returning the matched-leaf count and the trace
/// produced along the way.
///
/// `generated` is `None` when the generated tree has no node at `path`.
pub fn compare(path: &FieldPath, expected: &Value, generated: Option<&Value>) -> (usize, Vec<TraceEvent>) {
    let options = ScoreOptions::default();
    let mut walker = Walker::new(&options);
    let matched = walker.compare(path, expected, generated);
    (matched, walker.trace)
}

/// Recursion state: the options in force and the trace accumulated so far.
struct Walker<'a> {
    options: &'a ScoreOptions,
    trace: Vec<TraceEvent>,
}

impl<'a> Walker<'a> {
    fn new(options: &'a ScoreOptions) -> Self {
        Self {
            options,
            trace: Vec::new(),
        }
    }

    fn compare(&mut self, path: &FieldPath, expected: &Value, generated: Option<&Value>) -> usize {
        let Some(generated) = generated else {
            return self.absent(path, expected);
        };
        match (expected, generated) {
            (Value::Map(exp), Value::Map(got)) => self.compare_maps(path, exp, got),
            (Value::List(exp), Value::List(got)) => self.compare_lists(path, exp, got),
            // Leaf vs leaf, and any container/leaf or map/list shape mismatch.
            _ => self.leaf(path, expected, Some(generated)),
        }
    }

    fn compare_maps(&mut self, path: &FieldPath, expected: &Map, generated: &Map) -> usize {
        let mut matched = 0;

        for (key, exp_child) in expected.iter() {
            let child_path = path.key(key);
            match generated.get(key) {
                Some(gen_child) => matched += self.compare(&child_path, exp_child, Some(gen_child)),
                None => {
                    self.container_event(
                        path,
                        ContainerMismatchKind::KeySetMismatch,
                        format!("missing key `{key}`"),
                    );
                    matched += self.absent(&child_path, exp_child);
                }
            }
        }

        for key in generated.keys().filter(|key| !expected.contains_key(key)) {
            self.container_event(
                path,
                ContainerMismatchKind::KeySetMismatch,
                format!("unexpected key `{key}`"),
            );
        }

        matched
    }

    fn compare_lists(&mut self, path: &FieldPath, expected: &[Value], generated: &[Value]) -> usize {
        if expected.len() != generated.len() {
            self.container_event(
                path,
                ContainerMismatchKind::LengthMismatch,
                format!("expected {} items, generated {}", expected.len(), generated.len()),
            );
        }

        expected
            .iter()
            .enumerate()
            .map(|(i, exp_item)| self.compare(&path.index(i), exp_item, generated.get(i)))
            .sum()
    }

    /// Record every leaf under `expected` as having no generated counterpart.
    fn absent(&mut self, path: &FieldPath, expected: &Value) -> usize {
        match expected {
            Value::List(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| self.absent(&path.index(i), item))
                .sum(),
            Value::Map(map) => map
                .iter()
                .map(|(key, child)| self.absent(&path.key(key), child))
                .sum(),
            leaf => self.leaf(path, leaf, None),
        }
    }

    fn leaf(&mut self, path: &FieldPath, expected: &Value, generated: Option<&Value>) -> usize {
        let matched = match generated {
            Some(generated) => leaves_equal(expected, generated),
            None => self.options.null_matches_missing && *expected == Value::Null,
        };
        self.trace.push(TraceEvent::Leaf(LeafVerdict {
            path: path.clone(),
            expected: expected.clone(),
            generated: generated.cloned(),
            matched,
        }));
        usize::from(matched)
    }

    fn container_event(&mut self, path: &FieldPath, kind: ContainerMismatchKind, detail: String) {
        self.trace.push(TraceEvent::Container(ContainerMismatch {
            path: path.clone(),
            kind,
            detail,
        }));
    }
}
