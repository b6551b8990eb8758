//! Human-facing summaries of a comparison.

use std::collections::BTreeMap;

use serde::Serialize;
use shapediff_value::Value;

use crate::config::DiffMode;
use crate::record::{Cause, Diff};
use crate::text::{diff_lines, TextHunk};

/// The diffs produced by one comparison, with the mode that produced them.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DiffReport {
    mode: DiffMode,
    diffs: Vec<Diff>,
}

impl DiffReport {
    pub fn new(mode: DiffMode, diffs: Vec<Diff>) -> Self {
        Self { mode, diffs }
    }

    pub fn mode(&self) -> DiffMode {
        self.mode
    }

    pub fn diffs(&self) -> &[Diff] {
        &self.diffs
    }

    pub fn into_diffs(self) -> Vec<Diff> {
        self.diffs
    }

    /// Returns `true` if the compared values matched.
    pub fn is_empty(&self) -> bool {
        self.diffs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diffs.len()
    }

    /// Number of diffs per cause kind.
    pub fn counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for diff in &self.diffs {
            *counts.entry(diff.cause.kind()).or_insert(0) += 1;
        }
        counts
    }

    /// The assertion failure message, or `None` when there is nothing to report.
    pub fn failure_message(&self) -> Option<String> {
        if self.diffs.is_empty() {
            return None;
        }
        let mut msg = match self.mode {
            DiffMode::Strict => "Value have following diffs with expectation :".to_string(),
            DiffMode::Tolerant => {
                "Value have following dissimilarities with expectation :".to_string()
            }
        };
        for diff in &self.diffs {
            msg.push('\n');
            msg.push_str(&diff.to_string());
        }
        Some(msg)
    }

    /// Line-level diffs for value diffs between two multi-line strings.
    pub fn text_hunks(&self) -> Vec<(&Diff, Vec<TextHunk>)> {
        self.diffs
            .iter()
            .filter_map(|diff| match &diff.cause {
                Cause::Value {
                    a: Value::String(a),
                    b: Value::String(b),
                } if a.contains('\n') || b.contains('\n') => Some((diff, diff_lines(a, b))),
                _ => None,
            })
            .collect()
    }
}
