//! Line-level diff of multi-line strings.
//!
//! Uses the `similar` crate (Myers diff algorithm) to turn two differing
//! strings into hunks with context lines, so a value diff between long
//! strings can be shown as the lines that actually changed.

use serde::Serialize;
use similar::{ChangeTag, TextDiff};

/// A contiguous region of changed lines.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TextHunk {
    /// Line number in A where this hunk starts (1-based).
    pub a_start: usize,
    pub a_count: usize,
    /// Line number in B where this hunk starts (1-based).
    pub b_start: usize,
    pub b_count: usize,
    pub lines: Vec<TextLine>,
}

/// One line of a hunk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "tag", content = "text", rename_all = "snake_case")]
pub enum TextLine {
    /// Present on both sides.
    Context(String),
    /// Present only in A.
    OnlyA(String),
    /// Present only in B.
    OnlyB(String),
}

/// Diff `a` against `b` line by line with three lines of context.
pub fn diff_lines(a: &str, b: &str) -> Vec<TextHunk> {
    if a == b {
        return Vec::new();
    }

    let text_diff = TextDiff::from_lines(a, b);
    let mut hunks = Vec::new();

    for group in text_diff.grouped_ops(3) {
        let (a_start, b_start) = match group.first() {
            Some(op) => (op.old_range().start + 1, op.new_range().start + 1),
            None => continue,
        };
        let mut hunk = TextHunk {
            a_start,
            a_count: 0,
            b_start,
            b_count: 0,
            lines: Vec::new(),
        };

        for op in &group {
            for change in text_diff.iter_changes(op) {
                let text = change.value().trim_end_matches('\n').to_string();
                match change.tag() {
                    ChangeTag::Equal => {
                        hunk.lines.push(TextLine::Context(text));
                        hunk.a_count += 1;
                        hunk.b_count += 1;
                    }
                    ChangeTag::Delete => {
                        hunk.lines.push(TextLine::OnlyA(text));
                        hunk.a_count += 1;
                    }
                    ChangeTag::Insert => {
                        hunk.lines.push(TextLine::OnlyB(text));
                        hunk.b_count += 1;
                    }
                }
            }
        }

        hunks.push(hunk);
    }

    hunks
}
