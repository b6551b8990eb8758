//! Structural diff engines for shapediff.
//!
//! Compares two value graphs and reports every place where they disagree,
//! each with the path that leads to it and the cause. Two engines are
//! provided: a strict one requiring identical types, and a tolerant one
//! comparing by shape, optionally ignoring sequence order.
//!
//! # Key Types
//!
//! - [`strict_diff`] / [`tolerant_diff`] -- The two comparison engines
//! - [`Diff`] / [`Cause`] -- One disagreement and why it occurred
//! - [`Shape`] -- Structural classification used for dispatch
//! - [`DiffConfig`] / [`DiffMode`] -- Engine selection
//! - [`DiffReport`] / [`TextHunk`] -- Assertion messages and line diffs

pub mod config;
pub mod record;
pub mod report;
pub mod shape;
pub mod strict;
pub mod text;
pub mod tolerant;
pub mod visit;

pub use config::{DiffConfig, DiffMode};
pub use record::{Cause, Diff};
pub use report::DiffReport;
pub use shape::Shape;
pub use strict::strict_diff;
pub use text::{diff_lines, TextHunk, TextLine};
pub use tolerant::tolerant_diff;
pub use visit::{PairKey, VisitGuard};

use shapediff_value::Reflect;

/// [`strict_diff`] over any two reflectable values.
pub fn diff_reflect<A: Reflect + ?Sized, B: Reflect + ?Sized>(a: &A, b: &B) -> Vec<Diff> {
    strict_diff(&a.reflect(), &b.reflect())
}

/// [`tolerant_diff`] over any two reflectable values.
pub fn similar_reflect<A: Reflect + ?Sized, B: Reflect + ?Sized>(
    a: &A,
    b: &B,
    unordered: bool,
) -> Vec<Diff> {
    tolerant_diff(&a.reflect(), &b.reflect(), unordered)
}
