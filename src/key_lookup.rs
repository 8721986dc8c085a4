//! Detects filters equivalent to a primary-key lookup. Runs over the
//! unformatted tree; the caller uses a successful match to emit the
//! compact key-addressed resource path instead of a filter clause.

use crate::ast::{BinaryOp, Expr};

/// Ordered key-name → value-node map. Insertion order is the order the
/// equalities appear in the conjunction, left to right.
pub type KeyMap = Vec<(String, Expr)>;

/// Collect key equalities from a top-level AND-of-equalities tree into
/// `out`. Returns false, without error, for any shape that is not a pure
/// conjunction of reference-equals-value clauses; callers then fall back
/// to plain filter rendering. Duplicate key names keep the first value
/// seen, so `Id eq 1 and Id eq 1` collapses to a single clause.
pub fn extract(expr: &Expr, out: &mut KeyMap) -> bool {
    match expr {
        Expr::Binary(left, BinaryOp::And, right) => extract(left, out) && extract(right, out),
        Expr::Binary(left, BinaryOp::Eq, right) => {
            let Expr::Reference(path) = left.as_ref() else {
                return false;
            };
            // References here are pre-resolution dotted chains; the key
            // name is the last dot-component.
            let key = path.rsplit('.').next().unwrap_or(path);
            if !out.iter().any(|(existing, _)| existing == key) {
                out.push((key.to_string(), (**right).clone()));
            }
            true
        }
        _ => false,
    }
}
