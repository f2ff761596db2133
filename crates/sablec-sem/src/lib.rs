//! sablec-sem - Expression type checking for Sable.
//!
//! This crate implements the bottom-up type synthesis and constraint pass:
//! it walks a parsed, name-resolved syntax tree and attaches an inferred
//! [`Type`](sablec_types::Type) to every expression node, reporting
//! diagnostics through a [`Handler`] when a constraint is violated.
//!
//! The pass is strictly single-threaded and synchronous. It mutates nothing
//! but the `ty` slot of visited nodes; everything else it needs (subtyping,
//! the capability lattice, scope lookup) is consumed through `sablec-types`
//! and `sablec-ast`.
//!
//! # Entry points
//!
//! [`ExprChecker::type_expr`] is the per-node visit callback: dispatch one
//! node whose children are already typed, get [`PassResult::Ok`] or
//! [`PassResult::Fatal`] back. [`check_tree`] wraps it in a post-order
//! walker that keeps visiting sibling subtrees after a fatal so that one
//! compile surfaces as many diagnostics as possible.

pub mod caps;
pub mod expr;

pub use expr::ExprChecker;

use sablec_ast::{NodeId, SyntaxTree};
use sablec_types::TypeDefs;
use sablec_util::diagnostic::Handler;
use thiserror::Error;

/// Verdict for a single dispatched node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassResult {
    /// The node was typed (or needed no type)
    Ok,
    /// A diagnostic was reported and the subtree is abandoned
    Fatal,
}

/// Internal failure token threaded through the checker with `?`.
///
/// Carrying no payload is deliberate: every failure has already been
/// reported to the handler by the time this is constructed.
pub(crate) struct Fatal;

pub(crate) type Checked = Result<(), Fatal>;

/// The pass failed; the diagnostics are in the handler.
#[derive(Debug, Error)]
#[error("expression type checking failed with {errors} error(s)")]
pub struct CheckError {
    /// Number of error-level diagnostics the handler holds
    pub errors: usize,
}

/// Type-check the whole tree under `root`.
///
/// Children are fully typed before their parent is dispatched. A fatal
/// subtree does not stop the walk: its siblings are still visited, only
/// its ancestors are skipped (their rules assume typed children).
pub fn check_tree(
    tree: &mut SyntaxTree,
    defs: &TypeDefs,
    handler: &Handler,
    root: NodeId,
) -> Result<(), CheckError> {
    let mut checker = ExprChecker::new(tree, defs, handler);
    checker.check(root);

    if handler.has_errors() {
        Err(CheckError {
            errors: handler.error_count(),
        })
    } else {
        Ok(())
    }
}
