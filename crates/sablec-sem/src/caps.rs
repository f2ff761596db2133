//! Receiver and method capability rules for call checking.

use sablec_ast::{NodeId, NodeKind, SyntaxTree};
use sablec_types::{Capability, MethodKind, MethodType};

/// The capability `this` is seen at from `node`.
///
/// Inside a function body it is the declared receiver capability, `box`
/// when none was written. Constructors and behaviours may mutate the
/// object under construction or the actor itself, so both give `ref`, as
/// do field initialisers, which run during construction.
pub fn cap_for_receiver(tree: &SyntaxTree, node: NodeId) -> Capability {
    match tree.enclosing_method(node) {
        Some(method) if tree.kind(method) == NodeKind::Fun => {
            declared_cap(tree, method).unwrap_or(Capability::Box)
        }
        _ => Capability::Ref,
    }
}

/// The receiver capability a method demands of its callers.
///
/// Behaviours are callable through any alias, so an unannotated `be`
/// demands only `tag`; an unannotated `fun` demands `box`; a constructor
/// demands `ref`.
pub fn cap_for_fun(method: &MethodType) -> Capability {
    method.cap.unwrap_or(match method.kind {
        MethodKind::Fun => Capability::Box,
        MethodKind::Be => Capability::Tag,
        MethodKind::New => Capability::Ref,
    })
}

fn declared_cap(tree: &SyntaxTree, method: NodeId) -> Option<Capability> {
    match tree.kind(tree.first_child(method)?) {
        NodeKind::Cap(cap) => Some(cap),
        _ => None,
    }
}
