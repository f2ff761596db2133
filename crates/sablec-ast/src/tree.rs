//! The arena the syntax tree lives in, with the traversal and scope
//! primitives the passes consume.

use crate::kind::NodeKind;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use sablec_types::Type;
use sablec_util::index_vec::{Idx, IndexVec};
use sablec_util::span::Span;
use sablec_util::symbol::Symbol;

/// Index of a node in a [`SyntaxTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl Idx for NodeId {
    fn from_usize(idx: usize) -> Self {
        debug_assert!(idx <= u32::MAX as usize);
        NodeId(idx as u32)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A single syntax node.
#[derive(Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// The inferred or declared type, attached by the type-checking pass
    /// (or pre-attached on `TypeRef` annotations)
    pub ty: Option<Type>,
}

/// The syntax tree arena plus the scope tables name resolution filled in.
#[derive(Debug, Default)]
pub struct SyntaxTree {
    nodes: IndexVec<NodeId, Node>,
    scopes: FxHashMap<NodeId, IndexMap<Symbol, NodeId>>,
}

impl SyntaxTree {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Add a childless node.
    pub fn leaf(&mut self, kind: NodeKind, span: Span) -> NodeId {
        self.nodes.push(Node {
            kind,
            span,
            parent: None,
            children: Vec::new(),
            ty: None,
        })
    }

    /// Add a node and append the given children to it, in order.
    pub fn node(&mut self, kind: NodeKind, span: Span, children: &[NodeId]) -> NodeId {
        let id = self.leaf(kind, span);
        for &child in children {
            self.append(id, child);
        }
        id
    }

    /// Append `child` to `parent`'s child list.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(
            self.nodes[child].parent.is_none(),
            "node appended twice"
        );
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
    }

    // ------------------------------------------------------------------
    // Access
    // ------------------------------------------------------------------

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.nodes[id].kind
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id].span
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    /// The `index`th child, if there is one.
    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.nodes[id].children.get(index).copied()
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.child(id, 0)
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].children.last().copied()
    }

    /// The next sibling under the same parent.
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.nodes[id].parent?;
        let siblings = &self.nodes[parent].children;
        let position = siblings.iter().position(|&c| c == id)?;
        siblings.get(position + 1).copied()
    }

    /// The interned string of an identifier node.
    pub fn name(&self, id: NodeId) -> Option<Symbol> {
        match self.nodes[id].kind {
            NodeKind::Id(name) => Some(name),
            _ => None,
        }
    }

    /// The name of a declaration: the identifier in its first child slot.
    ///
    /// Methods carry their identifier in the second slot, after the
    /// receiver capability.
    pub fn decl_name(&self, id: NodeId) -> Option<Symbol> {
        let slot = if self.kind(id).is_method() { 1 } else { 0 };
        self.name(self.child(id, slot)?)
    }

    /// The value of an integer literal node.
    pub fn int_value(&self, id: NodeId) -> Option<i64> {
        match self.nodes[id].kind {
            NodeKind::Int(value) => Some(value),
            _ => None,
        }
    }

    pub fn ty(&self, id: NodeId) -> Option<&Type> {
        self.nodes[id].ty.as_ref()
    }

    pub fn set_ty(&mut self, id: NodeId, ty: Type) {
        self.nodes[id].ty = Some(ty);
    }

    // ------------------------------------------------------------------
    // Scopes
    // ------------------------------------------------------------------

    /// Record `name -> def` in the scope owned by `owner`.
    pub fn define(&mut self, owner: NodeId, name: Symbol, def: NodeId) {
        self.scopes.entry(owner).or_default().insert(name, def);
    }

    /// Resolve `name` by walking from `from` out through the enclosing
    /// scopes.
    pub fn lookup(&self, from: NodeId, name: Symbol) -> Option<NodeId> {
        let mut current = Some(from);
        while let Some(node) = current {
            if let Some(def) = self.lookup_in(node, name) {
                return Some(def);
            }
            current = self.parent(node);
        }
        None
    }

    /// Resolve `name` in the scope owned by exactly `owner`.
    pub fn lookup_in(&self, owner: NodeId, name: Symbol) -> Option<NodeId> {
        self.scopes.get(&owner)?.get(&name).copied()
    }

    // ------------------------------------------------------------------
    // Enclosing-of-kind queries
    // ------------------------------------------------------------------

    /// The innermost enclosing type declaration.
    pub fn enclosing_type(&self, id: NodeId) -> Option<NodeId> {
        self.ancestor(id, NodeKind::is_type_decl)
    }

    /// The innermost enclosing loop.
    pub fn enclosing_loop(&self, id: NodeId) -> Option<NodeId> {
        self.ancestor(id, NodeKind::is_loop)
    }

    /// The method whose body contains `id`, if any.
    ///
    /// A node sitting in a method's signature (a parameter default, say)
    /// has no enclosing method body.
    pub fn enclosing_method(&self, id: NodeId) -> Option<NodeId> {
        let mut prev = id;
        let mut current = self.parent(id);
        while let Some(node) = current {
            if self.kind(node).is_method() && self.child(node, 6) == Some(prev) {
                return Some(node);
            }
            prev = node;
            current = self.parent(node);
        }
        None
    }

    fn ancestor(&self, id: NodeId, pred: impl Fn(NodeKind) -> bool) -> Option<NodeId> {
        let mut current = self.parent(id);
        while let Some(node) = current {
            if pred(self.kind(node)) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }
}
