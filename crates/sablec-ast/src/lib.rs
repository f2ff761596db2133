//! sablec-ast - The Sable syntax tree.
//!
//! Nodes live in an arena ([`SyntaxTree`]) and are addressed by [`NodeId`];
//! a node is a kind tag, a span, an ordered child list, a parent link and
//! an optional inferred [`Type`](sablec_types::Type). Absent slots in
//! fixed-shape declarations are explicit [`NodeKind::None`] children, so a
//! method declaration always has exactly seven children and positional
//! access stays meaningful.
//!
//! The tree also carries the scope tables the name-resolution pass
//! populates: any node can own a map from names to definition nodes, and
//! [`SyntaxTree::lookup`] resolves a name by walking the parent chain.

pub mod kind;
pub mod tree;

pub use kind::NodeKind;
pub use tree::{Node, NodeId, SyntaxTree};
