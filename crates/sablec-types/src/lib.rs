//! sablec-types - The Sable type model and subtype engine.
//!
//! This crate defines the value-level representation of Sable types
//! ([`Type`]), the reference-capability lattice ([`Capability`]), the
//! nominal hierarchy the subtype engine consults ([`TypeDefs`]), and the
//! small type-algebra the expression checker composes:
//!
//! - [`subtype::is_subtype`] / [`subtype::is_eqtype`]
//! - [`subtype::join`] - the simpler of two related types
//! - [`subtype::union_of`] - join, or a fresh union type
//! - [`ty::tuple_index`] - element lookup on the right-cons tuple spine
//!
//! Types are plain owned values: a pass clones what it attaches and drops
//! what it only probed with. Nothing here holds references into the syntax
//! tree.

pub mod cap;
pub mod defs;
pub mod subtype;
pub mod ty;

pub use cap::Capability;
pub use defs::TypeDefs;
pub use subtype::{is_eqtype, is_subtype, join, union_of};
pub use ty::{tuple_index, MethodKind, MethodType, Nominal, Type};
