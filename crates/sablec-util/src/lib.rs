//! sablec-util - Core utilities shared by every sablec crate.
//!
//! This crate provides the foundation types the rest of the compiler is
//! built on:
//!
//! - [`span`]: source locations ([`Span`], [`FileId`])
//! - [`diagnostic`]: error reporting ([`Diagnostic`], [`Handler`],
//!   [`DiagnosticBuilder`])
//! - [`symbol`]: string interning ([`Symbol`])
//! - [`index_vec`]: typed arena indices ([`Idx`], [`IndexVec`])
//!
//! None of these types know anything about the Sable language itself; they
//! are deliberately kept free of AST and type-system concerns so that every
//! phase crate can depend on them without cycles.

pub mod diagnostic;
pub mod index_vec;
pub mod span;
pub mod symbol;

pub use diagnostic::{Diagnostic, DiagnosticBuilder, Handler, Level};
pub use index_vec::{Idx, IndexVec};
pub use span::{FileId, Span};
pub use symbol::Symbol;
