//! Reference capabilities and their subtype lattice.
//!
//! A capability qualifies a reference with the aliasing and mutation rights
//! it grants. The lattice, from strongest to weakest:
//!
//! ```text
//!        iso
//!         |
//!        trn
//!        / \
//!      ref  val
//!        \ /
//!        box
//!         |
//!        tag
//! ```
//!
//! `a.is_sub(b)` answers whether a receiver seen at capability `a` may be
//! used where `b` is required.

use std::fmt;

/// A reference capability token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Isolated: unique readable, writable reference
    Iso,
    /// Transition: writable, convertible to `val`
    Trn,
    /// Mutable reference
    Ref,
    /// Globally immutable value
    Val,
    /// Locally immutable view
    Box,
    /// Opaque identity, no read or write
    Tag,
}

impl Capability {
    /// Whether `self` is a subcapability of `other`.
    pub fn is_sub(self, other: Capability) -> bool {
        use Capability::*;

        if self == other {
            return true;
        }

        match self {
            Iso => true,
            Trn => matches!(other, Ref | Val | Box | Tag),
            Ref | Val => matches!(other, Box | Tag),
            Box => other == Tag,
            Tag => false,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Iso => "iso",
            Capability::Trn => "trn",
            Capability::Ref => "ref",
            Capability::Val => "val",
            Capability::Box => "box",
            Capability::Tag => "tag",
        };
        f.write_str(name)
    }
}

/// All capabilities, for exhaustive checks and property tests.
pub const ALL_CAPS: [Capability; 6] = [
    Capability::Iso,
    Capability::Trn,
    Capability::Ref,
    Capability::Val,
    Capability::Box,
    Capability::Tag,
];
