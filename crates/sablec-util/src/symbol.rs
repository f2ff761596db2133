//! Symbol module - String interning for identifier handling.
//!
//! A [`Symbol`] is a 4-byte handle to an interned string. Interning gives
//! O(1) equality and hashing for names, which the scope tables and the
//! nominal-type model lean on heavily.
//!
//! Interned strings are leaked to obtain the `'static` lifetime; the table
//! lives for the whole compilation and nothing is ever removed from it.
//!
//! # Examples
//!
//! ```
//! use sablec_util::symbol::Symbol;
//!
//! let a = Symbol::intern("wombat");
//! let b = Symbol::intern("wombat");
//! assert_eq!(a, b);
//! assert_eq!(a.as_str(), "wombat");
//! ```

use dashmap::DashMap;
use rustc_hash::FxHasher;
use static_assertions::const_assert_eq;
use std::fmt;
use std::hash::BuildHasherDefault;
use std::sync::{LazyLock, RwLock};

/// A compact handle to an interned string.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

const_assert_eq!(std::mem::size_of::<Symbol>(), 4);

impl Symbol {
    /// Intern a string, returning its stable handle.
    pub fn intern(string: &str) -> Symbol {
        TABLE.intern(string)
    }

    /// The interned string this symbol refers to.
    pub fn as_str(self) -> &'static str {
        TABLE.resolve(self.0)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({:?})", self.as_str())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pre-interned names of the builtin types the checker consults.
///
/// These are interned first, in declaration order, so the constants below
/// are stable handles.
pub mod builtin {
    use super::Symbol;

    pub const BOOL: Symbol = Symbol(0);
    pub const INTEGER: Symbol = Symbol(1);
    pub const ARITHMETIC: Symbol = Symbol(2);
    pub const INT_LITERAL: Symbol = Symbol(3);
    pub const FLOAT_LITERAL: Symbol = Symbol(4);
    pub const FLOAT: Symbol = Symbol(5);
    pub const STRING: Symbol = Symbol(6);
    pub const NONE: Symbol = Symbol(7);

    pub(super) const NAMES: &[&str] = &[
        "Bool",
        "Integer",
        "Arithmetic",
        "IntLiteral",
        "FloatLiteral",
        "Float",
        "String",
        "None",
    ];
}

/// Global string table.
static TABLE: LazyLock<StringTable> = LazyLock::new(|| {
    let table = StringTable::new();
    for name in builtin::NAMES {
        table.intern(name);
    }
    table
});

/// Thread-safe two-sided string table.
///
/// The forward map gives intern lookups without locking; the reverse vector
/// is behind a lock but only touched on a miss or on `resolve`.
struct StringTable {
    map: DashMap<&'static str, u32, BuildHasherDefault<FxHasher>>,
    strings: RwLock<Vec<&'static str>>,
}

impl StringTable {
    fn new() -> Self {
        Self {
            map: DashMap::with_hasher(BuildHasherDefault::default()),
            strings: RwLock::new(Vec::new()),
        }
    }

    fn intern(&self, string: &str) -> Symbol {
        if let Some(idx) = self.map.get(string) {
            return Symbol(*idx);
        }

        let mut strings = self.strings.write().unwrap();

        // Re-check under the write lock so racing interners agree on the
        // index.
        if let Some(idx) = self.map.get(string) {
            return Symbol(*idx);
        }

        let leaked: &'static str = Box::leak(string.to_owned().into_boxed_str());
        let idx = strings.len() as u32;
        strings.push(leaked);
        self.map.insert(leaked, idx);
        Symbol(idx)
    }

    fn resolve(&self, idx: u32) -> &'static str {
        self.strings.read().unwrap()[idx as usize]
    }
}
