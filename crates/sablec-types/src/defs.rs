//! The nominal hierarchy the subtype engine consults.
//!
//! A [`TypeDefs`] records, for each nominal type name, the names of the
//! traits it provides. Subtyping between differently-named nominals is
//! exactly reachability in this graph. [`TypeDefs::builtin`] seeds the
//! edges the checker's builtin probes rely on:
//!
//! ```text
//! IntLiteral   -> Integer -> Arithmetic
//! FloatLiteral -> Float   -> Arithmetic
//! ```

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use sablec_util::symbol::{builtin, Symbol};

/// Provides-edges between nominal type names.
#[derive(Debug, Default)]
pub struct TypeDefs {
    provides: IndexMap<Symbol, Vec<Symbol>>,
}

impl TypeDefs {
    /// An empty hierarchy.
    pub fn new() -> Self {
        Self::default()
    }

    /// A hierarchy seeded with the builtin numeric tower.
    pub fn builtin() -> Self {
        let mut defs = Self::new();
        defs.add(builtin::INT_LITERAL, &[builtin::INTEGER]);
        defs.add(builtin::INTEGER, &[builtin::ARITHMETIC]);
        defs.add(builtin::FLOAT_LITERAL, &[builtin::FLOAT]);
        defs.add(builtin::FLOAT, &[builtin::ARITHMETIC]);
        defs
    }

    /// Record that `name` provides each of `traits`.
    pub fn add(&mut self, name: Symbol, traits: &[Symbol]) {
        self.provides
            .entry(name)
            .or_default()
            .extend_from_slice(traits);
    }

    /// Whether `sub` transitively provides `sup`.
    ///
    /// Reflexivity is the caller's concern; this answers reachability over
    /// at least one edge.
    pub fn provides(&self, sub: Symbol, sup: Symbol) -> bool {
        let mut seen = FxHashSet::default();
        let mut stack: Vec<Symbol> = match self.provides.get(&sub) {
            Some(direct) => direct.clone(),
            None => return false,
        };

        while let Some(name) = stack.pop() {
            if name == sup {
                return true;
            }
            if seen.insert(name) {
                if let Some(next) = self.provides.get(&name) {
                    stack.extend_from_slice(next);
                }
            }
        }

        false
    }
}
