//! The value-level representation of Sable types.
//!
//! Expression nodes carry an `Option<Type>`; the checker synthesizes fresh
//! `Type` values (builtin lookups, unions, tuple spines) and clones declared
//! ones out of signatures. Tuples are right-cons cells: an n-tuple is
//! `(t1, (t2, (t3, ... tn)))` and a 1-tuple collapses to its element.

use crate::cap::Capability;
use sablec_util::symbol::{builtin, Symbol};
use std::fmt;

/// A named type, optionally package-qualified, with type arguments and a
/// reference capability.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Nominal {
    /// Defining package, if referenced through one
    pub package: Option<Symbol>,
    /// Type name
    pub name: Symbol,
    /// Type arguments
    pub args: Vec<Type>,
    /// Reference capability, if one was written or synthesized
    pub cap: Option<Capability>,
    /// Ephemeral (unaliased) marker
    pub ephemeral: bool,
}

/// Which kind of method a signature view was built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MethodKind {
    /// Constructor
    New,
    /// Behaviour (asynchronous)
    Be,
    /// Function
    Fun,
}

/// The reshaped signature view of a method declaration: parameter types
/// only, no body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodType {
    pub kind: MethodKind,
    /// Declared receiver capability
    pub cap: Option<Capability>,
    pub name: Symbol,
    /// Type parameter names, in declaration order
    pub type_params: Vec<Symbol>,
    /// Parameter types, in declaration order
    pub params: Vec<Type>,
    /// Declared result type, if any
    pub result: Option<Type>,
    /// Whether the method may raise an error
    pub partial: bool,
}

/// A Sable type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Type {
    /// Named type
    Nominal(Nominal),
    /// Right-cons tuple cell: head element, tail (a further cell or the
    /// final element)
    Tuple(Box<Type>, Box<Type>),
    /// Union of two types
    Union(Box<Type>, Box<Type>),
    /// Intersection of two types
    Isect(Box<Type>, Box<Type>),
    /// Anonymous member-set type; recognized at call sites only
    Structural,
    /// Viewpoint-adapted type; recognized at call sites only
    Arrow(Box<Type>, Box<Type>),
    /// Method signature view
    Method(Box<MethodType>),
    /// The may-fail effect marker
    Error,
}

impl Type {
    /// A bare builtin nominal: no package, no arguments, no capability.
    pub fn builtin(name: Symbol) -> Type {
        Type::nominal(None, name)
    }

    /// The builtin `None` type.
    pub fn none() -> Type {
        Type::builtin(builtin::NONE)
    }

    /// The builtin `Bool` type.
    pub fn bool() -> Type {
        Type::builtin(builtin::BOOL)
    }

    /// A named type with an optional package prefix.
    pub fn nominal(package: Option<Symbol>, name: Symbol) -> Type {
        Type::Nominal(Nominal {
            package,
            name,
            args: Vec::new(),
            cap: None,
            ephemeral: false,
        })
    }

    /// Build the right-cons tuple type over `elements`.
    ///
    /// A single element collapses to itself; the call is meaningless on an
    /// empty slice and returns `None` there.
    pub fn tuple_of(elements: Vec<Type>) -> Option<Type> {
        let mut iter = elements.into_iter().rev();
        let last = iter.next()?;
        Some(iter.fold(last, |tail, head| {
            Type::Tuple(Box::new(head), Box::new(tail))
        }))
    }

    /// Shorthand union constructor for building expected types in tests.
    pub fn union(left: Type, right: Type) -> Type {
        Type::Union(Box::new(left), Box::new(right))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Nominal(n) => {
                if let Some(pkg) = n.package {
                    write!(f, "{}.", pkg)?;
                }
                write!(f, "{}", n.name)?;
                if !n.args.is_empty() {
                    write!(f, "[")?;
                    for (i, arg) in n.args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    write!(f, "]")?;
                }
                if let Some(cap) = n.cap {
                    write!(f, " {}", cap)?;
                }
                if n.ephemeral {
                    write!(f, "^")?;
                }
                Ok(())
            }
            Type::Tuple(head, tail) => write!(f, "({}, {})", head, tail),
            Type::Union(l, r) => write!(f, "({} | {})", l, r),
            Type::Isect(l, r) => write!(f, "({} & {})", l, r),
            Type::Structural => write!(f, "{{..}}"),
            Type::Arrow(l, r) => write!(f, "{}->{}", l, r),
            Type::Method(m) => write!(f, "{}()", m.name),
            Type::Error => write!(f, "<error>"),
        }
    }
}

/// Look up element `index` (0-based) on a tuple type's right-cons spine.
///
/// Returns the head of the cell the index lands in, the bare tail for the
/// final element, or `None` when the spine ends before the index, or when
/// `ty` is not a tuple at all.
pub fn tuple_index(ty: &Type, index: u64) -> Option<&Type> {
    let (mut head, mut tail) = match ty {
        Type::Tuple(head, tail) => (head.as_ref(), tail.as_ref()),
        _ => return None,
    };

    let mut index = index;
    while index > 1 {
        match tail {
            Type::Tuple(h, t) => {
                head = h.as_ref();
                tail = t.as_ref();
                index -= 1;
            }
            _ => return None,
        }
    }

    if index == 0 {
        return Some(head);
    }

    // index == 1: either the next cell's head, or the final element
    match tail {
        Type::Tuple(h, _) => Some(h.as_ref()),
        other => Some(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;
    use sablec_util::symbol::Symbol;

    fn named(s: &str) -> Type {
        Type::builtin(Symbol::intern(s))
    }

    #[test]
    fn test_tuple_of_collapses_singleton() {
        let t = Type::tuple_of(vec![named("A")]).unwrap();
        assert_eq!(t, named("A"));
    }

    #[test]
    fn test_tuple_of_pair_is_one_cell() {
        let t = Type::tuple_of(vec![named("A"), named("B")]).unwrap();
        assert_eq!(
            t,
            Type::Tuple(Box::new(named("A")), Box::new(named("B")))
        );
    }

    #[test]
    fn test_tuple_index_pair() {
        let t = Type::tuple_of(vec![named("A"), named("B")]).unwrap();
        assert_eq!(tuple_index(&t, 0), Some(&named("A")));
        assert_eq!(tuple_index(&t, 1), Some(&named("B")));
        assert_eq!(tuple_index(&t, 2), None);
    }

    #[test]
    fn test_tuple_index_triple() {
        let t = Type::tuple_of(vec![named("A"), named("B"), named("C")]).unwrap();
        assert_eq!(tuple_index(&t, 0), Some(&named("A")));
        assert_eq!(tuple_index(&t, 1), Some(&named("B")));
        assert_eq!(tuple_index(&t, 2), Some(&named("C")));
        assert_eq!(tuple_index(&t, 3), None);
    }

    #[test]
    fn test_tuple_index_on_non_tuple() {
        assert_eq!(tuple_index(&named("A"), 0), None);
    }

    #[quickcheck]
    fn prop_tuple_index_recovers_elements(names: Vec<u16>) -> bool {
        if names.len() < 2 {
            return true;
        }
        let elements: Vec<Type> = names
            .iter()
            .map(|n| named(&format!("T{}", n)))
            .collect();
        let tuple = Type::tuple_of(elements.clone()).unwrap();

        elements
            .iter()
            .enumerate()
            .all(|(i, e)| tuple_index(&tuple, i as u64) == Some(e))
            && tuple_index(&tuple, elements.len() as u64).is_none()
    }

    #[test]
    fn test_display_nominal() {
        let pkg = Symbol::intern("collections");
        let name = Symbol::intern("Map");
        assert_eq!(
            format!("{}", Type::nominal(Some(pkg), name)),
            "collections.Map"
        );
    }

    #[test]
    fn test_display_union() {
        let t = Type::union(named("A"), named("B"));
        assert_eq!(format!("{}", t), "(A | B)");
    }
}
