//! The subtype relation and the checker's type algebra.
//!
//! `is_subtype` is structural over unions, intersections and tuple spines,
//! and nominal (via the [`TypeDefs`] provides-graph) at the leaves. The
//! error marker is a subtype only of itself and of unions containing it,
//! which is exactly how the may-fail effect propagates through sequences.
//!
//! `join` is deliberately not a least upper bound: it returns one of its
//! two operands when they are related and gives up otherwise; `union_of`
//! falls back to building a fresh union in that case.

use crate::cap::Capability;
use crate::defs::TypeDefs;
use crate::ty::{Nominal, Type};

/// Whether `a` may be used where `b` is expected.
pub fn is_subtype(defs: &TypeDefs, a: &Type, b: &Type) -> bool {
    match (a, b) {
        (Type::Error, Type::Error) => true,

        // a union is a subtype when both halves are; a type is a subtype
        // of a union when either half accepts it
        (Type::Union(l, r), _) => is_subtype(defs, l, b) && is_subtype(defs, r, b),
        (_, Type::Union(l, r)) => is_subtype(defs, a, l) || is_subtype(defs, a, r),

        // dually for intersections
        (Type::Isect(l, r), _) => is_subtype(defs, l, b) || is_subtype(defs, r, b),
        (_, Type::Isect(l, r)) => is_subtype(defs, a, l) && is_subtype(defs, a, r),

        (Type::Tuple(ah, at), Type::Tuple(bh, bt)) => {
            is_subtype(defs, ah, bh) && is_subtype(defs, at, bt)
        }

        (Type::Nominal(na), Type::Nominal(nb)) => nominal_sub(defs, na, nb),

        _ => false,
    }
}

/// Whether `a` and `b` are subtypes of each other.
pub fn is_eqtype(defs: &TypeDefs, a: &Type, b: &Type) -> bool {
    is_subtype(defs, a, b) && is_subtype(defs, b, a)
}

fn nominal_sub(defs: &TypeDefs, a: &Nominal, b: &Nominal) -> bool {
    if !cap_compatible(a.cap, b.cap) {
        return false;
    }

    if a.package == b.package && a.name == b.name {
        return args_compatible(defs, &a.args, &b.args);
    }

    defs.provides(a.name, b.name)
}

fn cap_compatible(a: Option<Capability>, b: Option<Capability>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.is_sub(b),
        // an unannotated side constrains nothing
        _ => true,
    }
}

fn args_compatible(defs: &TypeDefs, a: &[Type], b: &[Type]) -> bool {
    // an argument-less side stands for the unapplied type
    if a.is_empty() || b.is_empty() {
        return true;
    }

    // type arguments are invariant
    a.len() == b.len()
        && a.iter()
            .zip(b.iter())
            .all(|(x, y)| is_eqtype(defs, x, y))
}

/// If one of the two types is a supertype of the other, return it.
///
/// Absent operands yield nothing. This is the closest-common-ancestor
/// check for the trivial case, not a least upper bound.
pub fn join<'t>(defs: &TypeDefs, l: Option<&'t Type>, r: Option<&'t Type>) -> Option<&'t Type> {
    let (l, r) = (l?, r?);

    if is_subtype(defs, l, r) {
        return Some(r);
    }
    if is_subtype(defs, r, l) {
        return Some(l);
    }

    None
}

/// The join of the two types when they are related, or a fresh union with
/// the left operand as the left branch.
pub fn union_of(defs: &TypeDefs, left: Type, right: Type) -> Type {
    if is_subtype(defs, &left, &right) {
        return right;
    }
    if is_subtype(defs, &right, &left) {
        return left;
    }

    Type::Union(Box::new(left), Box::new(right))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sablec_util::symbol::{builtin, Symbol};

    fn int_literal() -> Type {
        Type::builtin(builtin::INT_LITERAL)
    }

    fn integer() -> Type {
        Type::builtin(builtin::INTEGER)
    }

    fn arithmetic() -> Type {
        Type::builtin(builtin::ARITHMETIC)
    }

    fn string() -> Type {
        Type::builtin(builtin::STRING)
    }

    #[test]
    fn test_nominal_reflexive() {
        let defs = TypeDefs::builtin();
        assert!(is_subtype(&defs, &integer(), &integer()));
        assert!(is_eqtype(&defs, &string(), &string()));
    }

    #[test]
    fn test_numeric_tower() {
        let defs = TypeDefs::builtin();
        assert!(is_subtype(&defs, &int_literal(), &integer()));
        assert!(is_subtype(&defs, &int_literal(), &arithmetic()));
        assert!(!is_subtype(&defs, &arithmetic(), &int_literal()));
        assert!(!is_subtype(&defs, &Type::bool(), &arithmetic()));
    }

    #[test]
    fn test_union_right() {
        let defs = TypeDefs::builtin();
        let u = Type::union(integer(), string());
        assert!(is_subtype(&defs, &integer(), &u));
        assert!(is_subtype(&defs, &string(), &u));
        assert!(!is_subtype(&defs, &Type::bool(), &u));
    }

    #[test]
    fn test_union_left() {
        let defs = TypeDefs::builtin();
        let u = Type::union(int_literal(), integer());
        assert!(is_subtype(&defs, &u, &arithmetic()));
        assert!(!is_subtype(&defs, &u, &string()));
    }

    #[test]
    fn test_error_marker_propagation() {
        let defs = TypeDefs::builtin();
        let may_fail = Type::union(integer(), Type::Error);

        assert!(is_subtype(&defs, &Type::Error, &Type::Error));
        assert!(is_subtype(&defs, &Type::Error, &may_fail));
        assert!(!is_subtype(&defs, &Type::Error, &integer()));
        assert!(!is_subtype(&defs, &integer(), &Type::Error));
    }

    #[test]
    fn test_tuple_pointwise() {
        let defs = TypeDefs::builtin();
        let narrow = Type::tuple_of(vec![int_literal(), string()]).unwrap();
        let wide = Type::tuple_of(vec![arithmetic(), string()]).unwrap();

        assert!(is_subtype(&defs, &narrow, &wide));
        assert!(!is_subtype(&defs, &wide, &narrow));
        assert!(!is_subtype(&defs, &narrow, &integer()));
    }

    #[test]
    fn test_cap_constrains_nominal() {
        use crate::cap::Capability;
        let defs = TypeDefs::builtin();

        let mut boxed = match integer() {
            Type::Nominal(n) => n,
            _ => unreachable!(),
        };
        boxed.cap = Some(Capability::Box);
        let boxed = Type::Nominal(boxed);

        let mut reffed = match integer() {
            Type::Nominal(n) => n,
            _ => unreachable!(),
        };
        reffed.cap = Some(Capability::Ref);
        let reffed = Type::Nominal(reffed);

        assert!(is_subtype(&defs, &reffed, &boxed));
        assert!(!is_subtype(&defs, &boxed, &reffed));
    }

    #[test]
    fn test_join_picks_supertype() {
        let defs = TypeDefs::builtin();
        let l = int_literal();
        let r = integer();

        assert_eq!(join(&defs, Some(&l), Some(&r)), Some(&integer()));
        assert_eq!(join(&defs, Some(&r), Some(&l)), Some(&integer()));
        assert_eq!(join(&defs, Some(&l), None), None);
        assert_eq!(join(&defs, Some(&string()), Some(&integer())), None);
    }

    #[test]
    fn test_union_of_related_collapses() {
        let defs = TypeDefs::builtin();
        assert_eq!(union_of(&defs, int_literal(), integer()), integer());
    }

    #[test]
    fn test_union_of_unrelated_builds_union() {
        let defs = TypeDefs::builtin();
        assert_eq!(
            union_of(&defs, integer(), string()),
            Type::union(integer(), string())
        );
    }

    #[test]
    fn test_provides_through_user_trait() {
        let mut defs = TypeDefs::builtin();
        let wombat = Symbol::intern("Wombat");
        let animal = Symbol::intern("Animal");
        defs.add(wombat, &[animal]);

        assert!(is_subtype(
            &defs,
            &Type::builtin(wombat),
            &Type::builtin(animal)
        ));
    }
}
