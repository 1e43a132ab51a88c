//! Subtyping rules for the jxx type model
//!
//! Class inheritance is answered by a [`ClassHierarchy`], normally the class
//! table of the compilation. Arrays are covariant in their element class and
//! every reference type is a subtype of `java.lang.Object`.

use crate::ty::{QualifiedType, Type};

/// Upper bound on superclass hops, guards against malformed hierarchies.
const MAX_HIERARCHY_DEPTH: usize = 4096;

/// Source of superclass links for class types
pub trait ClassHierarchy {
    /// Direct superclass of `class`, or `None` for the root and for unknown classes.
    fn superclass_of(&self, class: &QualifiedType) -> Option<QualifiedType>;
}

/// Check if `sub` is a strict subclass of `sup` by walking superclass links.
fn class_inherits<H: ClassHierarchy + ?Sized>(
    hierarchy: &H,
    sub: &QualifiedType,
    sup: &QualifiedType,
) -> bool {
    if sub == sup {
        return false;
    }
    if sup.is_object() {
        return true;
    }

    let mut current = hierarchy.superclass_of(sub);
    let mut steps = 0;
    while let Some(class) = current {
        if &class == sup {
            return true;
        }
        // The walk ends at the root
        if class.is_object() || steps >= MAX_HIERARCHY_DEPTH {
            return false;
        }
        steps += 1;
        current = hierarchy.superclass_of(&class);
    }
    false
}

/// Strict inheritance: `sub` is a proper subtype of `sup`.
pub fn inherits_from<H: ClassHierarchy + ?Sized>(hierarchy: &H, sub: &Type, sup: &Type) -> bool {
    match (sub, sup) {
        (_, Type::Null) => false,
        (Type::Null, sup) => sup.is_reference(),
        (Type::Qualified { ty: a, dimensions: 0 }, Type::Qualified { ty: b, dimensions: 0 }) => {
            class_inherits(hierarchy, a, b)
        }
        (Type::Primitive { dimensions: 0, .. }, _) => false,
        // Every array is an Object
        (_, Type::Qualified { ty, dimensions: 0 }) => sub.is_array() && ty.is_object(),
        (_, _) if sub.dimensions() == sup.dimensions() => match (sub.base(), sup.base()) {
            (Type::Qualified { ty: a, .. }, Type::Qualified { ty: b, .. }) => {
                class_inherits(hierarchy, &a, &b)
            }
            _ => false,
        },
        // T[][] is an Object[]
        (_, Type::Qualified { ty, dimensions }) => *dimensions < sub.dimensions() && ty.is_object(),
        _ => false,
    }
}

/// Reflexive subtyping: `sub` equals `sup` or inherits from it.
pub fn is_subtype<H: ClassHierarchy + ?Sized>(hierarchy: &H, sub: &Type, sup: &Type) -> bool {
    sub == sup || inherits_from(hierarchy, sub, sup)
}

/// Method invocation conversion: identity, primitive widening or reference widening.
pub fn is_convertible<H: ClassHierarchy + ?Sized>(hierarchy: &H, from: &Type, to: &Type) -> bool {
    match (from.as_primitive(), to.as_primitive()) {
        (Some(f), Some(t)) => f.widens_to(t) && !to.is_void(),
        (None, None) => is_subtype(hierarchy, from, to),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::{qualify, PrimitiveType};
    use std::collections::HashMap;

    struct Links(HashMap<QualifiedType, QualifiedType>);

    impl ClassHierarchy for Links {
        fn superclass_of(&self, class: &QualifiedType) -> Option<QualifiedType> {
            if class.is_object() {
                return None;
            }
            Some(self.0.get(class).cloned().unwrap_or_else(QualifiedType::object))
        }
    }

    fn class(name: &str) -> Type {
        Type::qualified(qualify(&["p", name]).unwrap())
    }

    /// A <- B <- C, all in package p
    fn chain() -> Links {
        let mut links = HashMap::new();
        links.insert(qualify(&["p", "B"]).unwrap(), qualify(&["p", "A"]).unwrap());
        links.insert(qualify(&["p", "C"]).unwrap(), qualify(&["p", "B"]).unwrap());
        Links(links)
    }

    #[test]
    fn test_inherits_from_walks_the_chain() {
        let h = chain();
        assert!(inherits_from(&h, &class("C"), &class("A")));
        assert!(inherits_from(&h, &class("B"), &class("A")));
        assert!(!inherits_from(&h, &class("A"), &class("C")));
        assert!(!inherits_from(&h, &class("A"), &class("A")));
        assert!(inherits_from(&h, &class("A"), &Type::object()));
    }

    #[test]
    fn test_subtype_is_reflexive() {
        let h = chain();
        assert!(is_subtype(&h, &class("A"), &class("A")));
        assert!(is_subtype(&h, &Type::int(), &Type::int()));
    }

    #[test]
    fn test_arrays_are_covariant() {
        let h = chain();
        assert!(inherits_from(&h, &class("C").array_of(1), &class("A").array_of(1)));
        assert!(inherits_from(&h, &Type::int().array_of(1), &Type::object()));
        assert!(inherits_from(&h, &class("A").array_of(2), &Type::object().array_of(1)));
        assert!(!inherits_from(&h, &Type::int().array_of(1), &Type::object().array_of(1)));
    }

    #[test]
    fn test_null_converts_to_references_only() {
        let h = chain();
        assert!(is_convertible(&h, &Type::Null, &class("A")));
        assert!(is_convertible(&h, &Type::Null, &Type::int().array_of(1)));
        assert!(!is_convertible(&h, &Type::Null, &Type::int()));
    }

    #[test]
    fn test_primitive_conversions() {
        let h = chain();
        let char_ty = Type::primitive(PrimitiveType::Char);
        assert!(is_convertible(&h, &char_ty, &Type::int()));
        assert!(!is_convertible(&h, &Type::int(), &char_ty));
        assert!(!is_convertible(&h, &Type::int(), &Type::string()));
    }
}
