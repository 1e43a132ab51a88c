//! Classes supplied by the runtime library
//!
//! `java.lang.Object`, `java.lang.String` and `java.lang.Class` are modelled
//! so calls against them resolve, but their layouts come from the runtime
//! header and are never emitted.

use super::{ClassId, Klass, Member, Param, Scope};
use jxx_parser::Span;
use jxx_types::{PrimitiveType, QualifiedType, Type};

/// Handle of `java.lang.Object`, always the first class in the table.
pub const OBJECT: ClassId = ClassId(0);
/// Handle of `java.lang.String`.
pub const STRING: ClassId = ClassId(1);
/// Handle of `java.lang.Class`.
pub const CLASS: ClassId = ClassId(2);

/// The root methods, in vtable order.
pub const ROOT_METHODS: [&str; 4] = ["hashCode", "equals", "getClass", "toString"];

fn predefined(id: ClassId, name: QualifiedType) -> Klass {
    let mut klass = Klass::new(id, name, Scope::java_lang(), None, Span::default());
    klass.predefined = true;
    klass.visibility = super::Visibility::Public;
    klass
}

fn seeded(id: ClassId, name: QualifiedType, object: &Klass) -> Klass {
    let mut klass = predefined(id, name);
    klass.parent = Some(object.id);
    klass.methods = object.methods.clone();
    for method in &mut klass.methods {
        method.rebind(id);
    }
    klass
}

// Runtime signatures are distinct, so this never hits a conflict
fn add(klass: &mut Klass, name: &str, params: &[Type], ret: Type) {
    let params = params
        .iter()
        .enumerate()
        .map(|(i, ty)| Param::new(format!("arg{}", i), ty.clone()))
        .collect();
    let method = klass.new_method(name, params, ret);
    match klass.methods.iter().position(|m| m.same_signature(&method)) {
        Some(index) => klass.methods[index] = method.clone(),
        None => klass.methods.push(method.clone()),
    }
    klass.declared_methods.push(method);
}

/// `java.lang.Object` with its four intrinsic methods.
pub fn object() -> Klass {
    let mut klass = predefined(OBJECT, QualifiedType::object());
    add(&mut klass, "hashCode", &[], Type::int());
    add(&mut klass, "equals", &[Type::object()], Type::boolean());
    add(&mut klass, "getClass", &[], Type::class());
    add(&mut klass, "toString", &[], Type::string());
    let ctor = klass.new_constructor(Vec::new());
    klass.constructors.push(ctor);
    klass
}

/// `java.lang.String`, seeded from `object`.
pub fn string(object: &Klass) -> Klass {
    let mut klass = seeded(STRING, QualifiedType::string(), object);
    add(&mut klass, "hashCode", &[], Type::int());
    add(&mut klass, "equals", &[Type::object()], Type::boolean());
    add(&mut klass, "toString", &[], Type::string());
    add(&mut klass, "length", &[], Type::int());
    add(
        &mut klass,
        "charAt",
        &[Type::int()],
        Type::primitive(PrimitiveType::Char),
    );
    klass
}

/// `java.lang.Class`, seeded from `object`.
pub fn class(object: &Klass) -> Klass {
    let mut klass = seeded(CLASS, QualifiedType::class(), object);
    add(&mut klass, "toString", &[], Type::string());
    add(&mut klass, "getName", &[], Type::string());
    add(&mut klass, "getSuperclass", &[], Type::class());
    add(&mut klass, "isPrimitive", &[], Type::boolean());
    add(&mut klass, "isArray", &[], Type::boolean());
    add(&mut klass, "getComponentType", &[], Type::class());
    add(&mut klass, "isInstance", &[Type::object()], Type::boolean());
    klass
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_root_methods_in_order() {
        let object = object();
        let names: Vec<&str> = object.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ROOT_METHODS);
        assert!(object.predefined);
        assert_eq!(object.parent, None);
    }

    #[test]
    fn test_string_overrides_in_place() {
        let object = object();
        let string = string(&object);
        assert_eq!(string.methods.len(), 6);
        assert_eq!(string.methods[3].name, "toString");
        assert_eq!(string.methods[3].implementor, STRING);
        assert_eq!(string.methods[2].implementor, OBJECT);
        assert!(string.constructors.is_empty());
    }

    #[test]
    fn test_class_methods() {
        let object = object();
        let class = class(&object);
        assert_eq!(class.methods.len(), 10);
        assert_eq!(class.methods[9].name, "isInstance");
    }
}
