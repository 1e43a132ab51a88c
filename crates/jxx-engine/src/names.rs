//! C++ spellings of Java names
//!
//! Java identifiers are kept wherever C++ allows it. Overloaded methods and
//! constructors get their parameter types appended, and identifiers that
//! would collide with C++ keywords or generated names get a trailing `_`.

use crate::model::{ClassId, Klass};
use crate::table::ClassTable;

/// Name of every translated constructor function.
pub const INIT: &str = "__init";

/// Receiver parameter of translated instance methods.
pub const THIS: &str = "__this";

/// Words that are identifiers in Java but reserved or load-bearing in the
/// generated C++.
const CPP_RESERVED: &[&str] = &[
    "alignas", "alignof", "and", "and_eq", "asm", "auto", "bitand", "bitor", "bool",
    "char16_t", "char32_t", "char8_t", "co_await", "co_return", "co_yield", "compl",
    "concept", "const_cast", "consteval", "constexpr", "constinit", "decltype", "delete",
    "dynamic_cast", "explicit", "export", "extern", "friend", "inline", "java", "mutable",
    "namespace", "noexcept", "not", "not_eq", "nullptr", "operator", "or", "or_eq",
    "register", "reinterpret_cast", "requires", "signed", "sizeof", "static_assert",
    "static_cast", "std", "struct", "template", "thread_local", "typedef", "typeid",
    "typename", "union", "unsigned", "using", "virtual", "wchar_t", "xor", "xor_eq",
];

/// A Java identifier made safe for use as a C++ identifier.
pub fn cpp_identifier(name: &str) -> String {
    if name.starts_with("__") || CPP_RESERVED.contains(&name) {
        format!("{}_", name)
    } else {
        name.to_string()
    }
}

fn with_parameters(base: String, params: impl Iterator<Item = String>) -> String {
    let suffix: Vec<String> = params.collect();
    if suffix.is_empty() {
        base
    } else {
        format!("{}_{}", base, suffix.join("_"))
    }
}

/// Name of method slot `index` as seen from `klass`.
///
/// Plain unless the name is overloaded in the class's method list, in
/// which case the parameter types are appended, plus a `_` for every method
/// already spelled that way. Predefined implementors always keep the plain
/// name.
pub fn method_name(klass: &Klass, index: usize, implementor_predefined: bool) -> String {
    let method = &klass.methods[index];
    let base = cpp_identifier(&method.name);
    if implementor_predefined || !klass.is_overloaded(&method.name) {
        return base;
    }
    let mut name = with_parameters(base, method.params.iter().map(|p| p.ty.mangled_name()));
    // A mangled name must not land on a method declared under that spelling
    while klass.methods.iter().any(|m| cpp_identifier(&m.name) == name) {
        name.push('_');
    }
    name
}

/// Name of the function that implements slot `index` of `class`.
///
/// Spelled as the implementor's own method list sees it, so every class
/// inheriting the slot refers to the same definition.
pub fn definition_name(table: &ClassTable, class: ClassId, index: usize) -> String {
    let implementor = table.get(table.get(class).methods[index].implementor);
    method_name(implementor, index, implementor.predefined)
}

/// Name of vtable slot `index` in the vtable of `class`.
pub fn slot_name(table: &ClassTable, class: ClassId, index: usize) -> String {
    let klass = table.get(class);
    let implementor = table.get(klass.methods[index].implementor);
    method_name(klass, index, implementor.predefined)
}

/// Name of the `__init` function for constructor `index` of `klass`.
pub fn constructor_name(klass: &Klass, index: usize) -> String {
    let base = INIT.to_string();
    if klass.constructors.len() < 2 {
        return base;
    }
    with_parameters(
        base,
        klass.constructors[index]
            .params
            .iter()
            .map(|p| p.ty.mangled_name()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClassId, Param, Scope};
    use jxx_parser::Span;
    use jxx_types::{QualifiedType, Type};

    fn class_with(methods: &[(&str, Vec<Type>)]) -> Klass {
        let mut klass = Klass::new(
            ClassId(5),
            QualifiedType::parse("p.A").unwrap(),
            Scope::default(),
            Some(0),
            Span::default(),
        );
        for (name, params) in methods {
            let params = params.iter().map(|ty| Param::new("x", ty.clone())).collect();
            let method = klass.new_method(*name, params, Type::void());
            klass.incorporate_method(method).unwrap();
        }
        klass
    }

    #[test]
    fn test_plain_names_when_not_overloaded() {
        let klass = class_with(&[("foo", vec![Type::int()]), ("bar", vec![])]);
        assert_eq!(method_name(&klass, 0, false), "foo");
        assert_eq!(method_name(&klass, 1, false), "bar");
    }

    #[test]
    fn test_overloads_are_mangled() {
        let klass = class_with(&[
            ("add", vec![Type::int(), Type::int()]),
            ("add", vec![Type::string(), Type::int().array_of(1)]),
            ("add", vec![]),
        ]);
        assert_eq!(method_name(&klass, 0, false), "add_int_int");
        assert_eq!(method_name(&klass, 1, false), "add_java_lang_String_int_array");
        assert_eq!(method_name(&klass, 2, false), "add");
        assert_eq!(method_name(&klass, 0, true), "add");
    }

    #[test]
    fn test_mangled_name_avoids_declared_method() {
        let klass = class_with(&[
            ("add", vec![Type::int(), Type::int()]),
            ("add", vec![]),
            ("add_int_int", vec![]),
            ("add_int_int_", vec![Type::int()]),
        ]);
        assert_eq!(method_name(&klass, 0, false), "add_int_int__");
        assert_eq!(method_name(&klass, 1, false), "add");
        assert_eq!(method_name(&klass, 2, false), "add_int_int");
        assert_eq!(method_name(&klass, 3, false), "add_int_int_");
    }

    #[test]
    fn test_constructor_names() {
        let mut klass = class_with(&[]);
        let one = klass.new_constructor(vec![]);
        klass.add_constructor(one).unwrap();
        assert_eq!(constructor_name(&klass, 0), "__init");
        let two = klass.new_constructor(vec![Param::new("x", Type::int())]);
        klass.add_constructor(two).unwrap();
        assert_eq!(constructor_name(&klass, 0), "__init");
        assert_eq!(constructor_name(&klass, 1), "__init_int");
    }

    #[test]
    fn test_cpp_identifier() {
        assert_eq!(cpp_identifier("count"), "count");
        assert_eq!(cpp_identifier("delete"), "delete_");
        assert_eq!(cpp_identifier("__vptr"), "__vptr_");
    }
}
