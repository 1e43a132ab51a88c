//! Implementation emission

use super::writer::CodeWriter;
use super::GENERATED_BANNER;
use crate::lower::body::escape;
use crate::lower::{ArrayClass, CppClass, CppFunction, CppUnit, MainWrapper};
use jxx_types::template;

/// Helpers shared by every translated function: value formatting for
/// string concatenation and the print statements.
const PRELUDE: &[&str] = &[
    "[[maybe_unused]] void __jxx_put(std::ostringstream& out, java::lang::String value) {",
    "  if (value == __rt::null()) out << \"null\"; else out << value;",
    "}",
    "[[maybe_unused]] void __jxx_put(std::ostringstream& out, bool value) { out << (value ? \"true\" : \"false\"); }",
    "[[maybe_unused]] void __jxx_put(std::ostringstream& out, char value) { out << value; }",
    "[[maybe_unused]] void __jxx_put(std::ostringstream& out, int8_t value) { out << int32_t(value); }",
    "[[maybe_unused]] void __jxx_put(std::ostringstream& out, int16_t value) { out << value; }",
    "[[maybe_unused]] void __jxx_put(std::ostringstream& out, int32_t value) { out << value; }",
    "[[maybe_unused]] void __jxx_put(std::ostringstream& out, int64_t value) { out << value; }",
    "[[maybe_unused]] void __jxx_put(std::ostringstream& out, float value) { out << value; }",
    "[[maybe_unused]] void __jxx_put(std::ostringstream& out, double value) { out << value; }",
    "",
    "template <typename T>",
    "void __jxx_put(std::ostringstream& out, __rt::Ptr<T> value) {",
    "  java::lang::Object object = value;",
    "  if (object == __rt::null()) out << \"null\"; else out << object->__vptr->toString(object);",
    "}",
    "",
    "template <typename... Parts>",
    "java::lang::String __jxx_concat(Parts... parts) {",
    "  std::ostringstream out;",
    "  (__jxx_put(out, parts), ...);",
    "  return __rt::literal(out.str().c_str());",
    "}",
    "",
    "template <typename T>",
    "void __jxx_print(T value) {",
    "  std::ostringstream out;",
    "  __jxx_put(out, value);",
    "  std::cout << out.str();",
    "}",
    "",
    "template <typename T>",
    "void __jxx_println(T value) {",
    "  __jxx_print(value);",
    "  std::cout << std::endl;",
    "}",
    "",
    "[[maybe_unused]] void __jxx_println() { std::cout << std::endl; }",
];

/// Render the implementation file for `unit`.
pub fn emit_implementation(unit: &CppUnit, header_name: &str) -> String {
    let mut w = CodeWriter::new();
    w.line(GENERATED_BANNER);
    w.line(&format!("#include \"{}\"", header_name));
    w.blank();
    for include in ["<cmath>", "<cstdint>", "<iostream>", "<sstream>"] {
        w.line(&format!("#include {}", include));
    }
    w.blank();

    w.braced("namespace", "", |w| {
        for line in PRELUDE {
            w.line(line);
        }
    });
    w.blank();

    // Specializations must precede any use that would instantiate the
    // primary template
    if !unit.arrays.is_empty() {
        w.braced("namespace __rt", "", |w| {
            for array in &unit.arrays {
                array_class(w, array);
            }
        });
        w.blank();
    }

    for class in &unit.classes {
        class_definitions(&mut w, class);
    }

    if let Some(main) = &unit.main {
        main_wrapper(&mut w, main);
    }
    w.finish()
}

fn array_class(w: &mut CodeWriter, array: &ArrayClass) {
    w.line("template<>");
    w.braced(
        &format!("java::lang::Class {}::__class()", template("Array", &array.element)),
        "",
        |w| {
            w.line(&format!(
                "static java::lang::Class k = new java::lang::__Class(literal(\"{}\"), {}, {});",
                escape(&array.java_name),
                array.parent,
                array.component
            ));
            w.line("return k;");
        },
    );
}

fn class_definitions(w: &mut CodeWriter, class: &CppClass) {
    let s = &class.qualified_struct;
    w.line(&format!("// {}", class.java_name));

    let mut inits = vec!["__vptr(&__vtable)".to_string()];
    inits.extend(class.fields.iter().map(|f| format!("{}()", f.name)));
    w.line(&format!("{}::{}() : {} {{", s, class.struct_name, inits.join(", ")));
    w.line("}");
    w.blank();

    for field in &class.static_fields {
        match &field.init {
            Some(init) => w.line(&format!("{} {}::{} = {};", field.ty, s, field.name, init)),
            None => w.line(&format!("{} {}::{} = {}();", field.ty, s, field.name, field.ty)),
        }
    }
    if !class.static_fields.is_empty() {
        w.blank();
    }

    w.braced(&format!("java::lang::Class {}::__class()", s), "", |w| {
        w.line(&format!(
            "static java::lang::Class k = new java::lang::__Class(__rt::literal(\"{}\"), {}::__class());",
            escape(&class.java_name),
            class.parent_struct
        ));
        w.line("return k;");
    });
    w.blank();
    w.line(&format!("{} {}::__vtable;", qualified_vtable(class), s));
    w.blank();

    for function in &class.functions {
        function_definition(w, s, function);
        w.blank();
    }
}

fn qualified_vtable(class: &CppClass) -> String {
    if class.namespace.is_empty() {
        class.vtable_name.clone()
    } else {
        format!("{}::{}", class.namespace.join("::"), class.vtable_name)
    }
}

fn function_definition(w: &mut CodeWriter, owner: &str, function: &CppFunction) {
    let params: Vec<String> = function.params.iter().map(|(ty, name)| format!("{} {}", ty, name)).collect();
    let head = format!("{} {}::{}({})", function.ret, owner, function.name, params.join(", "));
    w.braced(&head, "", |w| w.statements(&function.body));
}

fn main_wrapper(w: &mut CodeWriter, main: &MainWrapper) {
    w.braced("int main(int argc, char* argv[])", "", |w| {
        w.line("__rt::Ptr<__rt::Array<java::lang::String> > args(new __rt::Array<java::lang::String>(argc - 1));");
        w.braced("for (int32_t i = 1; i < argc; i++)", "", |w| {
            w.line("(*args)[i - 1] = __rt::literal(argv[i]);");
        });
        w.line(&format!("{}(args);", main.function));
        w.line("return 0;");
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lower::{CppExpr, CppStaticField, CppStmt};
    use crate::model::ClassId;

    fn empty_class() -> CppClass {
        CppClass {
            id: ClassId(3),
            java_name: "A".to_string(),
            namespace: Vec::new(),
            alias: "A".to_string(),
            qualified_alias: "A".to_string(),
            struct_name: "__A".to_string(),
            qualified_struct: "__A".to_string(),
            vtable_name: "__A_VT".to_string(),
            parent_struct: "java::lang::__Object".to_string(),
            fields: Vec::new(),
            static_fields: Vec::new(),
            functions: Vec::new(),
            slots: Vec::new(),
        }
    }

    #[test]
    fn test_class_in_default_package() {
        let mut class = empty_class();
        class.static_fields.push(CppStaticField {
            ty: "int32_t".to_string(),
            name: "count".to_string(),
            init: Some(CppExpr::raw("3")),
        });
        class.functions.push(CppFunction {
            ret: "A".to_string(),
            name: "__init".to_string(),
            params: vec![("A".to_string(), "__this".to_string())],
            body: vec![CppStmt::Return(Some(CppExpr::raw("__this")))],
        });
        let unit = CppUnit {
            classes: vec![class],
            arrays: Vec::new(),
            main: None,
        };
        let text = emit_implementation(&unit, "output.h");
        assert!(text.contains("__A::__A() : __vptr(&__vtable) {\n}"));
        assert!(text.contains("int32_t __A::count = 3;"));
        assert!(text.contains("__A_VT __A::__vtable;"));
        assert!(text.contains("A __A::__init(A __this) {\n  return __this;\n}"));
        assert!(!text.contains("int main"));
    }

    #[test]
    fn test_main_wrapper_forwards_arguments() {
        let unit = CppUnit {
            classes: Vec::new(),
            arrays: Vec::new(),
            main: Some(MainWrapper {
                function: "app::__Main::main".to_string(),
            }),
        };
        let text = emit_implementation(&unit, "output.h");
        assert!(text.contains("(*args)[i - 1] = __rt::literal(argv[i]);"));
        assert!(text.contains("  app::__Main::main(args);\n  return 0;\n}"));
    }
}
