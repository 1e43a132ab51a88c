//! End-to-end translation of the fixture programs

use jxx_engine::lower::SlotInit;
use jxx_engine::{Artifacts, Translator, TranslatorConfig};
use pretty_assertions::assert_eq;
use std::path::PathBuf;

fn fixture(path: &str) -> (String, String) {
    let full = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(path);
    let text = std::fs::read_to_string(&full).unwrap_or_else(|e| panic!("reading {}: {}", full.display(), e));
    (path.to_string(), text)
}

fn translate_with(config: TranslatorConfig, paths: &[&str]) -> Artifacts {
    let mut translator = Translator::new(config);
    for path in paths {
        let (name, text) = fixture(path);
        translator.add_source(name, text);
    }
    match translator.translate() {
        Ok(artifacts) => artifacts,
        Err(errors) => panic!("translation failed: {:?}", errors),
    }
}

fn translate(paths: &[&str]) -> Artifacts {
    translate_with(TranslatorConfig::default(), paths)
}

const SHAPES: &[&str] = &[
    "shapes/Main.java",
    "shapes/Square.java",
    "shapes/Circle.java",
    "shapes/Shape.java",
];

fn position(text: &str, needle: &str) -> usize {
    text.find(needle).unwrap_or_else(|| panic!("missing `{}`", needle))
}

#[test]
fn test_classes_are_emitted_parent_first() {
    let artifacts = translate(SHAPES);
    let order: Vec<&str> = artifacts
        .lowered
        .classes
        .iter()
        .map(|c| c.java_name.as_str())
        .filter(|name| name.starts_with("shapes."))
        .collect();
    let shape = order.iter().position(|n| *n == "shapes.Shape").unwrap();
    let circle = order.iter().position(|n| *n == "shapes.Circle").unwrap();
    let square = order.iter().position(|n| *n == "shapes.Square").unwrap();
    assert!(shape < circle && shape < square);

    let header = &artifacts.header;
    assert!(position(header, "struct __Shape {") < position(header, "struct __Circle {"));
    assert!(position(header, "struct __Shape {") < position(header, "struct __Square {"));
}

#[test]
fn test_header_layout() {
    let header = translate(SHAPES).header;
    assert!(header.starts_with("// Generated by jxx. Do not edit.\n#ifndef JXX_OUTPUT_H\n#define JXX_OUTPUT_H\n"));
    assert!(header.contains("#include \"java_lang.h\""));
    assert!(header.contains("namespace shapes {"));
    assert!(header.contains("typedef __rt::Ptr<__Circle> Circle;"));
    assert!(header.contains("__Circle_VT* __vptr;"));
    assert!(header.contains("static shapes::Circle __init(shapes::Circle __this, double radius);"));
    assert!(header.contains("static int32_t count;"));
    assert!(header.trim_end().ends_with("#endif // JXX_OUTPUT_H"));

    // Forward declarations precede every layout
    assert!(position(&header, "struct __Main;") < position(&header, "struct __Shape {"));
}

#[test]
fn test_vtable_slots_follow_method_list() {
    let artifacts = translate(SHAPES);
    let circle = artifacts
        .lowered
        .classes
        .iter()
        .find(|c| c.java_name == "shapes.Circle")
        .unwrap();
    let slots: Vec<&str> = circle.slots.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(slots, ["hashCode", "equals", "getClass", "toString", "area"]);
    assert_eq!(circle.slots[3].init, SlotInit::Cast("shapes::__Shape::toString".to_string()));
    assert_eq!(circle.slots[4].init, SlotInit::Direct("shapes::__Circle::area".to_string()));

    let header = &artifacts.header;
    assert!(header.contains("toString(&shapes::__Square::toString)"));
    assert!(header.contains(") &shapes::__Shape::toString)"));
    assert!(header.contains("area(0)"));
}

#[test]
fn test_implementation_layout() {
    let implementation = translate(SHAPES).implementation;
    assert!(implementation.contains("#include \"output.h\""));
    assert!(implementation.contains("java::lang::String __jxx_concat(Parts... parts)"));
    assert!(implementation.contains("int32_t shapes::__Shape::count = 0;"));
    assert!(implementation.contains("shapes::__Circle::__Circle() : __vptr(&__vtable), name(), radius() {"));
    assert!(implementation.contains("__rt::literal(\"shapes.Circle\"), shapes::__Shape::__class());"));
    assert!(implementation.contains("shapes::__Circle_VT shapes::__Circle::__vtable;"));

    // Array specializations come before the first class definition
    assert!(
        position(&implementation, "java::lang::Class Array<shapes::Shape>::__class()")
            < position(&implementation, "// shapes.Shape")
    );
    assert!(implementation.contains("literal(\"[Lshapes.Shape;\")"));
}

#[test]
fn test_constructor_chains_to_super_first() {
    let implementation = translate(SHAPES).implementation;
    let init = position(&implementation, "shapes::Circle shapes::__Circle::__init(shapes::Circle __this, double radius) {");
    let rest = &implementation[init..];
    let chain = position(rest, "shapes::__Shape::__init(__this, __rt::literal(\"circle\"));");
    let assign = position(rest, "(__this->radius = radius);");
    let ret = position(rest, "return __this;");
    assert!(chain < assign && assign < ret);
}

#[test]
fn test_main_wrapper_calls_entry_point() {
    let artifacts = translate(SHAPES);
    let main = artifacts.lowered.main.as_ref().unwrap();
    assert_eq!(main.function, "shapes::__Main::main");
    assert!(artifacts.implementation.contains("  shapes::__Main::main(args);\n  return 0;\n}"));
    assert!(artifacts.implementation.contains("__jxx_println(shapes::__Shape::total());"));
}

#[test]
fn test_configured_main_class() {
    let mut config = TranslatorConfig::default();
    config.translate.main_class = Some("shapes.Main".to_string());
    config.output.header = "shapes.h".to_string();
    let artifacts = translate_with(config, SHAPES);
    assert_eq!(artifacts.header_name, "shapes.h");
    assert!(artifacts.header.contains("#ifndef JXX_SHAPES_H"));
    assert!(artifacts.implementation.contains("#include \"shapes.h\""));
    assert!(artifacts.lowered.main.is_some());
}

#[test]
fn test_overloads_bind_by_argument_types() {
    let artifacts = translate(&["overloads/Calc.java"]);
    let implementation = &artifacts.implementation;
    assert!(implementation.contains("int32_t __Calc::add_int_int(int32_t a, int32_t b) {"));
    assert!(implementation.contains("int32_t sum = __Calc::add_int_int(1, 2);"));
    assert!(implementation.contains("__Calc::add_java_lang_String_int(__rt::literal(\"a\"), 2)"));
    assert_eq!(artifacts.lowered.main.as_ref().unwrap().function, "__Calc::main");
}

#[test]
fn test_file_order_does_not_matter() {
    let mut reversed: Vec<&str> = SHAPES.to_vec();
    reversed.reverse();
    let forward = translate(SHAPES);
    let backward = translate(&reversed);

    let names = |artifacts: &Artifacts| {
        let mut names: Vec<String> = artifacts.lowered.classes.iter().map(|c| c.java_name.clone()).collect();
        names.sort();
        names
    };
    assert_eq!(names(&forward), names(&backward));
    assert_eq!(forward.lowered.main, backward.lowered.main);
}

#[test]
fn test_artifacts_written_to_directory() {
    let artifacts = translate(&["overloads/Calc.java"]);
    let dir = tempfile::tempdir().unwrap();
    let written = artifacts.write_to(dir.path()).unwrap();
    assert_eq!(written, vec![dir.path().join("output.h"), dir.path().join("output.cc")]);
    assert_eq!(std::fs::read_to_string(&written[1]).unwrap(), artifacts.implementation);
}
