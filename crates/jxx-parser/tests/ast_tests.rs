//! Tests for whole-file parsing

use jxx_parser::ast::*;
use jxx_parser::parse_compilation_unit;
use jxx_parser::ParseErrorKind;
use pretty_assertions::assert_eq;

const SHAPES: &str = r#"
package shapes;

import java.util.*;

/** Base of the hierarchy. */
public abstract class Shape {
    protected String name;
    private static int count = 0;

    public Shape(String name) {
        this.name = name;
        count++;
    }

    public abstract double area();

    @Override
    public String toString() {
        return "Shape(" + name + ", " + area() + ")";
    }

    public static int count() { return count; }
}

class Circle extends Shape {
    double r;

    Circle(double r) {
        super("circle");
        this.r = r;
    }

    public double area() {
        return 3.14159 * r * r;
    }

    public static void main(String[] args) {
        Shape[] shapes = new Shape[2];
        shapes[0] = new Circle(1.0);
        shapes[1] = new Circle(2.5);
        for (int i = 0; i < shapes.length; i++) {
            System.out.println(shapes[i]);
        }
        for (Shape s : shapes) {
            if (s instanceof Circle) {
                Circle c = (Circle) s;
                System.out.println(c.r);
            }
        }
    }
}
"#;

fn method<'a>(class: &'a ClassDecl, name: &str) -> &'a MethodDecl {
    class
        .members
        .iter()
        .find_map(|m| match m {
            MemberDecl::Method(method) if method.name.name == name => Some(method),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no method {}", name))
}

#[test]
fn test_parse_program_structure() {
    let unit = parse_compilation_unit(SHAPES).unwrap();

    assert_eq!(unit.package.as_ref().unwrap().dotted(), "shapes");
    assert_eq!(unit.imports.len(), 1);
    assert_eq!(unit.classes.len(), 2);

    let shape = &unit.classes[0];
    assert_eq!(shape.name.name, "Shape");
    assert!(shape.modifiers.is_abstract);
    assert_eq!(shape.modifiers.access, Some(AccessModifier::Public));
    assert!(shape.extends.is_none());
    assert_eq!(shape.members.len(), 6);

    let circle = &unit.classes[1];
    assert_eq!(circle.extends.as_ref().unwrap().display_name(), "Shape");
}

#[test]
fn test_parse_member_details() {
    let unit = parse_compilation_unit(SHAPES).unwrap();
    let shape = &unit.classes[0];

    assert!(method(shape, "area").body.is_none());
    assert_eq!(method(shape, "toString").modifiers.annotations, vec!["Override".to_string()]);
    assert!(method(shape, "count").modifiers.is_static);

    match &shape.members[1] {
        MemberDecl::Field(field) => {
            assert!(field.modifiers.is_static);
            assert_eq!(field.modifiers.access, Some(AccessModifier::Private));
            assert!(field.declarators[0].initializer.is_some());
        }
        other => panic!("expected field, got {:?}", other),
    }
}

#[test]
fn test_parse_constructor_with_super_call() {
    let unit = parse_compilation_unit(SHAPES).unwrap();
    let circle = &unit.classes[1];
    let ctor = circle
        .members
        .iter()
        .find_map(|m| match m {
            MemberDecl::Constructor(c) => Some(c),
            _ => None,
        })
        .unwrap();

    assert_eq!(ctor.params.len(), 1);
    match &ctor.body.statements[0] {
        Statement::ConstructorCall(call) => {
            assert_eq!(call.kind, ConstructorCallKind::Super);
            assert_eq!(call.args.len(), 1);
        }
        other => panic!("expected super call, got {:?}", other),
    }
}

#[test]
fn test_parse_main_body() {
    let unit = parse_compilation_unit(SHAPES).unwrap();
    let main = method(&unit.classes[1], "main");
    let body = main.body.as_ref().unwrap();

    assert_eq!(main.params[0].ty.display_name(), "String[]");
    assert_eq!(body.statements.len(), 5);
    assert!(matches!(body.statements[3], Statement::For(_)));
    assert!(matches!(body.statements[4], Statement::ForEach(_)));
}

#[test]
fn test_spans_cover_source() {
    let source = "class A { int f() { return 1; } }";
    let unit = parse_compilation_unit(source).unwrap();
    let class = &unit.classes[0];
    assert_eq!(class.span.slice(source), source);
    assert_eq!(class.members[0].span().slice(source), "int f() { return 1; }");
}

#[test]
fn test_lex_errors_are_reported_as_parse_errors() {
    let errors = parse_compilation_unit("class A { int x = #; }").unwrap_err();
    assert!(matches!(errors[0].kind, ParseErrorKind::Lex(_)));
}

#[test]
fn test_unsupported_features() {
    let cases = [
        ("class A implements B {}", "interfaces"),
        ("enum E { X }", "enums"),
        ("class A<T> {}", "generic classes"),
        ("class A { void f() { try { } catch (E e) { } } }", "exceptions"),
        ("class A { static { } }", "initializer blocks"),
        ("class A { void f(int... xs) {} }", "variable arity parameters"),
    ];
    for (source, feature) in cases {
        let errors = parse_compilation_unit(source).unwrap_err();
        assert!(
            errors.iter().any(|e| matches!(
                &e.kind,
                ParseErrorKind::Unsupported { feature: f } if f == feature
            )),
            "{} should report {}: {:?}",
            source,
            feature,
            errors
        );
    }
}

#[test]
fn test_multiple_errors_collected() {
    let source = "class A { int = 1; void f() { x + ; } int ok; void g() { return } }";
    let errors = parse_compilation_unit(source).unwrap_err();
    assert_eq!(errors.len(), 3);
}
