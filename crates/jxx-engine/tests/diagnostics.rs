//! Errors reported by a whole translation, rendered as diagnostics

use codespan_reporting::term::termcolor::NoColor;
use jxx_engine::{CompileError, Diagnostic, Translator, TranslatorConfig};

fn errors(sources: &[(&str, &str)]) -> (Translator, Vec<CompileError>) {
    let mut translator = Translator::new(TranslatorConfig::default());
    for (name, text) in sources {
        translator.add_source(*name, *text);
    }
    let errors = match translator.translate() {
        Ok(_) => panic!("translation unexpectedly succeeded"),
        Err(errors) => errors,
    };
    (translator, errors)
}

fn render(translator: &Translator, error: &CompileError) -> String {
    let mut out = NoColor::new(Vec::new());
    Diagnostic::from_compile_error(error)
        .emit_to(&mut out, translator.files())
        .unwrap();
    String::from_utf8(out.into_inner()).unwrap()
}

#[test]
fn test_unresolved_parent_points_at_its_file() {
    let (translator, errors) = errors(&[("A.java", "class A {}"), ("B.java", "class B extends Missing {}")]);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code(), "E1002");
    assert_eq!(errors[0].file(), 1);

    let text = render(&translator, &errors[0]);
    assert!(text.contains("error[E1002]"));
    assert!(text.contains("B.java:1:"));
    assert!(text.contains("every superclass must be part of the translation"));
}

#[test]
fn test_syntax_errors_are_collected_before_analysis() {
    // The unresolved parent would fail analysis; syntax errors win
    let (_, errors) = errors(&[
        ("A.java", "class A extends Missing { int }"),
        ("B.java", "class B { void f( }"),
    ]);
    assert!(errors.len() >= 2);
    assert!(errors.iter().all(|e| matches!(e, CompileError::Syntax { .. })));
    assert!(errors.iter().any(|e| e.file() == 0));
    assert!(errors.iter().any(|e| e.file() == 1));
}

#[test]
fn test_ambiguous_call_lists_candidates() {
    let source = r#"
        class A {
            static void f(int a, long b) {}
            static void f(long a, int b) {}
            static void g() { f(1, 2); }
        }
    "#;
    let (translator, errors) = errors(&[("A.java", source)]);
    assert_eq!(errors[0].code(), "E2003");

    let text = render(&translator, &errors[0]);
    assert!(text.contains("Call to 'f' is ambiguous"));
    assert!(text.contains("candidates:"));
    assert!(text.contains("cast an argument to select one overload"));
}

#[test]
fn test_private_member_across_classes() {
    let (_, errors) = errors(&[
        ("A.java", "class A { private int secret; }"),
        ("B.java", "class B { int peek(A a) { return a.secret; } }"),
    ]);
    assert_eq!(errors[0].code(), "E2004");
    assert_eq!(errors[0].file(), 1);
}

#[test]
fn test_access_checks_can_be_disabled() {
    let mut config = TranslatorConfig::default();
    config.translate.access_checks = false;
    let mut translator = Translator::new(config);
    translator.add_source("A.java", "class A { private int secret; }");
    translator.add_source("B.java", "class B { int peek(A a) { return a.secret; } }");
    assert!(translator.translate().is_ok());
}

#[test]
fn test_json_rendering() {
    let (translator, errors) = errors(&[("A.java", "class A { void f() { g(); } }")]);
    let json = Diagnostic::from_compile_error(&errors[0])
        .to_json(translator.files())
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["code"], "E2001");
    assert_eq!(value["labels"][0]["file"], "A.java");
    assert_eq!(value["labels"][0]["start_line"], 1);
}
