//! Header emission
//!
//! Forward declarations come first so every struct can name every other
//! class's smart pointer typedef. Struct and vtable definitions follow in
//! parent-first order, since a vtable initializer takes the address of its
//! parent's functions.

use super::writer::CodeWriter;
use super::GENERATED_BANNER;
use crate::lower::{CppClass, CppUnit, SlotInit};

/// Render the header for `unit`.
pub fn emit_header(unit: &CppUnit, header_name: &str, runtime_header: &str) -> String {
    let mut w = CodeWriter::new();
    let guard = include_guard(header_name);
    w.line(GENERATED_BANNER);
    w.line(&format!("#ifndef {}", guard));
    w.line(&format!("#define {}", guard));
    w.blank();
    w.line(&format!("#include \"{}\"", runtime_header));
    w.blank();

    for class in &unit.classes {
        forward_declarations(&mut w, class);
    }
    w.blank();

    for class in &unit.classes {
        w.open_namespaces(&class.namespace);
        layout(&mut w, class);
        w.blank();
        vtable(&mut w, class);
        w.close_namespaces(&class.namespace);
        w.blank();
    }

    w.line(&format!("#endif // {}", guard));
    w.finish()
}

/// `output.h` becomes `JXX_OUTPUT_H`.
pub fn include_guard(header_name: &str) -> String {
    let file = header_name.rsplit(&['/', '\\'][..]).next().unwrap_or(header_name);
    let mangled: String = file
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect();
    format!("JXX_{}", mangled)
}

fn forward_declarations(w: &mut CodeWriter, class: &CppClass) {
    w.open_namespaces(&class.namespace);
    w.line(&format!("struct {};", class.struct_name));
    w.line(&format!("struct {};", class.vtable_name));
    w.line(&format!("typedef __rt::Ptr<{}> {};", class.struct_name, class.alias));
    w.close_namespaces(&class.namespace);
}

fn layout(w: &mut CodeWriter, class: &CppClass) {
    w.braced(&format!("struct {}", class.struct_name), ";", |w| {
        w.line(&format!("{}* __vptr;", class.vtable_name));
        for field in &class.fields {
            w.line(&format!("{} {};", field.ty, field.name));
        }
        w.blank();
        w.line(&format!("{}();", class.struct_name));
        w.blank();

        for function in &class.functions {
            let params: Vec<String> = function.params.iter().map(|(ty, name)| format!("{} {}", ty, name)).collect();
            w.line(&format!("static {} {}({});", function.ret, function.name, params.join(", ")));
        }
        for field in &class.static_fields {
            w.line(&format!("static {} {};", field.ty, field.name));
        }
        if !class.functions.is_empty() || !class.static_fields.is_empty() {
            w.blank();
        }

        w.line("static java::lang::Class __class();");
        w.line(&format!("static {} __vtable;", class.vtable_name));
    });
}

fn vtable(w: &mut CodeWriter, class: &CppClass) {
    w.braced(&format!("struct {}", class.vtable_name), ";", |w| {
        w.line("java::lang::Class __isa;");
        w.line(&format!("void (*__delete)({}*);", class.struct_name));
        for slot in &class.slots {
            w.line(&format!("{} (*{})({});", slot.ret, slot.name, slot.params.join(", ")));
        }
        w.blank();

        // Initializers pair positionally with the slots above
        let mut inits = vec![
            format!("__isa({}::__class())", class.struct_name),
            format!("__delete(&__rt::__delete<{}>)", class.struct_name),
        ];
        for slot in &class.slots {
            inits.push(match &slot.init {
                SlotInit::Direct(definition) => format!("{}(&{})", slot.name, definition),
                SlotInit::Cast(definition) => format!("{}(({}) &{})", slot.name, slot.pointer_type(), definition),
                SlotInit::Abstract => format!("{}(0)", slot.name),
            });
        }

        w.line(&format!("{}()", class.vtable_name));
        w.indented(|w| {
            let last = inits.len() - 1;
            for (i, init) in inits.iter().enumerate() {
                let lead = if i == 0 { ": " } else { "  " };
                let tail = if i == last { "" } else { "," };
                w.line(&format!("{}{}{}", lead, init, tail));
            }
        });
        w.line("{");
        w.line("}");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_include_guard() {
        assert_eq!(include_guard("output.h"), "JXX_OUTPUT_H");
        assert_eq!(include_guard("gen/my-out.hpp"), "JXX_MY_OUT_HPP");
    }
}
