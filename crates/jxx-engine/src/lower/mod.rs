//! Lowering
//!
//! Turns the class table and the typed bodies into a C++-shaped model: one
//! [`CppClass`] per user class with its struct layout, vtable layout and
//! function definitions, plus the array descriptors and the program entry
//! point. The emitters print this model without consulting the class table,
//! so the header and the implementation are derived from the same data and
//! cannot disagree on layouts or names.

pub mod body;
pub mod tree;

pub use body::BodyLowerer;
pub use tree::{CppCase, CppExpr, CppForInit, CppStmt};

use crate::body::{ClassBodies, TypedConstructor, TypedFieldInit, TypedFunction};
use crate::model::{predefined, ClassId, Klass};
use crate::names::{self, THIS};
use crate::table::ClassTable;
use jxx_types::{template, Type};
use tracing::debug;

/// A whole translation, ready to print
#[derive(Debug, Clone, PartialEq)]
pub struct CppUnit {
    /// User classes, parents first
    pub classes: Vec<CppClass>,
    /// `__class()` specializations for arrays of user classes
    pub arrays: Vec<ArrayClass>,
    /// The `main` entry point
    pub main: Option<MainWrapper>,
}

/// One translated class
#[derive(Debug, Clone, PartialEq)]
pub struct CppClass {
    /// Class handle
    pub id: ClassId,
    /// Dotted Java name, as reported by `getName()`
    pub java_name: String,
    /// Enclosing C++ namespaces, outermost first
    pub namespace: Vec<String>,
    /// Smart pointer typedef, unqualified
    pub alias: String,
    /// Qualified smart pointer typedef
    pub qualified_alias: String,
    /// Data layout struct, unqualified
    pub struct_name: String,
    /// Qualified data layout struct
    pub qualified_struct: String,
    /// Vtable struct, unqualified
    pub vtable_name: String,
    /// Qualified data layout struct of the superclass
    pub parent_struct: String,
    /// Instance fields, inherited first
    pub fields: Vec<CppField>,
    /// Own static fields
    pub static_fields: Vec<CppStaticField>,
    /// Constructors followed by methods
    pub functions: Vec<CppFunction>,
    /// Vtable slots in layout order
    pub slots: Vec<VtableSlot>,
}

/// An instance field
#[derive(Debug, Clone, PartialEq)]
pub struct CppField {
    /// C++ type
    pub ty: String,
    /// Member name
    pub name: String,
}

/// A static field and its initial value
#[derive(Debug, Clone, PartialEq)]
pub struct CppStaticField {
    /// C++ type
    pub ty: String,
    /// Member name
    pub name: String,
    /// Initializer, value-initialized when absent
    pub init: Option<CppExpr>,
}

/// A static member function of the data layout struct
#[derive(Debug, Clone, PartialEq)]
pub struct CppFunction {
    /// Return type
    pub ret: String,
    /// Function name
    pub name: String,
    /// `(type, name)` pairs, receiver first for instance methods
    pub params: Vec<(String, String)>,
    /// Statements
    pub body: Vec<CppStmt>,
}

/// How a vtable slot is filled
#[derive(Debug, Clone, PartialEq)]
pub enum SlotInit {
    /// The class's own definition
    Direct(String),
    /// An inherited definition, cast to this class's receiver type
    Cast(String),
    /// Abstract, left null
    Abstract,
}

/// One function pointer of a vtable
#[derive(Debug, Clone, PartialEq)]
pub struct VtableSlot {
    /// Return type
    pub ret: String,
    /// Slot name
    pub name: String,
    /// Parameter types, receiver first
    pub params: Vec<String>,
    /// Initializer
    pub init: SlotInit,
}

impl VtableSlot {
    /// `ret (*)(params)`
    pub fn pointer_type(&self) -> String {
        format!("{}(*)({})", self.ret, self.params.join(", "))
    }
}

/// Class descriptor of an array of user class references
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayClass {
    /// C++ element type the specialization applies to
    pub element: String,
    /// Java name, e.g. `[Lpkg.A;`
    pub java_name: String,
    /// Expression yielding the superclass descriptor
    pub parent: String,
    /// Expression yielding the component descriptor
    pub component: String,
}

/// `int main` forwarding to a Java `main(String[])`
#[derive(Debug, Clone, PartialEq)]
pub struct MainWrapper {
    /// Qualified function to call
    pub function: String,
}

// ============================================================================
// Lowering
// ============================================================================

/// Lower every class with rewritten bodies.
///
/// `bodies` must be in parent-first order, as produced by
/// [`rewrite_bodies`](crate::body::rewrite_bodies). `main` names the method
/// slot the entry point forwards to.
pub fn lower(table: &ClassTable, bodies: &[ClassBodies], main: Option<(ClassId, usize)>) -> CppUnit {
    let mut classes = Vec::with_capacity(bodies.len());
    let mut multi_dim = Vec::new();
    for class_bodies in bodies {
        let (class, arrays) = lower_class(table, class_bodies);
        debug!(
            target: "jxx::lower",
            class = %class.java_name,
            fields = class.fields.len(),
            slots = class.slots.len(),
            functions = class.functions.len(),
            "lowered class"
        );
        classes.push(class);
        for use_ in arrays {
            if !multi_dim.contains(&use_) {
                multi_dim.push(use_);
            }
        }
    }

    let mut arrays: Vec<ArrayClass> = bodies.iter().map(|b| array_class(table, b.class, 1)).collect();
    multi_dim.sort_by_key(|(_, dims)| *dims);
    arrays.extend(multi_dim.into_iter().map(|(class, dims)| array_class(table, class, dims)));

    let main = main.map(|(class, index)| {
        let implementor = table.get(class).methods[index].implementor;
        MainWrapper {
            function: format!(
                "{}::{}",
                table.get(implementor).name.struct_name(),
                names::definition_name(table, class, index)
            ),
        }
    });

    CppUnit { classes, arrays, main }
}

fn lower_class(table: &ClassTable, bodies: &ClassBodies) -> (CppClass, Vec<(ClassId, usize)>) {
    let klass = table.get(bodies.class);
    let parent = klass.parent.unwrap_or(predefined::OBJECT);
    let mut arrays = Vec::new();

    let fields = klass
        .instance_fields()
        .map(|f| CppField {
            ty: f.ty.cpp_name(),
            name: f.cpp_name.clone(),
        })
        .collect();

    let mut static_fields = Vec::new();
    for field in klass.own_static_fields() {
        let init = bodies
            .fields
            .iter()
            .find(|init| init.is_static && init.name == field.cpp_name)
            .map(|init| {
                let mut lowerer = BodyLowerer::static_initializer(table);
                let value = lowerer.expr(&init.value);
                arrays.extend(lowerer.into_arrays());
                value
            });
        static_fields.push(CppStaticField {
            ty: field.ty.cpp_name(),
            name: field.cpp_name.clone(),
            init,
        });
    }

    let instance_inits: Vec<&TypedFieldInit> = bodies.fields.iter().filter(|f| !f.is_static).collect();
    let mut functions = Vec::new();
    for constructor in &bodies.constructors {
        functions.push(lower_constructor(table, klass, constructor, &instance_inits, &mut arrays));
    }
    for (index, function) in &bodies.methods {
        functions.push(lower_method(table, klass, *index, function, &mut arrays));
    }

    let class = CppClass {
        id: klass.id,
        java_name: klass.name.dotted_name(),
        namespace: klass.name.package().to_vec(),
        alias: klass.simple_name().to_string(),
        qualified_alias: klass.name.qualified_name(),
        struct_name: format!("__{}", klass.simple_name()),
        qualified_struct: klass.name.struct_name(),
        vtable_name: format!("__{}_VT", klass.simple_name()),
        parent_struct: table.get(parent).name.struct_name(),
        fields,
        static_fields,
        functions,
        slots: vtable(table, klass),
    };
    (class, arrays)
}

fn receiver(klass: &Klass) -> (String, String) {
    (klass.name.qualified_name(), THIS.to_string())
}

fn lower_constructor(
    table: &ClassTable,
    klass: &Klass,
    constructor: &TypedConstructor,
    field_inits: &[&TypedFieldInit],
    arrays: &mut Vec<(ClassId, usize)>,
) -> CppFunction {
    let mut lowerer = BodyLowerer::constructor(table, constructor.names.clone());
    let mut body = Vec::new();

    if let Some(chain) = &constructor.chain {
        let target = table.get(chain.class);
        let mut args = vec![CppExpr::raw(THIS)];
        args.extend(chain.args.iter().map(|a| lowerer.expr(a)));
        let callee = format!(
            "{}::{}",
            target.name.struct_name(),
            names::constructor_name(target, chain.index)
        );
        body.push(CppStmt::Expr(CppExpr::call(callee, args)));
    }

    if !constructor.delegates() {
        for init in field_inits {
            let value = lowerer.expr(&init.value);
            body.push(CppStmt::Expr(CppExpr::Assign {
                op: "=".to_string(),
                target: Box::new(CppExpr::raw(THIS).arrow(init.name.as_str())),
                value: Box::new(value),
            }));
        }
    }

    body.extend(lowerer.block(&constructor.body));
    if !matches!(body.last(), Some(CppStmt::Return(_))) {
        body.push(CppStmt::Return(Some(CppExpr::raw(THIS))));
    }
    arrays.extend(lowerer.into_arrays());

    let mut params = vec![receiver(klass)];
    params.extend(constructor.params.iter().map(|p| (p.ty.cpp_name(), p.name.clone())));
    CppFunction {
        ret: klass.name.qualified_name(),
        name: names::constructor_name(klass, constructor.index),
        params,
        body,
    }
}

fn lower_method(
    table: &ClassTable,
    klass: &Klass,
    index: usize,
    function: &TypedFunction,
    arrays: &mut Vec<(ClassId, usize)>,
) -> CppFunction {
    let method = &klass.methods[index];
    let mut lowerer = BodyLowerer::function(table, function.names.clone());
    let body = lowerer.block(&function.body);
    arrays.extend(lowerer.into_arrays());

    let mut params = Vec::with_capacity(function.params.len() + 1);
    if !method.is_static {
        params.push(receiver(klass));
    }
    params.extend(function.params.iter().map(|p| (p.ty.cpp_name(), p.name.clone())));
    CppFunction {
        ret: method.return_type.cpp_name(),
        name: names::definition_name(table, klass.id, index),
        params,
        body,
    }
}

fn vtable(table: &ClassTable, klass: &Klass) -> Vec<VtableSlot> {
    klass
        .virtual_methods()
        .map(|(index, method)| {
            let mut params = vec![klass.name.qualified_name()];
            params.extend(method.params.iter().map(|p| p.ty.cpp_name()));
            let definition = format!(
                "{}::{}",
                table.get(method.implementor).name.struct_name(),
                names::definition_name(table, klass.id, index)
            );
            let init = if method.is_abstract {
                SlotInit::Abstract
            } else if method.implementor == klass.id {
                SlotInit::Direct(definition)
            } else {
                SlotInit::Cast(definition)
            };
            VtableSlot {
                ret: method.return_type.cpp_name(),
                name: names::slot_name(table, klass.id, index),
                params,
                init,
            }
        })
        .collect()
}

fn array_class(table: &ClassTable, class: ClassId, dims: usize) -> ArrayClass {
    let klass = table.get(class);
    let element = klass.ty().array_of(dims - 1);
    let descriptor = format!("{}L{};", "[".repeat(dims), klass.name.dotted_name());

    let (parent, component) = if dims == 1 {
        let parent = table.get(klass.parent.unwrap_or(predefined::OBJECT));
        (
            format!("{}::__class()", template("__rt::Array", &parent.name.qualified_name())),
            format!("{}::__class()", klass.name.struct_name()),
        )
    } else {
        let inner = element.element().unwrap_or(Type::Null);
        (
            format!("{}::__class()", table.get(predefined::OBJECT).name.struct_name()),
            format!("{}::__class()", template("__rt::Array", &inner.cpp_name())),
        )
    };
    ArrayClass {
        element: element.cpp_name(),
        java_name: descriptor,
        parent,
        component,
    }
}
