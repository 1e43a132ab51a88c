//! C++ emission
//!
//! Prints a lowered [`CppUnit`](crate::lower::CppUnit) as a header and an
//! implementation file. The header holds the data layouts and vtable layouts;
//! the implementation holds everything with a body.

mod header;
mod implementation;
mod writer;

pub use header::{emit_header, include_guard};
pub use implementation::emit_implementation;
pub use writer::CodeWriter;

/// First line of every generated file.
pub const GENERATED_BANNER: &str = "// Generated by jxx. Do not edit.";
