//! Lexical scopes of local variables

use crate::names;
use jxx_types::Type;
use rustc_hash::FxHashMap;

/// A local variable or parameter
#[derive(Debug, Clone, PartialEq)]
pub struct LocalVar {
    /// Name in the generated C++
    pub cpp_name: String,
    /// Declared type
    pub ty: Type,
}

/// Stack of block scopes, innermost last
#[derive(Debug, Clone)]
pub struct LocalScopes {
    frames: Vec<FxHashMap<String, LocalVar>>,
}

impl Default for LocalScopes {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalScopes {
    /// Scopes holding one empty frame for the parameters.
    pub fn new() -> Self {
        Self {
            frames: vec![FxHashMap::default()],
        }
    }

    /// Enter a block.
    pub fn push(&mut self) {
        self.frames.push(FxHashMap::default());
    }

    /// Leave a block. The parameter frame is never popped.
    pub fn pop(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Declare a variable in the innermost frame and return its C++ name.
    pub fn declare(&mut self, name: &str, ty: Type) -> String {
        let cpp_name = names::cpp_identifier(name);
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(
                name.to_string(),
                LocalVar {
                    cpp_name: cpp_name.clone(),
                    ty,
                },
            );
        }
        cpp_name
    }

    /// The innermost variable with this name.
    pub fn lookup(&self, name: &str) -> Option<&LocalVar> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inner_scope_hides_and_pops() {
        let mut scopes = LocalScopes::new();
        scopes.declare("x", Type::int());
        scopes.push();
        scopes.declare("x", Type::string());
        assert_eq!(scopes.lookup("x").unwrap().ty, Type::string());
        scopes.pop();
        assert_eq!(scopes.lookup("x").unwrap().ty, Type::int());
        scopes.pop();
        assert!(scopes.lookup("x").is_some());
    }

    #[test]
    fn test_cpp_names_are_escaped() {
        let mut scopes = LocalScopes::new();
        assert_eq!(scopes.declare("delete", Type::int()), "delete_");
        assert_eq!(scopes.lookup("delete").unwrap().cpp_name, "delete_");
        assert!(scopes.lookup("delete_").is_none());
    }
}
