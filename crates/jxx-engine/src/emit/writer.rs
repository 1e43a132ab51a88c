//! Indented text output

use crate::lower::CppStmt;

const INDENT_WIDTH: usize = 2;

/// Accumulates lines of generated code at a tracked depth
#[derive(Debug, Default)]
pub struct CodeWriter {
    code: String,
    indent: usize,
}

impl CodeWriter {
    /// An empty writer at depth zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one line at the current depth. Empty text writes a blank line.
    pub fn line(&mut self, text: &str) {
        if !text.is_empty() {
            for _ in 0..self.indent * INDENT_WIDTH {
                self.code.push(' ');
            }
            self.code.push_str(text);
        }
        self.code.push('\n');
    }

    /// A blank line.
    pub fn blank(&mut self) {
        self.code.push('\n');
    }

    /// Run `f` one level deeper, then restore.
    pub fn indented<F, T>(&mut self, f: F) -> T
    where
        F: FnOnce(&mut Self) -> T,
    {
        self.indent += 1;
        let result = f(self);
        self.indent -= 1;
        result
    }

    /// `head {`, the body one level deeper, then `}` followed by `tail`.
    pub fn braced<F>(&mut self, head: &str, tail: &str, f: F)
    where
        F: FnOnce(&mut Self),
    {
        if head.is_empty() {
            self.line("{");
        } else {
            self.line(&format!("{} {{", head));
        }
        self.indented(f);
        self.line(&format!("}}{}", tail));
    }

    /// Open `namespace a { namespace b {` for the given segments.
    pub fn open_namespaces(&mut self, segments: &[String]) {
        for segment in segments {
            self.line(&format!("namespace {} {{", segment));
        }
    }

    /// Close namespaces opened by [`open_namespaces`](Self::open_namespaces).
    pub fn close_namespaces(&mut self, segments: &[String]) {
        for segment in segments.iter().rev() {
            self.line(&format!("}} // namespace {}", segment));
        }
    }

    /// Print a statement across as many lines as it needs.
    pub fn statement(&mut self, stmt: &CppStmt) {
        match stmt {
            CppStmt::Block(stmts) => self.braced("", "", |w| w.statements(stmts)),
            CppStmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.line(&format!("if ({}) {{", condition));
                self.indented(|w| w.body(then_branch));
                let mut next = else_branch.as_deref();
                while let Some(branch) = next {
                    match branch {
                        CppStmt::If {
                            condition,
                            then_branch,
                            else_branch,
                        } => {
                            self.line(&format!("}} else if ({}) {{", condition));
                            self.indented(|w| w.body(then_branch));
                            next = else_branch.as_deref();
                        }
                        other => {
                            self.line("} else {");
                            self.indented(|w| w.body(other));
                            next = None;
                        }
                    }
                }
                self.line("}");
            }
            CppStmt::While { condition, body } => {
                self.braced(&format!("while ({})", condition), "", |w| w.body(body));
            }
            CppStmt::DoWhile { body, condition } => {
                self.braced("do", &format!(" while ({});", condition), |w| w.body(body));
            }
            CppStmt::For {
                init,
                condition,
                update,
                body,
            } => {
                let mut head = format!("for ({};", init);
                if let Some(condition) = condition {
                    head.push_str(&format!(" {}", condition));
                }
                head.push(';');
                if !update.is_empty() {
                    let update: Vec<String> = update.iter().map(|u| u.to_string()).collect();
                    head.push_str(&format!(" {}", update.join(", ")));
                }
                head.push(')');
                self.braced(&head, "", |w| w.body(body));
            }
            CppStmt::Switch { discriminant, cases } => {
                self.braced(&format!("switch ({})", discriminant), "", |w| {
                    for case in cases {
                        match &case.label {
                            Some(label) => w.line(&format!("case {}:", label)),
                            None => w.line("default:"),
                        }
                        w.indented(|w| w.statements(&case.body));
                    }
                });
            }
            other => self.line(&other.to_string()),
        }
    }

    /// Print a statement list.
    pub fn statements(&mut self, stmts: &[CppStmt]) {
        for stmt in stmts {
            self.statement(stmt);
        }
    }

    // Loop and branch bodies are always braced; unwrap a block to avoid `{ {`
    fn body(&mut self, stmt: &CppStmt) {
        match stmt {
            CppStmt::Block(stmts) => self.statements(stmts),
            CppStmt::Empty => {}
            other => self.statement(other),
        }
    }

    /// The accumulated text.
    pub fn finish(self) -> String {
        self.code
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lower::CppExpr;

    #[test]
    fn test_indented_increases_and_restores() {
        let mut w = CodeWriter::new();
        w.line("a");
        w.indented(|w| w.line("b"));
        w.line("c");
        assert_eq!(w.finish(), "a\n  b\nc\n");
    }

    #[test]
    fn test_else_if_chain_is_flattened() {
        let stmt = CppStmt::If {
            condition: CppExpr::raw("a"),
            then_branch: Box::new(CppStmt::Return(None)),
            else_branch: Some(Box::new(CppStmt::If {
                condition: CppExpr::raw("b"),
                then_branch: Box::new(CppStmt::Break),
                else_branch: Some(Box::new(CppStmt::Continue)),
            })),
        };
        let mut w = CodeWriter::new();
        w.statement(&stmt);
        assert_eq!(
            w.finish(),
            "if (a) {\n  return;\n} else if (b) {\n  break;\n} else {\n  continue;\n}\n"
        );
    }

    #[test]
    fn test_do_while_closes_with_condition() {
        let stmt = CppStmt::DoWhile {
            body: Box::new(CppStmt::Block(vec![CppStmt::Break])),
            condition: CppExpr::raw("x"),
        };
        let mut w = CodeWriter::new();
        w.statement(&stmt);
        assert_eq!(w.finish(), "do {\n  break;\n} while (x);\n");
    }
}
