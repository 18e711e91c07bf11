use std::fmt::Write;

use crate::lang::node::{Expr, Stmt};
use crate::stack::ensure_sufficient_stack;

/// Renders statements as an indented tree, two spaces per level.
pub fn print_program(statements: &[Stmt]) -> String {
    let mut out = String::new();
    for stmt in statements {
        write_stmt(&mut out, stmt, 0);
    }
    out
}

fn pad(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push_str("  ");
    }
}

fn write_stmt(out: &mut String, stmt: &Stmt, indent: usize) {
    ensure_sufficient_stack(|| {
        pad(out, indent);
        match stmt {
            Stmt::Expr(expr) => {
                out.push_str("ExprStmt\n");
                write_expr(out, expr, indent + 1);
            }
            Stmt::Let { name, initializer } => {
                let _ = writeln!(out, "Let {}", name);
                write_expr(out, initializer, indent + 1);
            }
            Stmt::Print(expr) => {
                out.push_str("Yap\n");
                write_expr(out, expr, indent + 1);
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                out.push_str("If\n");
                labelled(out, "Condition", indent + 1);
                write_expr(out, condition, indent + 2);
                labelled(out, "Then", indent + 1);
                write_stmt(out, then_branch, indent + 2);
                if let Some(else_branch) = else_branch {
                    labelled(out, "Else", indent + 1);
                    write_stmt(out, else_branch, indent + 2);
                }
            }
            Stmt::While { condition, body } => {
                out.push_str("While\n");
                labelled(out, "Condition", indent + 1);
                write_expr(out, condition, indent + 2);
                labelled(out, "Body", indent + 1);
                write_stmt(out, body, indent + 2);
            }
            Stmt::Block(statements) => {
                let _ = writeln!(out, "Block ({} statements)", statements.len());
                for stmt in statements {
                    write_stmt(out, stmt, indent + 1);
                }
            }
        }
    })
}

fn labelled(out: &mut String, label: &str, indent: usize) {
    pad(out, indent);
    let _ = writeln!(out, "{}:", label);
}

fn write_expr(out: &mut String, expr: &Expr, indent: usize) {
    ensure_sufficient_stack(|| {
        pad(out, indent);
        match expr {
            Expr::Literal(value) => {
                let _ = writeln!(out, "Literal {}", value);
            }
            Expr::Variable { name, .. } => {
                let _ = writeln!(out, "Variable {}", name);
            }
            Expr::Binary {
                left, op, right, ..
            } => {
                let _ = writeln!(out, "Binary {}", op);
                write_expr(out, left, indent + 1);
                write_expr(out, right, indent + 1);
            }
            Expr::Assign { name, value, .. } => {
                let _ = writeln!(out, "Assign {}", name);
                write_expr(out, value, indent + 1);
            }
            Expr::Call { callee, args } => {
                let _ = writeln!(out, "Call ({} args)", args.len());
                write_expr(out, callee, indent + 1);
                for arg in args {
                    write_expr(out, arg, indent + 1);
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::{lexer::tokenize, parser::parse};
    use pretty_assertions::assert_eq;

    fn render(source: &str) -> String {
        print_program(&parse(&tokenize(source).unwrap()).unwrap())
    }

    #[test]
    fn test_let_with_binary() {
        assert_eq!(
            render("let x = 4 + 5 * 6;"),
            "Let x\n  Binary +\n    Literal 4\n    Binary *\n      Literal 5\n      Literal 6\n"
        );
    }

    #[test]
    fn test_if_else_tree() {
        assert_eq!(
            render("if (a) yap(1); else { b = 2; }"),
            "If\n  Condition:\n    Variable a\n  Then:\n    Yap\n      Literal 1\n  Else:\n    Block (1 statements)\n      ExprStmt\n        Assign b\n          Literal 2\n"
        );
    }

    #[test]
    fn test_while_tree() {
        assert_eq!(
            render("while (i < 3) i = i + 1;"),
            "While\n  Condition:\n    Binary <\n      Variable i\n      Literal 3\n  Body:\n    ExprStmt\n      Assign i\n        Binary +\n          Variable i\n          Literal 1\n"
        );
    }

    #[test]
    fn test_deep_nesting_renders() {
        let depth = 2_000;
        let source = format!("{}yap(1);{}", "{".repeat(depth), "}".repeat(depth));
        let out = render(&source);
        assert_eq!(out.lines().count(), depth + 2);
        assert!(out.ends_with(&format!("{}Literal 1\n", "  ".repeat(depth + 1))));
    }

    #[test]
    fn test_empty_program() {
        assert_eq!(render(""), "");
    }
}
