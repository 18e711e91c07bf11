use crate::lang::node::Expr;

/// Code generation failure.
///
/// A well-formed AST from the parser never produces one of these; they
/// indicate an AST shape the generator has no lowering for, or an internal
/// limit being exceeded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// A node type that the compiler doesn't know how to handle
    #[error("compile error: cannot compile '{node_type}' node{}", hint_suffix(.hint))]
    UnhandledNode {
        node_type: String,
        hint: Option<String>,
    },

    /// A pool or instruction index no longer fits in an operand
    #[error("compile error: {what} exceeds the operand range")]
    OperandOverflow { what: &'static str },

    /// Internal compiler error (shouldn't happen in normal use)
    #[error("compile error: internal: {0}")]
    Internal(String),
}

fn hint_suffix(hint: &Option<String>) -> String {
    match hint {
        Some(h) => format!("\n  hint: {}", h),
        None => String::new(),
    }
}

impl CompileError {
    /// Create an error for an unhandled expression type
    pub fn unhandled(expr: &Expr) -> Self {
        CompileError::UnhandledNode {
            node_type: expr.kind_name().to_string(),
            hint: Some(
                "this may be a language feature not yet supported by the bytecode compiler"
                    .to_string(),
            ),
        }
    }

    /// Create an internal compiler error
    pub fn internal(msg: impl Into<String>) -> Self {
        CompileError::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unhandled_display_includes_hint() {
        let expr = Expr::Call {
            callee: Box::new(Expr::Literal(1)),
            args: vec![],
        };
        let msg = CompileError::unhandled(&expr).to_string();
        assert!(msg.starts_with("compile error: cannot compile 'call' node"));
        assert!(msg.contains("hint:"), "msg was: {}", msg);
    }

    #[test]
    fn test_internal_display() {
        assert_eq!(
            CompileError::internal("patch target missing").to_string(),
            "compile error: internal: patch target missing"
        );
    }
}
