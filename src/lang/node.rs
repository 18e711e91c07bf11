/// Binary operators, in the order the grammar binds them (loosest first).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    // ───────────────────────────── Equality ─────────────────────────────
    Equal,
    NotEqual,

    // ──────────────────────────── Comparison ────────────────────────────
    Less,
    LessEqual,
    Greater,
    GreaterEqual,

    // ───────────────────────────── Arithmetic ───────────────────────────
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        }
    }

    /// Evaluates `a OP b`.
    ///
    /// Arithmetic wraps on overflow; comparisons yield `1` or `0`.
    /// Returns `None` only for division by zero.
    ///
    /// Both executors go through here, so the VM and the tree walker always
    /// agree on integer semantics.
    pub fn apply(&self, a: i64, b: i64) -> Option<i64> {
        Some(match self {
            BinaryOp::Add => a.wrapping_add(b),
            BinaryOp::Sub => a.wrapping_sub(b),
            BinaryOp::Mul => a.wrapping_mul(b),
            BinaryOp::Div => {
                if b == 0 {
                    return None;
                }
                a.wrapping_div(b)
            }
            BinaryOp::Equal => (a == b) as i64,
            BinaryOp::NotEqual => (a != b) as i64,
            BinaryOp::Less => (a < b) as i64,
            BinaryOp::LessEqual => (a <= b) as i64,
            BinaryOp::Greater => (a > b) as i64,
            BinaryOp::GreaterEqual => (a >= b) as i64,
        })
    }
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Expression node. Every expression evaluates to exactly one integer.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Integer literal.
    Literal(i64),

    /// Variable reference.
    Variable { name: String, line: usize },

    /// `left op right`, left-associative. `line` is the operator's line.
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        line: usize,
        right: Box<Expr>,
    },

    /// `name = value`, right-associative. Evaluates to the assigned value.
    ///
    /// The target is a name rather than an expression: the parser rejects
    /// any other left-hand side before this node is built.
    Assign {
        name: String,
        line: usize,
        value: Box<Expr>,
    },

    /// Call syntax reserved for `fn` support.
    ///
    /// No grammar production builds this yet; both executors reject it.
    Call { callee: Box<Expr>, args: Vec<Expr> },
}

impl Expr {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::Literal(_) => "literal",
            Expr::Variable { .. } => "variable",
            Expr::Binary { .. } => "binary",
            Expr::Assign { .. } => "assignment",
            Expr::Call { .. } => "call",
        }
    }
}

/// Statement node. Statements never leave a value behind.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `expression ;`, result discarded.
    Expr(Expr),

    /// `let name = initializer ;`
    Let { name: String, initializer: Expr },

    /// `yap ( expression ) ;`
    Print(Expr),

    /// `if ( condition ) then_branch [else else_branch]`
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    /// `while ( condition ) body`
    While { condition: Expr, body: Box<Stmt> },

    /// `{ statement* }`
    Block(Vec<Stmt>),
}

// Dropping a deep tree through the derived glue recurses once per level.
// These impls detach children onto a worklist so drop depth stays flat.

impl Drop for Expr {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.detach_children(&mut pending);
        while let Some(mut expr) = pending.pop() {
            expr.detach_children(&mut pending);
        }
    }
}

impl Expr {
    fn detach_children(&mut self, out: &mut Vec<Expr>) {
        match self {
            Expr::Binary { left, right, .. } => {
                out.push(std::mem::replace(&mut **left, Expr::Literal(0)));
                out.push(std::mem::replace(&mut **right, Expr::Literal(0)));
            }
            Expr::Assign { value, .. } => {
                out.push(std::mem::replace(&mut **value, Expr::Literal(0)));
            }
            Expr::Call { callee, args } => {
                out.push(std::mem::replace(&mut **callee, Expr::Literal(0)));
                out.append(args);
            }
            Expr::Literal(_) | Expr::Variable { .. } => {}
        }
    }
}

impl Drop for Stmt {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.detach_children(&mut pending);
        while let Some(mut stmt) = pending.pop() {
            stmt.detach_children(&mut pending);
        }
    }
}

impl Stmt {
    fn detach_children(&mut self, out: &mut Vec<Stmt>) {
        match self {
            Stmt::If {
                then_branch,
                else_branch,
                ..
            } => {
                out.push(std::mem::replace(&mut **then_branch, Stmt::Block(Vec::new())));
                if let Some(else_branch) = else_branch.take() {
                    out.push(*else_branch);
                }
            }
            Stmt::While { body, .. } => {
                out.push(std::mem::replace(&mut **body, Stmt::Block(Vec::new())));
            }
            Stmt::Block(body) => out.append(body),
            Stmt::Expr(_) | Stmt::Let { .. } | Stmt::Print(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic() {
        assert_eq!(BinaryOp::Add.apply(2, 3), Some(5));
        assert_eq!(BinaryOp::Sub.apply(2, 3), Some(-1));
        assert_eq!(BinaryOp::Mul.apply(-4, 3), Some(-12));
        assert_eq!(BinaryOp::Div.apply(7, 2), Some(3));
        assert_eq!(BinaryOp::Div.apply(-7, 2), Some(-3));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(BinaryOp::Div.apply(1, 0), None);
    }

    #[test]
    fn test_overflow_wraps() {
        assert_eq!(BinaryOp::Add.apply(i64::MAX, 1), Some(i64::MIN));
        assert_eq!(BinaryOp::Div.apply(i64::MIN, -1), Some(i64::MIN));
    }

    #[test]
    fn test_dropping_deep_trees() {
        let mut expr = Expr::Literal(1);
        for _ in 0..200_000 {
            expr = Expr::Binary {
                left: Box::new(expr),
                op: BinaryOp::Add,
                line: 1,
                right: Box::new(Expr::Literal(1)),
            };
        }
        drop(expr);

        let mut stmt = Stmt::Print(Expr::Literal(2));
        for i in 0..200_000 {
            stmt = if i % 2 == 0 {
                Stmt::Block(vec![stmt])
            } else {
                Stmt::While {
                    condition: Expr::Literal(0),
                    body: Box::new(stmt),
                }
            };
        }
        drop(stmt);
    }

    #[test]
    fn test_comparisons_yield_one_or_zero() {
        assert_eq!(BinaryOp::Equal.apply(3, 3), Some(1));
        assert_eq!(BinaryOp::NotEqual.apply(3, 3), Some(0));
        assert_eq!(BinaryOp::Less.apply(2, 3), Some(1));
        assert_eq!(BinaryOp::LessEqual.apply(3, 3), Some(1));
        assert_eq!(BinaryOp::Greater.apply(2, 3), Some(0));
        assert_eq!(BinaryOp::GreaterEqual.apply(2, 3), Some(0));
    }
}
