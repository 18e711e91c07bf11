use crate::lang::node::{Expr, Stmt};
use crate::runtime::environment::Environment;
use crate::runtime::runtime_error::{division_by_zero, RuntimeError};
use crate::runtime::sink::OutputSink;
use crate::stack::ensure_sufficient_stack;

/// Tree-walking interpreter over the AST.
///
/// Shares `Environment` and `BinaryOp::apply` with the VM, so both paths
/// produce the same output for the same program.
#[derive(Debug, Default)]
pub struct Interpreter {
    max_steps: Option<usize>,
    steps: usize,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps the number of statements executed per `interpret` call.
    pub fn with_max_steps(max_steps: Option<usize>) -> Self {
        Self {
            max_steps,
            steps: 0,
        }
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn interpret(
        &mut self,
        statements: &[Stmt],
        env: &mut Environment,
        sink: &mut dyn OutputSink,
    ) -> Result<(), RuntimeError> {
        self.steps = 0;
        for stmt in statements {
            self.execute(stmt, env, sink)?;
        }
        tracing::debug!(steps = self.steps, "interpreter finished");
        Ok(())
    }

    fn execute(
        &mut self,
        stmt: &Stmt,
        env: &mut Environment,
        sink: &mut dyn OutputSink,
    ) -> Result<(), RuntimeError> {
        self.steps += 1;
        if let Some(max) = self.max_steps {
            if self.steps > max {
                return Err(RuntimeError::StepLimitExceeded { limit: max });
            }
        }

        ensure_sufficient_stack(|| self.execute_kind(stmt, env, sink))
    }

    fn execute_kind(
        &mut self,
        stmt: &Stmt,
        env: &mut Environment,
        sink: &mut dyn OutputSink,
    ) -> Result<(), RuntimeError> {
        match stmt {
            Stmt::Expr(expr) => {
                self.evaluate(expr, env)?;
            }

            Stmt::Let { name, initializer } => {
                let value = self.evaluate(initializer, env)?;
                env.define(name, value);
            }

            Stmt::Print(expr) => {
                let value = self.evaluate(expr, env)?;
                sink.emit(value)?;
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition, env)? != 0 {
                    self.execute(then_branch, env, sink)?;
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch, env, sink)?;
                }
            }

            Stmt::While { condition, body } => {
                while self.evaluate(condition, env)? != 0 {
                    self.execute(body, env, sink)?;
                }
            }

            // no scope push: blocks share the enclosing scope
            Stmt::Block(statements) => {
                for stmt in statements {
                    self.execute(stmt, env, sink)?;
                }
            }
        }
        Ok(())
    }

    fn evaluate(&mut self, expr: &Expr, env: &mut Environment) -> Result<i64, RuntimeError> {
        ensure_sufficient_stack(|| self.evaluate_kind(expr, env))
    }

    fn evaluate_kind(&mut self, expr: &Expr, env: &mut Environment) -> Result<i64, RuntimeError> {
        match expr {
            Expr::Literal(value) => Ok(*value),

            Expr::Variable { name, line } => env.lookup(name).map_err(|e| e.with_line(Some(*line))),

            Expr::Assign { name, line, value } => {
                let value = self.evaluate(value, env)?;
                env.assign(name, value)
                    .map_err(|e| e.with_line(Some(*line)))?;
                Ok(value)
            }

            Expr::Binary {
                left,
                op,
                line,
                right,
            } => {
                let a = self.evaluate(left, env)?;
                let b = self.evaluate(right, env)?;
                op.apply(a, b).ok_or_else(|| division_by_zero(Some(*line)))
            }

            Expr::Call { .. } => Err(RuntimeError::Unsupported {
                what: "function call".to_string(),
            }),
        }
    }
}
