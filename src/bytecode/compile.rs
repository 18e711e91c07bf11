use std::collections::HashMap;

use crate::bytecode::{CompileError, Instruction, OpCode, Program};
use crate::lang::node::{Expr, Stmt};
use crate::stack::ensure_sufficient_stack;

/// Single-pass code generator from AST to bytecode.
///
/// Every expression leaves exactly one value on the operand stack; every
/// statement leaves the stack as it found it.
pub struct Compiler {
    /// Output bytecode program
    program: Program,

    /// Name -> name-table index
    name_slots: HashMap<String, u32>,

    /// Line attributed to instructions emitted right now. Zero outside the
    /// span of a line-carrying node; cleared at every statement boundary.
    line: usize,
}

impl Compiler {
    pub fn new() -> Self {
        Self {
            program: Program::new(),
            name_slots: HashMap::new(),
            line: 0,
        }
    }

    /// Compiles a whole program and appends the terminating `Halt`.
    pub fn compile_program(mut self, statements: &[Stmt]) -> Result<Program, CompileError> {
        for stmt in statements {
            self.compile_stmt(stmt)?;
        }
        self.line = 0;
        self.emit(OpCode::Halt, 0);

        tracing::debug!(
            instructions = self.program.instructions.len(),
            constants = self.program.constants.len(),
            names = self.program.names.len(),
            "compiled program"
        );
        Ok(self.program)
    }

    // =========================================================================
    // Emission helpers
    // =========================================================================

    fn emit(&mut self, op: OpCode, operand: u32) -> usize {
        self.program.instructions.push(Instruction::new(op, operand));
        self.program.lines.push(self.line);
        self.program.instructions.len() - 1
    }

    /// Emits a jump with a placeholder target and returns its index for
    /// `patch_jump`.
    fn emit_jump(&mut self, op: OpCode) -> usize {
        self.emit(op, 0)
    }

    /// Points the jump at `at` to the next instruction to be emitted.
    fn patch_jump(&mut self, at: usize) -> Result<(), CompileError> {
        let target = self.next_index()?;
        let instruction = self
            .program
            .instructions
            .get_mut(at)
            .ok_or_else(|| CompileError::internal(format!("no jump at index {}", at)))?;
        if !matches!(instruction.op, OpCode::Jump | OpCode::JumpIfFalse) {
            return Err(CompileError::internal(format!(
                "patching non-jump instruction {:?} at {}",
                instruction.op, at
            )));
        }
        instruction.operand = target;
        tracing::trace!(at, target, "patched jump");
        Ok(())
    }

    /// Absolute index of the next instruction to be emitted.
    fn next_index(&self) -> Result<u32, CompileError> {
        u32::try_from(self.program.instructions.len()).map_err(|_| CompileError::OperandOverflow {
            what: "instruction count",
        })
    }

    fn add_constant(&mut self, value: i64) -> Result<u32, CompileError> {
        let index = u32::try_from(self.program.constants.len()).map_err(|_| {
            CompileError::OperandOverflow {
                what: "constant pool",
            }
        })?;
        self.program.constants.push(value);
        Ok(index)
    }

    fn name_slot(&mut self, name: &str) -> Result<u32, CompileError> {
        if let Some(&slot) = self.name_slots.get(name) {
            return Ok(slot);
        }
        let slot = u32::try_from(self.program.names.len())
            .map_err(|_| CompileError::OperandOverflow { what: "name table" })?;
        self.program.names.push(name.to_string());
        self.name_slots.insert(name.to_string(), slot);
        Ok(slot)
    }

    // =========================================================================
    // Statements
    // =========================================================================

    /// Compiles one statement. The line register is cleared on both sides,
    /// so instructions never inherit a line from a neighbouring statement.
    fn compile_stmt(&mut self, stmt: &Stmt) -> Result<(), CompileError> {
        self.line = 0;
        ensure_sufficient_stack(|| self.lower_stmt(stmt))?;
        self.line = 0;
        Ok(())
    }

    fn lower_stmt(&mut self, stmt: &Stmt) -> Result<(), CompileError> {
        match stmt {
            Stmt::Let { name, initializer } => {
                self.compile_expr(initializer)?;
                let slot = self.name_slot(name)?;
                self.emit(OpCode::Define, slot);
            }

            Stmt::Print(expr) => {
                self.compile_expr(expr)?;
                self.emit(OpCode::Print, 0);
            }

            Stmt::Expr(expr) => {
                self.compile_expr(expr)?;
                self.emit(OpCode::Pop, 0);
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.compile_expr(condition)?;
                let jump_if_false = self.emit_jump(OpCode::JumpIfFalse);

                self.compile_stmt(then_branch)?;

                match else_branch {
                    Some(else_branch) => {
                        let jump_end = self.emit_jump(OpCode::Jump);
                        self.patch_jump(jump_if_false)?;
                        self.compile_stmt(else_branch)?;
                        self.patch_jump(jump_end)?;
                    }
                    None => self.patch_jump(jump_if_false)?,
                }
            }

            Stmt::While { condition, body } => {
                let loop_start = self.next_index()?;
                self.compile_expr(condition)?;
                let jump_out = self.emit_jump(OpCode::JumpIfFalse);

                self.compile_stmt(body)?;

                self.emit(OpCode::Jump, loop_start);
                self.patch_jump(jump_out)?;
            }

            // Blocks are flattened: no scope is pushed.
            Stmt::Block(statements) => {
                for stmt in statements {
                    self.compile_stmt(stmt)?;
                }
            }
        }
        Ok(())
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn compile_expr(&mut self, expr: &Expr) -> Result<(), CompileError> {
        ensure_sufficient_stack(|| self.lower_expr(expr))
    }

    fn lower_expr(&mut self, expr: &Expr) -> Result<(), CompileError> {
        match expr {
            Expr::Literal(value) => {
                let index = self.add_constant(*value)?;
                self.emit(OpCode::Const, index);
            }

            Expr::Variable { name, line } => {
                self.line = *line;
                let slot = self.name_slot(name)?;
                self.emit(OpCode::Load, slot);
            }

            Expr::Assign { name, line, value } => {
                self.compile_expr(value)?;
                self.line = *line;
                let slot = self.name_slot(name)?;
                self.emit(OpCode::Store, slot);
                // an assignment is an expression: leave the stored value behind
                self.emit(OpCode::Load, slot);
            }

            Expr::Binary {
                left,
                op,
                line,
                right,
            } => {
                self.compile_expr(left)?;
                self.compile_expr(right)?;
                self.line = *line;
                self.emit(OpCode::from(*op), 0);
            }

            Expr::Call { .. } => return Err(CompileError::unhandled(expr)),
        }
        Ok(())
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

/// Compiles statements into a fresh `Program`.
pub fn compile(statements: &[Stmt]) -> Result<Program, CompileError> {
    Compiler::new().compile_program(statements)
}
