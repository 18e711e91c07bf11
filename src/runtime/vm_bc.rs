use crate::bytecode::{verify, OpCode, Program, VerifyError};
use crate::runtime::environment::Environment;
use crate::runtime::runtime_error::{division_by_zero, RuntimeError};
use crate::runtime::sink::OutputSink;

#[derive(Debug, Clone)]
pub struct VmConfig {
    pub max_steps: Option<usize>,
    pub max_stack_size: usize,
}

impl Default for VmConfig {
    fn default() -> Self {
        VmConfig {
            max_steps: None,
            max_stack_size: 10_000,
        }
    }
}

/// Stack machine for compiled programs.
pub struct Vm {
    stack: Vec<i64>,
    // Safety limits
    config: VmConfig,
    steps: usize,
}

impl Vm {
    pub fn new() -> Self {
        Self::with_config(VmConfig::default())
    }

    pub fn with_config(config: VmConfig) -> Self {
        Self {
            stack: Vec::new(),
            config,
            steps: 0,
        }
    }

    /// Operand stack left by the last run. Empty after a clean `HALT`.
    pub fn stack(&self) -> &[i64] {
        &self.stack
    }

    /// Instructions executed by the last run.
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn reset_execution_state(&mut self) {
        self.stack.clear();
        self.steps = 0;
    }

    /// Runs `program` against a fresh environment.
    pub fn run(&mut self, program: &Program, sink: &mut dyn OutputSink) -> Result<(), RuntimeError> {
        let mut env = Environment::new();
        self.run_in(program, &mut env, sink)
    }

    /// Runs `program` against a caller-owned environment, so bindings
    /// survive across runs.
    pub fn run_in(
        &mut self,
        program: &Program,
        env: &mut Environment,
        sink: &mut dyn OutputSink,
    ) -> Result<(), RuntimeError> {
        self.reset_execution_state();
        verify(program)?;

        let result = self.exec(program, env, sink);
        tracing::debug!(
            steps = self.steps,
            stack = self.stack.len(),
            ok = result.is_ok(),
            "vm finished"
        );
        result
    }

    // Execution

    fn check_limits(&mut self) -> Result<(), RuntimeError> {
        self.steps += 1;

        if let Some(max) = self.config.max_steps {
            if self.steps > max {
                return Err(RuntimeError::StepLimitExceeded { limit: max });
            }
        }

        if self.stack.len() > self.config.max_stack_size {
            return Err(RuntimeError::StackOverflow {
                limit: self.config.max_stack_size,
            });
        }

        Ok(())
    }

    fn exec(
        &mut self,
        program: &Program,
        env: &mut Environment,
        sink: &mut dyn OutputSink,
    ) -> Result<(), RuntimeError> {
        let code = &program.instructions;
        let mut ip: usize = 0;

        while ip < code.len() {
            self.check_limits()?;

            let current = ip;
            let ins = code[current];
            ip += 1;

            tracing::trace!(ip = current, op = ins.op.mnemonic(), operand = ins.operand, depth = self.stack.len());

            if let Some(op) = ins.op.binary_op() {
                let b = self.pop(current)?;
                let a = self.pop(current)?;
                let value = op
                    .apply(a, b)
                    .ok_or_else(|| division_by_zero(program.line_at(current)))?;
                self.stack.push(value);
                continue;
            }

            match ins.op {
                OpCode::Const => {
                    let value = program
                        .constant(ins.operand)
                        .ok_or(VerifyError::BadConstant {
                            ip: current,
                            index: ins.operand,
                            len: program.constants.len(),
                        })?;
                    self.stack.push(value);
                }

                OpCode::Load => {
                    let name = name_at(program, current)?;
                    let value = env
                        .lookup(name)
                        .map_err(|e| e.with_line(program.line_at(current)))?;
                    self.stack.push(value);
                }

                OpCode::Store => {
                    let name = name_at(program, current)?;
                    let value = self.pop(current)?;
                    env.assign(name, value)
                        .map_err(|e| e.with_line(program.line_at(current)))?;
                }

                OpCode::Define => {
                    let name = name_at(program, current)?;
                    let value = self.pop(current)?;
                    env.define(name, value);
                }

                OpCode::Print => {
                    let value = self.pop(current)?;
                    sink.emit(value)?;
                }

                OpCode::Pop => {
                    self.pop(current)?;
                }

                // Jump instructions
                OpCode::Jump => {
                    ip = jump_target(current, ins.operand, code.len())?;
                }

                OpCode::JumpIfFalse => {
                    let cond = self.pop(current)?;
                    if cond == 0 {
                        ip = jump_target(current, ins.operand, code.len())?;
                    }
                }

                OpCode::Halt => break,

                other => {
                    return Err(RuntimeError::Unsupported {
                        what: format!("opcode {}", other.mnemonic()),
                    });
                }
            }
        }

        Ok(())
    }

    // Stack operations

    fn pop(&mut self, ip: usize) -> Result<i64, RuntimeError> {
        self.stack.pop().ok_or(RuntimeError::StackUnderflow { ip })
    }
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}

fn name_at(program: &Program, ip: usize) -> Result<&str, RuntimeError> {
    let index = program.instructions[ip].operand;
    program.name(index).ok_or_else(|| {
        RuntimeError::InvalidProgram(VerifyError::BadName {
            ip,
            op: program.instructions[ip].op.mnemonic(),
            index,
            len: program.names.len(),
        })
    })
}

/// A target equal to `len` is allowed and ends the run.
fn jump_target(ip: usize, operand: u32, len: usize) -> Result<usize, RuntimeError> {
    let target = operand as usize;
    if target > len {
        return Err(RuntimeError::InvalidJumpTarget { ip, target });
    }
    Ok(target)
}
