use crate::bytecode::{Instruction, OpCode, OperandKind, Program};

/// A static defect found in a bytecode program before it runs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    #[error("verify error: program is empty")]
    Empty,

    #[error("verify error: program does not end with HALT")]
    MissingHalt,

    #[error("verify error: jump at ip={ip} targets {target}, past the end ({len})")]
    JumpOutOfBounds { ip: usize, target: u32, len: usize },

    #[error("verify error: CONST at ip={ip} refers to constant {index}, pool has {len}")]
    BadConstant { ip: usize, index: u32, len: usize },

    #[error("verify error: {op} at ip={ip} refers to name {index}, table has {len}")]
    BadName {
        ip: usize,
        op: &'static str,
        index: u32,
        len: usize,
    },

    #[error("verify error: stack underflow at ip={ip}, {op} needs {needed} item(s), depth is {depth}")]
    StackUnderflow {
        ip: usize,
        op: &'static str,
        needed: i32,
        depth: i32,
    },

    #[error("verify error: line table has {lines} entries for {instructions} instructions")]
    LineTableMismatch { lines: usize, instructions: usize },
}

/// Returns (pops, pushes) for an opcode.
fn effect(op: OpCode) -> (i32, i32) {
    use OpCode::*;
    match op {
        Const | Load => (0, 1),

        Add | Sub | Mul | Div => (2, 1),
        Equal | NotEqual | Less | LessEqual | Greater | GreaterEqual => (2, 1),

        Store | Define => (1, 0),
        Print | Pop => (1, 0),

        Jump => (0, 0),
        JumpIfFalse => (1, 0),
        Halt => (0, 0),
    }
}

/// Checks operand references, jump targets and the terminating `Halt`, then
/// walks the stream once tracking stack depth.
///
/// The depth walk is linear and does not follow jumps. That is sound for
/// compiler output because every statement leaves the stack balanced, so both
/// sides of a join start from the same depth.
pub fn verify(program: &Program) -> Result<(), VerifyError> {
    let instructions = &program.instructions;
    let len = instructions.len();

    match instructions.last() {
        None => return Err(VerifyError::Empty),
        Some(last) if last.op != OpCode::Halt => return Err(VerifyError::MissingHalt),
        Some(_) => {}
    }

    if !program.lines.is_empty() && program.lines.len() != len {
        return Err(VerifyError::LineTableMismatch {
            lines: program.lines.len(),
            instructions: len,
        });
    }

    for (ip, instruction) in instructions.iter().enumerate() {
        check_operand(program, ip, instruction)?;
    }

    check_stack_depth(instructions)?;

    tracing::debug!(instructions = len, "verified program");
    Ok(())
}

fn check_operand(program: &Program, ip: usize, instruction: &Instruction) -> Result<(), VerifyError> {
    let Instruction { op, operand } = *instruction;
    match op.operand_kind() {
        OperandKind::None => {}
        OperandKind::Constant => {
            if program.constant(operand).is_none() {
                return Err(VerifyError::BadConstant {
                    ip,
                    index: operand,
                    len: program.constants.len(),
                });
            }
        }
        OperandKind::Name => {
            if program.name(operand).is_none() {
                return Err(VerifyError::BadName {
                    ip,
                    op: op.mnemonic(),
                    index: operand,
                    len: program.names.len(),
                });
            }
        }
        OperandKind::Target => {
            let len = program.instructions.len();
            if operand as usize > len {
                return Err(VerifyError::JumpOutOfBounds {
                    ip,
                    target: operand,
                    len,
                });
            }
        }
    }
    Ok(())
}

fn check_stack_depth(instructions: &[Instruction]) -> Result<(), VerifyError> {
    let mut depth: i32 = 0;

    for (ip, instruction) in instructions.iter().enumerate() {
        let (pops, pushes) = effect(instruction.op);
        if depth < pops {
            return Err(VerifyError::StackUnderflow {
                ip,
                op: instruction.op.mnemonic(),
                needed: pops,
                depth,
            });
        }
        depth = depth - pops + pushes;
    }

    Ok(())
}
