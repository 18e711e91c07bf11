use serde::{Deserialize, Serialize};

use crate::lang::node::BinaryOp;

// =============================================================================
// OP - Bytecode instructions
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpCode {
    // literals
    /// Push `constants[operand]`.
    Const,

    // arithmetic
    Add,
    Sub,
    Mul,
    Div,

    // comparison
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,

    // variables (operand is a name-table index)
    Load,
    Store,
    Define,

    // I/O
    Print,

    // stack ops
    Pop,

    // ==========================================================================
    // Control flow - operand is an absolute instruction index
    // ==========================================================================
    /// Unconditional jump.
    Jump,

    /// Pop the condition; jump if it is zero, else fall through.
    JumpIfFalse,

    Halt,
}

/// What an instruction's operand refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    None,
    Constant,
    Name,
    Target,
}

impl OpCode {
    pub fn operand_kind(&self) -> OperandKind {
        match self {
            OpCode::Const => OperandKind::Constant,
            OpCode::Load | OpCode::Store | OpCode::Define => OperandKind::Name,
            OpCode::Jump | OpCode::JumpIfFalse => OperandKind::Target,
            _ => OperandKind::None,
        }
    }

    /// The binary operator this opcode evaluates, if it is one.
    pub fn binary_op(&self) -> Option<BinaryOp> {
        Some(match self {
            OpCode::Add => BinaryOp::Add,
            OpCode::Sub => BinaryOp::Sub,
            OpCode::Mul => BinaryOp::Mul,
            OpCode::Div => BinaryOp::Div,
            OpCode::Equal => BinaryOp::Equal,
            OpCode::NotEqual => BinaryOp::NotEqual,
            OpCode::Less => BinaryOp::Less,
            OpCode::LessEqual => BinaryOp::LessEqual,
            OpCode::Greater => BinaryOp::Greater,
            OpCode::GreaterEqual => BinaryOp::GreaterEqual,
            _ => return None,
        })
    }

    pub fn mnemonic(&self) -> &'static str {
        match self {
            OpCode::Const => "CONST",
            OpCode::Add => "ADD",
            OpCode::Sub => "SUB",
            OpCode::Mul => "MUL",
            OpCode::Div => "DIV",
            OpCode::Equal => "EQUAL",
            OpCode::NotEqual => "NOT_EQUAL",
            OpCode::Less => "LESS",
            OpCode::LessEqual => "LESS_EQUAL",
            OpCode::Greater => "GREATER",
            OpCode::GreaterEqual => "GREATER_EQUAL",
            OpCode::Load => "LOAD",
            OpCode::Store => "STORE",
            OpCode::Define => "DEFINE",
            OpCode::Print => "PRINT",
            OpCode::Pop => "POP",
            OpCode::Jump => "JUMP",
            OpCode::JumpIfFalse => "JUMP_IF_FALSE",
            OpCode::Halt => "HALT",
        }
    }
}

impl From<BinaryOp> for OpCode {
    fn from(op: BinaryOp) -> Self {
        match op {
            BinaryOp::Add => OpCode::Add,
            BinaryOp::Sub => OpCode::Sub,
            BinaryOp::Mul => OpCode::Mul,
            BinaryOp::Div => OpCode::Div,
            BinaryOp::Equal => OpCode::Equal,
            BinaryOp::NotEqual => OpCode::NotEqual,
            BinaryOp::Less => OpCode::Less,
            BinaryOp::LessEqual => OpCode::LessEqual,
            BinaryOp::Greater => OpCode::Greater,
            BinaryOp::GreaterEqual => OpCode::GreaterEqual,
        }
    }
}

/// One bytecode instruction. The operand is `0` for opcodes that take none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub op: OpCode,
    pub operand: u32,
}

impl Instruction {
    pub fn new(op: OpCode, operand: u32) -> Self {
        Instruction { op, operand }
    }

    pub fn simple(op: OpCode) -> Self {
        Instruction { op, operand: 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_opcodes_round_trip_through_operator() {
        let ops = [
            BinaryOp::Add,
            BinaryOp::Sub,
            BinaryOp::Mul,
            BinaryOp::Div,
            BinaryOp::Equal,
            BinaryOp::NotEqual,
            BinaryOp::Less,
            BinaryOp::LessEqual,
            BinaryOp::Greater,
            BinaryOp::GreaterEqual,
        ];
        for op in ops {
            assert_eq!(OpCode::from(op).binary_op(), Some(op));
        }
    }

    #[test]
    fn test_operand_kinds() {
        assert_eq!(OpCode::Const.operand_kind(), OperandKind::Constant);
        assert_eq!(OpCode::Store.operand_kind(), OperandKind::Name);
        assert_eq!(OpCode::JumpIfFalse.operand_kind(), OperandKind::Target);
        assert_eq!(OpCode::Print.operand_kind(), OperandKind::None);
        assert_eq!(OpCode::Halt.binary_op(), None);
    }
}
