use serde::{Deserialize, Serialize};

use crate::bytecode::op::Instruction;

/// A compiled bytecode program.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    /// Linear instruction stream. Always ends with `Halt` when produced by
    /// the compiler.
    pub instructions: Vec<Instruction>,

    /// Constant pool, append-only. `Const` operands index into it.
    pub constants: Vec<i64>,

    /// Interned variable names. `Load`/`Store`/`Define` operands index into it.
    pub names: Vec<String>,

    /// Source line of each instruction, parallel to `instructions`.
    /// `0` where no line is known.
    pub lines: Vec<usize>,
}

/// Failure to encode or decode a `Program` as bytes.
#[derive(Debug, thiserror::Error)]
#[error("bytecode encoding error: {0}")]
pub struct EncodeError(postcard::Error);

impl From<postcard::Error> for EncodeError {
    fn from(e: postcard::Error) -> Self {
        EncodeError(e)
    }
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source line for the instruction at `ip`, if recorded.
    pub fn line_at(&self, ip: usize) -> Option<usize> {
        self.lines.get(ip).copied().filter(|&l| l != 0)
    }

    pub fn name(&self, index: u32) -> Option<&str> {
        self.names.get(index as usize).map(String::as_str)
    }

    pub fn constant(&self, index: u32) -> Option<i64> {
        self.constants.get(index as usize).copied()
    }

    /// Serializes the program with postcard.
    pub fn to_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        Ok(postcard::to_allocvec(self)?)
    }

    /// Deserializes a program. The result is not verified; run it through
    /// `verify` (the VM does) before trusting its operands.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EncodeError> {
        Ok(postcard::from_bytes(bytes)?)
    }
}
