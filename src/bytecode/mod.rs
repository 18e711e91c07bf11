pub mod compile;
pub mod compile_error;
pub mod disasm;
pub mod ir;
pub mod op;
pub mod verify;

pub use compile::{compile, Compiler};
pub use compile_error::CompileError;
pub use ir::{EncodeError, Program};
pub use op::{Instruction, OpCode, OperandKind};
pub use verify::{verify, VerifyError};
