pub mod environment;
pub mod runtime_error;
pub mod sink;
pub mod vm_ast;
pub mod vm_bc;

pub use environment::Environment;
pub use runtime_error::RuntimeError;
pub use sink::{CaptureSink, OutputSink, StdoutSink, WriterSink};
pub use vm_ast::Interpreter;
pub use vm_bc::{Vm, VmConfig};
