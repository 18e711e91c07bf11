//! jminus: a small imperative language with two execution paths.
//!
//! Source text goes through the scanner ([`tokenize`]) and the
//! recursive-descent parser ([`parse`]) into an AST. From there it is either
//! walked directly by the [`Interpreter`], or lowered by the code generator
//! ([`compile`]) into a flat [`Program`] run on the stack [`Vm`].
//!
//! ```
//! use jminus::{run_source, CaptureSink};
//!
//! let mut out = CaptureSink::new();
//! run_source("let x = 0; while (x < 3) { yap(x); x = x + 1; }", &mut out).unwrap();
//! assert_eq!(out.values, vec![0, 1, 2]);
//! ```

pub mod bytecode;
pub mod error;
pub mod frontend;
pub mod lang;
pub mod repl;
pub mod runtime;
pub mod stack;

pub use bytecode::{compile, verify, CompileError, Instruction, OpCode, Program, VerifyError};
pub use error::{Error, Result};
pub use frontend::{parse, tokenize, LexicalError, SyntaxError, Token, TokenKind};
pub use lang::{BinaryOp, Expr, Stmt};
pub use repl::{Mode, Session};
pub use runtime::{
    CaptureSink, Environment, Interpreter, OutputSink, RuntimeError, StdoutSink, Vm, VmConfig,
    WriterSink,
};

/// Scans and parses `source` into statements.
pub fn parse_source(source: &str) -> Result<Vec<Stmt>> {
    let tokens = tokenize(source)?;
    Ok(parse(&tokens)?)
}

/// Scans, parses and compiles `source`.
pub fn compile_source(source: &str) -> Result<Program> {
    let statements = parse_source(source)?;
    Ok(compile(&statements)?)
}

/// Runs `source` once on the VM with a fresh environment.
pub fn run_source(source: &str, sink: &mut dyn OutputSink) -> Result<()> {
    run_source_with(source, VmConfig::default(), sink)
}

pub fn run_source_with(source: &str, config: VmConfig, sink: &mut dyn OutputSink) -> Result<()> {
    let program = compile_source(source)?;
    Vm::with_config(config).run(&program, sink)?;
    Ok(())
}

/// Runs `source` once on the tree-walking interpreter with a fresh
/// environment.
pub fn interpret_source(source: &str, sink: &mut dyn OutputSink) -> Result<()> {
    let statements = parse_source(source)?;
    let mut env = Environment::new();
    Interpreter::new().interpret(&statements, &mut env, sink)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_stage_names() {
        let err = run_source("yap(1 @ 2);", &mut CaptureSink::new()).unwrap_err();
        assert_eq!(err.stage(), "lexical");

        let err = run_source("yap(1;", &mut CaptureSink::new()).unwrap_err();
        assert_eq!(err.stage(), "syntax");
        assert!(err.to_string().starts_with("syntax error: line 1:"));

        let err = interpret_source("yap(q);", &mut CaptureSink::new()).unwrap_err();
        assert_eq!(err.stage(), "runtime");
    }

    #[test]
    fn test_both_paths_agree_on_simple_program() {
        let src = "let a = 6; let b = 7; yap(a * b); if (a < b) yap(1); else yap(0);";
        let mut vm_out = CaptureSink::new();
        let mut ast_out = CaptureSink::new();
        run_source(src, &mut vm_out).unwrap();
        interpret_source(src, &mut ast_out).unwrap();
        assert_eq!(vm_out.values, vec![42, 1]);
        assert_eq!(vm_out.values, ast_out.values);
    }

    #[test]
    fn test_compile_source_ends_with_halt() {
        let program = compile_source("yap(1);").unwrap();
        assert_eq!(
            program.instructions.last().map(|i| i.op),
            Some(OpCode::Halt)
        );
    }
}
