use crate::bytecode::{CompileError, EncodeError};
use crate::frontend::{LexicalError, SyntaxError};
use crate::runtime::RuntimeError;

/// Any failure of the pipeline, tagged by the stage that produced it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("lexical error: {0}")]
    Lexical(#[from] LexicalError),

    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("{0}")]
    Compile(#[from] CompileError),

    #[error("{0}")]
    Runtime(#[from] RuntimeError),

    #[error("{0}")]
    Encode(#[from] EncodeError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Short name of the failing stage, for diagnostics.
    pub fn stage(&self) -> &'static str {
        match self {
            Error::Lexical(_) => "lexical",
            Error::Syntax(_) => "syntax",
            Error::Compile(_) => "compile",
            Error::Runtime(_) => "runtime",
            Error::Encode(_) => "bytecode",
            Error::Io(_) => "io",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
