use crate::bytecode::VerifyError;

/// A fatal error raised while executing a program on either path.
///
/// Any one of these ends the current run. Output emitted before the error
/// stays emitted.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("runtime error: undefined variable '{name}'{}", at_line(.line))]
    UndefinedVariable { name: String, line: Option<usize> },

    #[error("runtime error: division by zero{}", at_line(.line))]
    DivisionByZero { line: Option<usize> },

    #[error("runtime error: stack underflow at ip={ip}")]
    StackUnderflow { ip: usize },

    #[error("runtime error: stack size limit exceeded ({limit})")]
    StackOverflow { limit: usize },

    #[error("runtime error: jump out of bounds: ip={ip}, target={target}")]
    InvalidJumpTarget { ip: usize, target: usize },

    #[error("runtime error: invalid program: {0}")]
    InvalidProgram(#[from] VerifyError),

    #[error("runtime error: execution step limit exceeded ({limit})")]
    StepLimitExceeded { limit: usize },

    #[error("runtime error: {what} is not supported")]
    Unsupported { what: String },

    #[error("runtime error: failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

fn at_line(line: &Option<usize>) -> String {
    match line {
        Some(l) => format!(" at line {}", l),
        None => String::new(),
    }
}

pub fn undefined_variable(name: &str, line: Option<usize>) -> RuntimeError {
    RuntimeError::UndefinedVariable {
        name: name.to_string(),
        line,
    }
}

pub fn division_by_zero(line: Option<usize>) -> RuntimeError {
    RuntimeError::DivisionByZero { line }
}

impl RuntimeError {
    /// Attaches a source line to errors that carry one and have none yet.
    pub fn with_line(self, at: Option<usize>) -> Self {
        match self {
            RuntimeError::UndefinedVariable { name, line: None } => {
                RuntimeError::UndefinedVariable { name, line: at }
            }
            RuntimeError::DivisionByZero { line: None } => RuntimeError::DivisionByZero { line: at },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undefined_variable_display() {
        assert_eq!(
            undefined_variable("y", Some(3)).to_string(),
            "runtime error: undefined variable 'y' at line 3"
        );
        assert_eq!(
            undefined_variable("y", None).to_string(),
            "runtime error: undefined variable 'y'"
        );
    }

    #[test]
    fn test_with_line_fills_missing_line_only() {
        let err = undefined_variable("x", None).with_line(Some(7));
        assert!(matches!(err, RuntimeError::UndefinedVariable { line: Some(7), .. }));

        let err = division_by_zero(Some(2)).with_line(Some(9));
        assert!(matches!(err, RuntimeError::DivisionByZero { line: Some(2) }));

        let err = RuntimeError::StackUnderflow { ip: 4 }.with_line(Some(1));
        assert!(matches!(err, RuntimeError::StackUnderflow { ip: 4 }));
    }

    #[test]
    fn test_invalid_program_wraps_verify_error() {
        let err: RuntimeError = VerifyError::MissingHalt.into();
        assert!(err.to_string().contains("does not end with HALT"));
    }
}
