#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    /// A token other than the one the grammar requires here.
    UnexpectedToken,
    /// The left side of `=` is not a plain variable.
    InvalidAssignmentTarget,
    /// An integer literal that does not fit in 64 bits.
    LiteralOutOfRange,
    /// Statements or parenthesized expressions nested past
    /// [`MAX_NESTING_DEPTH`](crate::frontend::parser::MAX_NESTING_DEPTH).
    NestingTooDeep,
}

/// A parsing error at a specific token.
///
/// `line` is the 1-based line of the offending token and `lexeme` its source
/// text (empty at end of input).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {message} (found {})", found(.lexeme))]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub message: String,
    pub lexeme: String,
    pub line: usize,
}

fn found(lexeme: &str) -> String {
    if lexeme.is_empty() {
        "end of input".to_string()
    } else {
        format!("'{}'", lexeme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_lexeme() {
        let err = SyntaxError {
            kind: SyntaxErrorKind::UnexpectedToken,
            message: "expected ';' after expression".to_string(),
            lexeme: "yap".to_string(),
            line: 3,
        };
        assert_eq!(
            err.to_string(),
            "line 3: expected ';' after expression (found 'yap')"
        );
    }

    #[test]
    fn test_display_at_end_of_input() {
        let err = SyntaxError {
            kind: SyntaxErrorKind::UnexpectedToken,
            message: "expected '}' after block".to_string(),
            lexeme: String::new(),
            line: 1,
        };
        assert_eq!(
            err.to_string(),
            "line 1: expected '}' after block (found end of input)"
        );
    }
}
