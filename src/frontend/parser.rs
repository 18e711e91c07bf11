use crate::frontend::parser_error::{SyntaxError, SyntaxErrorKind};
use crate::frontend::token::{Token, TokenKind};
use crate::lang::node::{BinaryOp, Expr, Stmt};
use crate::stack::ensure_sufficient_stack;

/// How deeply statements and expressions may nest before parsing fails.
pub const MAX_NESTING_DEPTH: usize = 10_000;

/// Recursive-descent parser for jminus.
///
/// The parser walks a cursor over scanned tokens with one token of
/// lookahead and produces the top-level statements of a program.
///
/// Notes:
/// - The token slice must end with `TokenKind::Eof`; the cursor never moves
///   past it.
/// - The first error aborts the whole parse. Every production propagates
///   with `?`, so no partial program is ever returned.
/// - Nesting is capped at [`MAX_NESTING_DEPTH`]; the recursion below that
///   cap grows the stack as needed.
pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    /// Creates a parser over lexer output.
    ///
    /// Fails if the slice does not end with an end-of-input marker.
    pub fn new(tokens: &'a [Token]) -> Result<Self, SyntaxError> {
        match tokens.last() {
            Some(last) if last.kind == TokenKind::Eof => Ok(Parser {
                tokens,
                pos: 0,
                depth: 0,
            }),
            other => Err(SyntaxError {
                kind: SyntaxErrorKind::UnexpectedToken,
                message: "token stream is missing its end marker".to_string(),
                lexeme: other.map(|t| t.lexeme.clone()).unwrap_or_default(),
                line: other.map(|t| t.line).unwrap_or(1),
            }),
        }
    }

    /// Returns the current token without consuming it.
    fn current(&self) -> &'a Token {
        &self.tokens[self.pos]
    }

    fn is_at_end(&self) -> bool {
        self.current().kind == TokenKind::Eof
    }

    /// Consumes the current token and returns it. Stays put on `Eof`.
    fn advance(&mut self) -> &'a Token {
        let pos = self.pos;
        if !self.is_at_end() {
            self.pos += 1;
        }
        &self.tokens[pos]
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    /// Consumes the current token if it has the given kind.
    fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) && kind != TokenKind::Eof {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consumes a token of `kind` or fails with `message`.
    fn expect(&mut self, kind: TokenKind, message: &str) -> Result<&'a Token, SyntaxError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error(message))
        }
    }

    /// Constructs a `SyntaxError` at the current token.
    fn error(&self, message: &str) -> SyntaxError {
        self.error_at(self.current(), SyntaxErrorKind::UnexpectedToken, message)
    }

    fn error_at(&self, token: &Token, kind: SyntaxErrorKind, message: &str) -> SyntaxError {
        SyntaxError {
            kind,
            message: message.to_string(),
            lexeme: token.lexeme.clone(),
            line: token.line,
        }
    }

    /// Runs one nested production, failing once the nesting cap is hit.
    fn nested<T>(
        &mut self,
        production: impl FnOnce(&mut Self) -> Result<T, SyntaxError>,
    ) -> Result<T, SyntaxError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.error_at(
                self.current(),
                SyntaxErrorKind::NestingTooDeep,
                "nesting too deep",
            ));
        }
        self.depth += 1;
        let result = ensure_sufficient_stack(|| production(self));
        self.depth -= 1;
        result
    }

    /// Parses a complete program.
    ///
    /// ```text
    /// program := statement* EOF
    /// ```
    pub fn parse(&mut self) -> Result<Vec<Stmt>, SyntaxError> {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            statements.push(self.parse_statement()?);
        }
        tracing::debug!(count = statements.len(), "parsed statements");
        Ok(statements)
    }

    /// ```text
    /// statement := letStmt | yapStmt | ifStmt | whileStmt | block | exprStmt
    /// ```
    fn parse_statement(&mut self) -> Result<Stmt, SyntaxError> {
        self.nested(|p| match p.current().kind {
            TokenKind::Let => p.parse_let(),
            TokenKind::Yap => p.parse_yap(),
            TokenKind::If => p.parse_if(),
            TokenKind::While => p.parse_while(),
            TokenKind::LBrace => p.parse_block(),
            TokenKind::Fn | TokenKind::Return => Err(p.error("functions are not supported")),
            _ => p.parse_expression_statement(),
        })
    }

    /// ```text
    /// letStmt := 'let' IDENT '=' expression ';'
    /// ```
    fn parse_let(&mut self) -> Result<Stmt, SyntaxError> {
        self.advance(); // consume 'let'

        let name = self
            .expect(TokenKind::Ident, "expected variable name after 'let'")?
            .lexeme
            .clone();
        self.expect(TokenKind::Assign, "expected '=' after variable name")?;
        let initializer = self.parse_expression()?;
        self.expect(TokenKind::Semicolon, "expected ';' after let initializer")?;

        Ok(Stmt::Let { name, initializer })
    }

    /// ```text
    /// yapStmt := 'yap' '(' expression ')' ';'
    /// ```
    fn parse_yap(&mut self) -> Result<Stmt, SyntaxError> {
        self.advance(); // consume 'yap'

        self.expect(TokenKind::LParen, "expected '(' after 'yap'")?;
        let expr = self.parse_expression()?;
        self.expect(TokenKind::RParen, "expected ')' after yap expression")?;
        self.expect(TokenKind::Semicolon, "expected ';' after yap statement")?;

        Ok(Stmt::Print(expr))
    }

    /// ```text
    /// ifStmt := 'if' '(' expression ')' statement ('else' statement)?
    /// ```
    ///
    /// A dangling `else` binds to the nearest `if`.
    fn parse_if(&mut self) -> Result<Stmt, SyntaxError> {
        self.advance(); // consume 'if'

        self.expect(TokenKind::LParen, "expected '(' after 'if'")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RParen, "expected ')' after condition")?;

        let then_branch = Box::new(self.parse_statement()?);
        let else_branch = if self.matches(TokenKind::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    /// ```text
    /// whileStmt := 'while' '(' expression ')' statement
    /// ```
    fn parse_while(&mut self) -> Result<Stmt, SyntaxError> {
        self.advance(); // consume 'while'

        self.expect(TokenKind::LParen, "expected '(' after 'while'")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RParen, "expected ')' after while condition")?;
        let body = Box::new(self.parse_statement()?);

        Ok(Stmt::While { condition, body })
    }

    /// ```text
    /// block := '{' statement* '}'
    /// ```
    fn parse_block(&mut self) -> Result<Stmt, SyntaxError> {
        self.advance(); // consume '{'

        let mut statements = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            statements.push(self.parse_statement()?);
        }
        self.expect(TokenKind::RBrace, "expected '}' after block")?;

        Ok(Stmt::Block(statements))
    }

    /// ```text
    /// exprStmt := expression ';'
    /// ```
    fn parse_expression_statement(&mut self) -> Result<Stmt, SyntaxError> {
        let expr = self.parse_expression()?;
        self.expect(TokenKind::Semicolon, "expected ';' after expression")?;
        Ok(Stmt::Expr(expr))
    }

    /// ```text
    /// expression := equality ('=' expression)?
    /// ```
    ///
    /// Assignment is right-associative and its target must be a variable.
    fn parse_expression(&mut self) -> Result<Expr, SyntaxError> {
        self.nested(Self::parse_assignment)
    }

    fn parse_assignment(&mut self) -> Result<Expr, SyntaxError> {
        let target_token = self.current();
        let expr = self.parse_equality()?;

        if !self.check(TokenKind::Assign) {
            return Ok(expr);
        }
        self.advance(); // consume '='
        let value = self.parse_expression()?;

        match &expr {
            Expr::Variable { name, line } => Ok(Expr::Assign {
                name: name.clone(),
                line: *line,
                value: Box::new(value),
            }),
            _ => Err(self.error_at(
                target_token,
                SyntaxErrorKind::InvalidAssignmentTarget,
                "invalid assignment target",
            )),
        }
    }

    /// Parses one left-associative precedence level.
    fn parse_binary(
        &mut self,
        operand: fn(&mut Self) -> Result<Expr, SyntaxError>,
        operator: fn(TokenKind) -> Option<BinaryOp>,
    ) -> Result<Expr, SyntaxError> {
        let mut left = operand(self)?;
        while let Some(op) = operator(self.current().kind) {
            let line = self.advance().line;
            let right = operand(self)?;
            left = Expr::Binary {
                left: Box::new(left),
                op,
                line,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    /// ```text
    /// equality := comparison (('==' | '!=') comparison)*
    /// ```
    fn parse_equality(&mut self) -> Result<Expr, SyntaxError> {
        self.parse_binary(Self::parse_comparison, |kind| match kind {
            TokenKind::EqEq => Some(BinaryOp::Equal),
            TokenKind::NotEq => Some(BinaryOp::NotEqual),
            _ => None,
        })
    }

    /// ```text
    /// comparison := additive (('<' | '<=' | '>' | '>=') additive)*
    /// ```
    fn parse_comparison(&mut self) -> Result<Expr, SyntaxError> {
        self.parse_binary(Self::parse_additive, |kind| match kind {
            TokenKind::Lt => Some(BinaryOp::Less),
            TokenKind::LtEq => Some(BinaryOp::LessEqual),
            TokenKind::Gt => Some(BinaryOp::Greater),
            TokenKind::GtEq => Some(BinaryOp::GreaterEqual),
            _ => None,
        })
    }

    /// ```text
    /// additive := multiplicative (('+' | '-') multiplicative)*
    /// ```
    fn parse_additive(&mut self) -> Result<Expr, SyntaxError> {
        self.parse_binary(Self::parse_multiplicative, |kind| match kind {
            TokenKind::Plus => Some(BinaryOp::Add),
            TokenKind::Minus => Some(BinaryOp::Sub),
            _ => None,
        })
    }

    /// ```text
    /// multiplicative := primary (('*' | '/') primary)*
    /// ```
    fn parse_multiplicative(&mut self) -> Result<Expr, SyntaxError> {
        self.parse_binary(Self::parse_primary, |kind| match kind {
            TokenKind::Star => Some(BinaryOp::Mul),
            TokenKind::Slash => Some(BinaryOp::Div),
            _ => None,
        })
    }

    /// ```text
    /// primary := INT | IDENT | '(' expression ')'
    /// ```
    fn parse_primary(&mut self) -> Result<Expr, SyntaxError> {
        match self.current().kind {
            TokenKind::Integer => {
                let token = self.advance();
                token.lexeme.parse::<i64>().map(Expr::Literal).map_err(|_| {
                    self.error_at(
                        token,
                        SyntaxErrorKind::LiteralOutOfRange,
                        "integer literal out of range",
                    )
                })
            }
            TokenKind::Ident => {
                let token = self.advance();
                Ok(Expr::Variable {
                    name: token.lexeme.clone(),
                    line: token.line,
                })
            }
            TokenKind::LParen => {
                self.advance(); // consume '('
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RParen, "expected ')' after expression")?;
                Ok(expr)
            }
            _ => Err(self.error("expected expression")),
        }
    }
}

/// Parses scanned tokens into the program's top-level statements.
pub fn parse(tokens: &[Token]) -> Result<Vec<Stmt>, SyntaxError> {
    Parser::new(tokens)?.parse()
}
