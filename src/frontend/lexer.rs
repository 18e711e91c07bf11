use crate::frontend::token::{Token, TokenKind};

/// A character the scanner could not classify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnexpectedChar {
    pub ch: char,
    pub line: usize,
}

/// Every unrecognized character found in one scan, in source order.
///
/// The scanner keeps going after a bad character so that a single run
/// reports all of them at once.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", render_unexpected(.unexpected))]
pub struct LexicalError {
    pub unexpected: Vec<UnexpectedChar>,
}

fn render_unexpected(unexpected: &[UnexpectedChar]) -> String {
    let mut out = format!("{} unexpected character(s) in source", unexpected.len());
    for u in unexpected {
        out.push_str(&format!("\n  -> unexpected character '{}' at line {}", u.ch, u.line));
    }
    out
}

pub struct Lexer {
    source: Vec<char>,
    pos: usize,
    line: usize,
    unexpected: Vec<UnexpectedChar>,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Lexer {
            source: source.chars().collect(),
            pos: 0,
            line: 1,
            unexpected: Vec::new(),
        }
    }

    fn current(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.current();
        if ch == Some('\n') {
            self.line += 1;
        }
        self.pos += 1;
        ch
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn skip_comment(&mut self) {
        while let Some(ch) = self.current() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn read_number(&mut self) -> Token {
        let line = self.line;
        let mut digits = String::new();
        while let Some(ch) = self.current() {
            if ch.is_ascii_digit() {
                digits.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        Token::new(TokenKind::Integer, digits, line)
    }

    fn read_identifier(&mut self) -> Token {
        let line = self.line;
        let mut ident = String::new();
        while let Some(ch) = self.current() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let kind = TokenKind::keyword(&ident).unwrap_or(TokenKind::Ident);
        Token::new(kind, ident, line)
    }

    /// Two-character operators are tried before their one-character prefixes.
    fn read_operator(&mut self) -> Option<Token> {
        let ch = self.current()?;
        let next = self.peek();
        let line = self.line;

        let double = match (ch, next) {
            ('=', Some('=')) => Some(TokenKind::EqEq),
            ('!', Some('=')) => Some(TokenKind::NotEq),
            ('<', Some('=')) => Some(TokenKind::LtEq),
            ('>', Some('=')) => Some(TokenKind::GtEq),
            _ => None,
        };
        if let Some(kind) = double {
            self.advance();
            self.advance();
            return Some(Token::new(kind, format!("{}=", ch), line));
        }

        let kind = match ch {
            '=' => TokenKind::Assign,
            '!' => TokenKind::Bang,
            '<' => TokenKind::Lt,
            '>' => TokenKind::Gt,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            _ => return None,
        };
        self.advance();
        Some(Token::new(kind, ch.to_string(), line))
    }

    /// Scans the whole source. The returned sequence always ends with `Eof`.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexicalError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();

            let Some(ch) = self.current() else {
                tokens.push(Token::new(TokenKind::Eof, "", self.line));
                break;
            };

            if ch == '/' && self.peek() == Some('/') {
                self.skip_comment();
                continue;
            }

            if ch.is_ascii_digit() {
                tokens.push(self.read_number());
                continue;
            }

            if ch.is_ascii_alphabetic() || ch == '_' {
                tokens.push(self.read_identifier());
                continue;
            }

            match self.read_operator() {
                Some(token) => tokens.push(token),
                None => {
                    self.unexpected.push(UnexpectedChar {
                        ch,
                        line: self.line,
                    });
                    self.advance();
                }
            }
        }

        if !self.unexpected.is_empty() {
            return Err(LexicalError {
                unexpected: std::mem::take(&mut self.unexpected),
            });
        }

        tracing::debug!(count = tokens.len(), "scanned tokens");
        Ok(tokens)
    }
}

/// Scans `source` into tokens with a fresh `Lexer`.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexicalError> {
    Lexer::new(source).tokenize()
}
