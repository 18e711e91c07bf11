use std::fmt::Write;

use crate::frontend::token::{Token, TokenKind};

pub struct TokenDumper {
    pub color: bool,
    pub show_lexeme: bool, // if false, only kinds are listed
}

impl Default for TokenDumper {
    fn default() -> Self {
        Self {
            color: true,
            show_lexeme: true,
        }
    }
}

impl TokenDumper {
    // ANSI colors
    const RESET: &'static str = "\x1b[0m";
    const DIM: &'static str = "\x1b[2m";
    const YEL: &'static str = "\x1b[33m";
    const CYN: &'static str = "\x1b[36m";
    const MAG: &'static str = "\x1b[35m";
    const BLU: &'static str = "\x1b[34m";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn no_color(mut self) -> Self {
        self.color = false;
        self
    }

    pub fn kinds_only(mut self) -> Self {
        self.show_lexeme = false;
        self
    }

    pub fn dump(&self, tokens: &[Token]) {
        print!("{}", self.dump_to_string(tokens));
    }

    pub fn dump_to_string(&self, tokens: &[Token]) -> String {
        let mut out = String::new();
        for t in tokens {
            self.write_one(&mut out, t);
        }
        out
    }

    fn write_one(&self, out: &mut String, t: &Token) {
        let colr = if self.color { self.color(t.kind) } else { "" };
        let reset = if self.color { Self::RESET } else { "" };
        let class = self.class(t.kind);

        if self.show_lexeme && t.kind != TokenKind::Eof {
            let _ = writeln!(
                out,
                "[{:03}] {}{:<8} {:<14} {}{}",
                t.line,
                colr,
                class,
                t.kind.to_string(),
                t.lexeme,
                reset
            );
        } else {
            let _ = writeln!(
                out,
                "[{:03}] {}{:<8} {}{}",
                t.line,
                colr,
                class,
                t.kind,
                reset
            );
        }
    }

    fn class(&self, kind: TokenKind) -> &'static str {
        use TokenKind::*;
        match kind {
            Eof => "EOF",
            Integer => "INT",
            Ident => "IDENT",
            LParen | RParen | LBrace | RBrace | Semicolon | Comma => "PUNCT",
            Plus | Minus | Star | Slash | Assign | Bang => "OP",
            EqEq | NotEq | Lt | LtEq | Gt | GtEq => "CMP",
            k if k.is_keyword() => "KEYWORD",
            _ => "OTHER",
        }
    }

    fn color(&self, kind: TokenKind) -> &'static str {
        use TokenKind::*;
        match kind {
            Eof | Semicolon | Comma => Self::DIM,
            Integer => Self::CYN,
            Ident => Self::YEL,
            Plus | Minus | Star | Slash | Assign | Bang => Self::MAG,
            EqEq | NotEq | Lt | LtEq | Gt | GtEq => Self::MAG,
            k if k.is_keyword() => Self::BLU,
            _ => Self::RESET,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lexer::tokenize;

    #[test]
    fn test_plain_listing() {
        let tokens = tokenize("let x = 5;").unwrap();
        let out = TokenDumper::new().no_color().dump_to_string(&tokens);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("[001] KEYWORD"));
        assert!(lines[0].ends_with("LET            let"));
        assert!(lines[1].contains("IDENT"));
        assert!(lines[3].contains("INT"));
        assert!(lines[5].contains("EOF"));
        assert!(!out.contains('\x1b'));
    }

    #[test]
    fn test_kinds_only() {
        let tokens = tokenize("yap(1);").unwrap();
        let out = TokenDumper::new()
            .no_color()
            .kinds_only()
            .dump_to_string(&tokens);
        assert!(out.contains("YAP"));
        assert!(!out.contains("yap"));
    }

    #[test]
    fn test_color_codes() {
        let tokens = tokenize("x").unwrap();
        let out = TokenDumper::new().dump_to_string(&tokens);
        assert!(out.contains("\x1b[33m"));
        assert!(out.contains("\x1b[0m"));
    }

    #[test]
    fn test_line_numbers() {
        let tokens = tokenize("1\n\n2").unwrap();
        let out = TokenDumper::new().no_color().dump_to_string(&tokens);
        assert!(out.contains("[003]"));
    }
}
