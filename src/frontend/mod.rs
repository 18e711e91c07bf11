pub mod lexer;
pub mod parser;
pub mod parser_error;
pub mod token;
pub mod token_dumper;

pub use lexer::{tokenize, LexicalError, Lexer};
pub use parser::{parse, Parser};
pub use parser_error::{SyntaxError, SyntaxErrorKind};
pub use token::{Token, TokenKind};
pub use token_dumper::TokenDumper;
