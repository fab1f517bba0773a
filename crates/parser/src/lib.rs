//! Go declaration syntax: lexer, arena AST and parser.
//!
//! - The lexer is built on Logos and implements Go's semicolon insertion.
//! - The parser covers everything above statement level: package clause,
//!   imports, const/var names, type declarations, functions and methods
//!   with their full signatures. Function bodies are skipped.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod walk;

pub use ast::AstArena;
pub use error::{Diag, ParseFailure};
pub use lexer::{Lexer, Tok};
pub use parser::{parse_file, parse_type, parse_type_list};
pub use walk::{Visitor, Walk};
