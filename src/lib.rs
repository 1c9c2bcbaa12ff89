//! Core library for the Aurora scripting language: a line-at-a-time
//! tokenizer, node builder and evaluator with promotion-ladder numbers and
//! a registry of built-in classes.

pub mod ast;
pub mod config;
pub mod console;
pub mod diagnostics;
pub mod environment;
pub mod lexer;
pub mod logging;
pub mod number;
pub mod parser;
pub mod registry;
pub mod repl;
pub mod runtime;
pub mod stdlib;
pub mod token;

pub use diagnostics::{AuroraError, Diagnostic, ErrorKind, ErrorPolicy};
pub use repl::Repl;
pub use runtime::Interpreter;
pub use token::Token;
