//! A small interactive command interpreter.
//!
//! This crate reads lines from standard input, splits them into whitespace
//! tokens, and either runs a built-in command in-process or launches an
//! external program, with optional `<`/`>` redirection or a `|` pipeline.
//! It is intentionally small and easy to read, suitable for coursework and
//! experiments with process management and terminal bookkeeping.
//!
//! The main entry point is [`Shell`], which owns the [`Session`] (terminal
//! and process-group state acquired at startup) and an [`Environment`]
//! (variables, current directory). [`Shell::execute_line`] evaluates one
//! already-read line against a caller-supplied output stream, which is also
//! how the tests drive it; [`Shell::repl`] wraps it in the prompt loop.

pub mod builtin;
pub mod env;
pub mod logging;

mod interpreter;
mod launcher;
mod pipeline;
mod redirect;
mod session;
mod tokens;

pub use env::Environment;
pub use interpreter::Shell;
pub use session::Session;
