//! A small line-oriented command interpreter.
//!
//! Each input line holds one or more sub-commands separated by `&`. They are
//! dispatched left to right: the builtins `exit`, `cd` and `path` run inside the
//! interpreter, anything else is resolved against a search path and launched
//! as a child process, optionally with its output redirected to a file
//! (`cmd args > file`). Children of one line run concurrently and are all
//! waited on before the next line is read.
//!
//! The main entry point is [`Interpreter`]. The public modules [`command`],
//! [`env`] and [`external`] expose the traits and types needed to plug in
//! other commands or another way of launching processes.

mod builtin;
pub mod command;
pub mod env;
pub mod error;
pub mod external;
mod interpreter;
pub mod io_adapters;
pub mod lexer;
pub mod parser;
pub mod path;

/// Just a convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::{Interpreter, PROMPT};

pub use error::{ERROR_MESSAGE, ShellError};
