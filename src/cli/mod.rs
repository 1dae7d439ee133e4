//! Terminal front end for the question-answering service.

pub mod repl;

pub use repl::{is_exit_command, run, Answerer, ExitReason, EXIT_COMMANDS};
