mod atom;
mod builtin;
mod environment;
mod error;
mod evaluator;
mod expression;
mod interpreter;
mod kernel;
mod logging;
mod message_queue;
mod parser;
pub mod repl;
mod tokenizer;

#[cfg(test)]
mod test_utils;

pub use atom::Atom;
pub use environment::{Environment, Procedure};
pub use error::{Error, SemanticError, SemanticErrorKind, SyntaxError};
pub use expression::Expression;
pub use interpreter::Interpreter;
pub use kernel::{InputMessage, InputQueue, Kernel, KernelConfig, OutputMessage, OutputQueue};
pub use logging::init_tracing;
pub use message_queue::MessageQueue;
pub use parser::parse;
pub use tokenizer::{tokenize, Token};
