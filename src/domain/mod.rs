pub mod entities;
pub mod errors;
pub mod ports;
pub mod prompt;

pub use entities::*;
pub use errors::{DomainError, Result};
pub use prompt::{format_context, PromptTemplate, DEFAULT_ANSWER_TEMPLATE, NO_INFORMATION_ANSWER};
