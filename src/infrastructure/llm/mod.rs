mod openai;

pub use openai::{OpenAiLlm, DEFAULT_CHAT_MODEL};
