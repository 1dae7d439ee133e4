//! Prompt rendering for the answer step.
//!
//! The template carries two placeholders, `{context}` and `{question}`, which
//! are filled in a single pass so that text inside the retrieved chunks or the
//! question is never reinterpreted as a placeholder.

use crate::domain::{DomainError, SearchResult};

const CONTEXT_PLACEHOLDER: &str = "{context}";
const QUESTION_PLACEHOLDER: &str = "{question}";

/// Fixed reply the model is told to give when the context does not cover the
/// question.
pub const NO_INFORMATION_ANSWER: &str =
    "I don't have the information needed to answer your question.";

pub const DEFAULT_ANSWER_TEMPLATE: &str = r#"
CONTEXT:
{context}

RULES:
- Answer only based on the CONTEXT.
- If the information is not explicitly in the CONTEXT, answer:
  "I don't have the information needed to answer your question."
- Never make things up or use outside knowledge.
- Never give opinions or interpretations beyond what is written.

EXAMPLES OF QUESTIONS OUTSIDE THE CONTEXT:
Question: "What is the capital of France?"
Answer: "I don't have the information needed to answer your question."

Question: "How many customers did we have in 2024?"
Answer: "I don't have the information needed to answer your question."

Question: "Do you think this is good or bad?"
Answer: "I don't have the information needed to answer your question."

USER QUESTION:
{question}

ANSWER THE "USER QUESTION"
"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Result<Self, DomainError> {
        let template = template.into();
        for placeholder in [CONTEXT_PLACEHOLDER, QUESTION_PLACEHOLDER] {
            if !template.contains(placeholder) {
                return Err(DomainError::config(format!(
                    "prompt template is missing the {placeholder} placeholder"
                )));
            }
        }
        Ok(Self { template })
    }

    pub fn render(&self, context: &str, question: &str) -> String {
        let mut out = String::with_capacity(self.template.len() + context.len() + question.len());
        let mut rest = self.template.as_str();

        loop {
            let next = [
                (rest.find(CONTEXT_PLACEHOLDER), CONTEXT_PLACEHOLDER, context),
                (rest.find(QUESTION_PLACEHOLDER), QUESTION_PLACEHOLDER, question),
            ]
            .into_iter()
            .filter_map(|(pos, placeholder, value)| pos.map(|p| (p, placeholder, value)))
            .min_by_key(|(pos, _, _)| *pos);

            match next {
                Some((pos, placeholder, value)) => {
                    out.push_str(&rest[..pos]);
                    out.push_str(value);
                    rest = &rest[pos + placeholder.len()..];
                }
                None => {
                    out.push_str(rest);
                    break;
                }
            }
        }

        out.trim().to_string()
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            template: DEFAULT_ANSWER_TEMPLATE.to_string(),
        }
    }
}

/// Joins retrieved chunks, in the order given, into the context block.
///
/// Each chunk gets a header with its rank, score and, when known, page and
/// source file.
pub fn format_context(results: &[SearchResult]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let mut header = format!("[Excerpt {} | score={:.4}", i + 1, r.score);
            if let Some(page) = r.chunk.metadata.page {
                header.push_str(&format!(" | page={page}"));
            }
            if let Some(source) = r.chunk.metadata.source.as_deref().filter(|s| !s.is_empty()) {
                header.push_str(&format!(" | src={source}"));
            }
            header.push(']');
            format!("{header}\n{}\n", r.chunk.content.trim())
        })
        .collect::<Vec<_>>()
        .join("\n")
}
