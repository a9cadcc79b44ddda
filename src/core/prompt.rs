//! Prompt construction for data-grounded questions.

use crate::adapters::ChatRequest;

/// Instructs the model to answer only from the supplied data
pub const SYSTEM_PROMPT: &str = "\
You are a data analysis assistant. You will be given a block of text containing CSV data.
Your task is to answer questions based *only* on the information present in the provided data.
Do not make assumptions or use external knowledge.

Provide a concise, direct answer to the question.
";

/// User message embedding the data context and the question
pub fn user_prompt(context: &str, question: &str) -> String {
    format!(
        "Here is the data:\n\n---\n{}\n---\n\nQuestion: {}",
        context, question
    )
}

/// Build the full chat request
pub fn build_request(context: &str, question: &str) -> ChatRequest {
    ChatRequest::new(SYSTEM_PROMPT, user_prompt(context, question))
}
