// Transcript analysis: regex heuristics refined by one LLM call.

pub mod analyzer;
pub mod handlers;
pub mod heuristics;
pub mod prompts;
pub mod store;
