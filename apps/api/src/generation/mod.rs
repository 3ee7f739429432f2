// Pack generation: prompt assembly, the output contract, and tracked jobs.
// Model calls go through llm_client::ChatCompleter.

pub mod generator;
pub mod handlers;
pub mod jobs;
pub mod pipeline;
pub mod prompts;
