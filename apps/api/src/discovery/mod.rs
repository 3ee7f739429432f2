// Discovery: viral scoring, ranking of fetched candidates, and niche suggestions.

pub mod handlers;
pub mod prompts;
pub mod ranking;
pub mod scoring;
pub mod suggest;
