// Stored references: discovered or hand-added content with platform metrics.

pub mod handlers;
pub mod store;
