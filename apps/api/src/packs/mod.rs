// Generated content packs.

pub mod handlers;
pub mod store;
