// TikTok watchlists: named sets of creators and hashtags followed for a niche.

pub mod handlers;
pub mod store;
