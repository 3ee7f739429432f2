pub mod analysis;
pub mod job;
pub mod offer;
pub mod pack;
pub mod reference;
pub mod watchlist;
