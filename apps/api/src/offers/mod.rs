// Offer profiles: reusable problem/promise/proof/pitch tuples per project.

pub mod handlers;
pub mod store;
