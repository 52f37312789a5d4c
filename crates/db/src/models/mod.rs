//! Entity models and DTOs.
//!
//! All models serialize with camelCase keys to match the web client.

pub mod category;
pub mod client;
pub mod project;
pub mod stats;
pub mod user;
