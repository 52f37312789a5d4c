pub mod auth;
pub mod category;
pub mod client;
pub mod project;
pub mod project_status;
pub mod report;
pub mod user;
