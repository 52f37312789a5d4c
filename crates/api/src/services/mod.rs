//! Request-independent operations shared by handlers and the binary.

pub mod project_status;
pub mod relations;
pub mod seed;
