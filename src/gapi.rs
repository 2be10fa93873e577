pub mod config;
pub mod context;
pub mod errors;
pub mod registry;
pub mod scope;
pub mod soft_context;
