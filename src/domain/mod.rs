pub mod config;
pub mod draft;
pub mod errors;
pub mod models;
