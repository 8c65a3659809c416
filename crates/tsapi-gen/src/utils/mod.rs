pub mod config;
pub mod description;
