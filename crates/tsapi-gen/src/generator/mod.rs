pub(crate) mod ast;
pub mod codegen;
pub mod config;
pub(crate) mod description;
pub(crate) mod extractor;
pub mod metrics;
pub mod orchestrator;
pub(crate) mod scanner;
pub(crate) mod schema_walker;
pub mod tags;
