//! Configuration loading and validation

mod parser;
mod types;
mod validation;

pub use parser::load_config;
pub use types::{CheckerConfig, Config, ScopeConfig};
pub use validation::validate;
