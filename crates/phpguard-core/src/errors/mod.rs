pub mod error_code;

mod config_error;
mod parse_error;
mod rule_error;

pub use config_error::ConfigError;
pub use parse_error::ParseError;
pub use rule_error::RuleError;
