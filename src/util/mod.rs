//! Utility modules for corpusmill
//!
//! - Structured logging setup and configuration
//! - Text cleanup helpers shared by the processing tiers

pub mod logging;
pub mod text;

pub use logging::{init_default, init_from_env, init_logging, parse_level, LoggingConfig};
pub use text::{clean_text, decode_lossy, printable_ratio};
