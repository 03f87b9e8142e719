//! # macmem-utils
//!
//! Shared utilities for macmem crates. Currently this is the logging
//! bootstrap; anything needed by both the core library and the shell binary
//! lands here.

pub mod logging;

pub use logging::{init_logging, init_logging_with_level, LogFormat, LogLevel, LoggingError};
