//! Shared utilities for trade-check
//!
//! Logging setup used by the workspace binaries.

pub mod logging;

pub use logging::{LogFormat, directive_for_verbosity, init_tracing};
