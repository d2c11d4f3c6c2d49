//! Process-wide logging setup for the disposition services.

pub mod tracing;

pub use self::tracing::{LogFormat, init, init_with};
