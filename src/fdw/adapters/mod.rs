//! Adapter implementations for the reconciliation ports.

pub mod env;
pub mod memory;
pub mod postgres;
pub mod tracing_log;
