//! Bridge between the console thread and the async backend worker.

pub mod commands;
pub mod runtime;
