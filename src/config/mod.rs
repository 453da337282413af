//! Application configuration: types with defaults and the file/env loader

pub mod loader;
pub mod types;
