//! Types and errors shared by every layer of the simulator

pub mod errors;
pub mod types;
