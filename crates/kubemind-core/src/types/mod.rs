//! Core types for kubemind.

mod incident;
mod memory_record;

pub use incident::*;
pub use memory_record::*;
