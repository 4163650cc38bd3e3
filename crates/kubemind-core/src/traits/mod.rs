//! Core traits for kubemind providers.

mod dedup_store;
mod embedder;
mod reasoner;
mod vector_store;

pub use dedup_store::*;
pub use embedder::*;
pub use reasoner::*;
pub use vector_store::*;
