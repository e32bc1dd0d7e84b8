//! Data models

pub mod candidate;
pub mod prediction;

pub use candidate::*;
pub use prediction::*;
