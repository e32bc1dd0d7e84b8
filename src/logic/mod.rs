//! Core classification logic, independent of HTTP.

pub mod assemble;
pub mod context;
pub mod demo;
pub mod explain;
pub mod layout;
pub mod model;
pub mod validate;

pub use context::{ModelContext, PredictError};
