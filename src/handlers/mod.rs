//! HTTP handlers

pub mod demo;
pub mod features;
pub mod health;
pub mod predict;
