//! Command implementations.

pub mod paper;
pub mod strategies;
pub mod validate;
