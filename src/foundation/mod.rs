//! Error taxonomy and shared geometry primitives.

pub mod error;
pub mod geometry;
