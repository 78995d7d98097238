//! Core type definitions

mod axis;
mod transform;

pub use axis::*;
pub use transform::*;
