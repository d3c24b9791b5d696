//! Schema module - Fitness scheme and candidate types.

mod candidate;
mod scheme;

pub use candidate::*;
pub use scheme::*;
