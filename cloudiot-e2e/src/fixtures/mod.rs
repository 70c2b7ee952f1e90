//! Fixtures wrapping the external sample programs
//!
//! Fixtures turn typed calls into the command lines the sample CLIs expect.

mod manager;
mod sample;

pub use manager::*;
pub use sample::*;
