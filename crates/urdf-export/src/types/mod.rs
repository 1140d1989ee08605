//! Core type definitions

mod joint;
mod pose;

pub use joint::*;
pub use pose::*;
