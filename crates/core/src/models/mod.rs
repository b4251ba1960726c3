//! Data models for Pollboard

mod creator;
mod survey;
mod vote;

pub use creator::*;
pub use survey::*;
pub use vote::*;
