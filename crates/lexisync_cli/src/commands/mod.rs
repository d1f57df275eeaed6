//! CLI command implementations.

pub mod decode;
pub mod merge;
pub mod render;
pub mod state;
