//! Error types for the Gemini bridge.

mod types;
mod categories;
mod mapper;

pub use types::*;
pub use categories::*;
pub use mapper::*;
