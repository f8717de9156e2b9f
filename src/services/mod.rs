//! Service implementations for the Gemini API.

pub mod content;
pub mod embeddings;
pub mod files;

pub use content::*;
pub use embeddings::*;
pub use files::*;
