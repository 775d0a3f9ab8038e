//! Data models
//!
//! Organized by concern: the local file payload, backend media records, and the
//! per-entry upload state used by the queue.

mod file;
mod media;
mod upload;

pub use file::*;
pub use media::*;
pub use upload::*;
