//! HTTP Handlers

mod mood;
mod ping;

pub use mood::*;
pub use ping::*;
