//! Mood Context - 情绪识别上下文

mod errors;
mod value_objects;

pub use errors::MoodError;
pub use value_objects::{ImagePayload, Mood};
