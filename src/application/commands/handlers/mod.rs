//! Command Handlers 实现

mod detect_mood_handlers;

pub use detect_mood_handlers::*;
