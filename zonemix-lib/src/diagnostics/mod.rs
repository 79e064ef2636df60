//! Runtime diagnostics: transition history and frame timing.

pub mod clock;
pub mod timeline;

pub use clock::FrameClock;
pub use timeline::{Timeline, Transition};
