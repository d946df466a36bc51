//! State Module - Key state tracking
//!
//! - **Keyboard** - Per-key state machine, queries, update tick
//! - **Registry** - Topic-keyed handler lists and dispatch
//! - **Input** - crossterm bridge feeding press/release signals

pub mod input;
mod keyboard;
mod registry;

pub use keyboard::*;
pub use registry::*;
