//! # spark-keystate
//!
//! Per-frame keyboard key state for terminal apps and game loops.
//!
//! The host delivers press/release signals; the application calls
//! [`Keyboard::update`] once per frame. Between ticks the tracker answers
//! "is down", "is up", "was just pressed" and "was just released", and it
//! emits `Pressed`, `Released` and `Down` events to subscribed handlers.
//!
//! ## Key lifecycle
//!
//! ```text
//! absent ──press──▶ pressed ──update──▶ held
//!                      │                 │
//!                      └────release──────┴──▶ released ──update──▶ absent
//! ```
//!
//! A released key stays visible to `is_key_released` until the next
//! `update`, which reaps it.
//!
//! ## Modules
//!
//! - [`types`] - Key codes, flags, payloads, event kinds
//! - [`state`] - The tracker, its handler registry, and the crossterm bridge
//! - [`error`] - Errors from the terminal bridge

pub mod error;
pub mod state;
pub mod types;

pub use types::*;

pub use error::KeysError;

pub use state::{
    HandlerRegistry, KeyEvent, KeyHandler, Keyboard, SubscriptionId, Topic,
};

pub use state::input;
