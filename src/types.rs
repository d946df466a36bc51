//! Core types for spark-keystate.
//!
//! These are the values that flow between the host bridge, the tracker,
//! and subscribed handlers.

use std::borrow::Borrow;
use std::fmt;

// =============================================================================
// KeyCode
// =============================================================================

/// Identifier of a physical or logical key (e.g. `"KeyA"`, `"ArrowUp"`).
///
/// The naming is host-defined. The terminal bridge produces DOM-style `code`
/// names so that shifted and unshifted presses land on the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct KeyCode(String);

impl KeyCode {
    /// Create a key code from any string-like value.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// The key code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for KeyCode {
    fn from(code: &str) -> Self {
        Self(code.to_string())
    }
}

impl From<String> for KeyCode {
    fn from(code: String) -> Self {
        Self(code)
    }
}

impl AsRef<str> for KeyCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for KeyCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for KeyCode {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for KeyCode {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

// =============================================================================
// Modifiers (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Modifier keys held when a key went down.
    ///
    /// Combine with bitwise OR: `Modifiers::CONTROL | Modifiers::SHIFT`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const NONE = 0;
        const SHIFT = 1 << 0;
        const CONTROL = 1 << 1;
        const ALT = 1 << 2;
        const SUPER = 1 << 3;
        const HYPER = 1 << 4;
        const META = 1 << 5;
    }
}

// =============================================================================
// KeyPayload - opaque host data
// =============================================================================

/// Host data captured when a key goes down.
///
/// Stored beside the tracker's own flags, never merged into them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyPayload {
    /// Text the key produced (e.g. `"a"` or `"A"`), empty for non-printing keys.
    pub key: String,
    pub modifiers: Modifiers,
}

impl KeyPayload {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
        }
    }
}

// =============================================================================
// KeyState - per-key flags
// =============================================================================

/// Per-key flags tracked between host signals and update ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyState {
    /// Set once the key has survived an update tick.
    pub already_pressed: bool,
    /// Set once a release signal arrived for this entry.
    pub was_released: bool,
}

impl KeyState {
    /// State of a key that just went down.
    pub const fn fresh() -> Self {
        Self {
            already_pressed: false,
            was_released: false,
        }
    }

    /// Down and not yet ticked.
    pub fn is_pressed(&self) -> bool {
        !self.was_released && !self.already_pressed
    }

    pub fn is_down(&self) -> bool {
        !self.was_released
    }

    pub fn phase(&self) -> KeyPhase {
        if self.was_released {
            KeyPhase::Released
        } else if self.already_pressed {
            KeyPhase::Held
        } else {
            KeyPhase::Pressed
        }
    }
}

/// Where a tracked key sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyPhase {
    /// Went down since the last update tick.
    Pressed,
    /// Down across at least one update tick.
    Held,
    /// Released, removed on the next update tick.
    Released,
}

// =============================================================================
// KeyEventKind / Transition
// =============================================================================

/// Event categories emitted by the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyEventKind {
    /// Key went down (first press only, repeats are absorbed).
    Pressed,
    /// Key went up.
    Released,
    /// Emitted for every tracked key on each update tick.
    Down,
}

impl fmt::Display for KeyEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pressed => "pressed",
            Self::Released => "released",
            Self::Down => "down",
        };
        f.write_str(name)
    }
}

/// The most recent press or release seen by a tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub kind: KeyEventKind,
    pub code: KeyCode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_code_compares_with_str() {
        let code = KeyCode::from("KeyA");
        assert_eq!(code, "KeyA");
        assert_eq!(code.as_str(), "KeyA");
        assert_eq!(code.to_string(), "KeyA");
        assert_ne!(code, KeyCode::new("KeyB"));
    }

    #[test]
    fn test_fresh_state_is_pressed() {
        let state = KeyState::fresh();
        assert!(state.is_pressed());
        assert!(state.is_down());
        assert_eq!(state.phase(), KeyPhase::Pressed);
    }

    #[test]
    fn test_phases() {
        let held = KeyState {
            already_pressed: true,
            was_released: false,
        };
        assert_eq!(held.phase(), KeyPhase::Held);
        assert!(!held.is_pressed());
        assert!(held.is_down());

        // Released before any tick still reads as released
        let released = KeyState {
            already_pressed: false,
            was_released: true,
        };
        assert_eq!(released.phase(), KeyPhase::Released);
        assert!(!released.is_pressed());
        assert!(!released.is_down());
    }

    #[test]
    fn test_modifiers_combine() {
        let mods = Modifiers::CONTROL | Modifiers::SHIFT;
        assert!(mods.contains(Modifiers::CONTROL));
        assert!(mods.contains(Modifiers::SHIFT));
        assert!(!mods.contains(Modifiers::ALT));
        assert_eq!(Modifiers::default(), Modifiers::NONE);
    }

    #[test]
    fn test_payload_constructors() {
        let payload = KeyPayload::with_modifiers("A", Modifiers::SHIFT);
        assert_eq!(payload.key, "A");
        assert_eq!(payload.modifiers, Modifiers::SHIFT);
        assert_eq!(KeyPayload::new("a").modifiers, Modifiers::NONE);
    }

    #[test]
    fn test_event_kind_names() {
        assert_eq!(KeyEventKind::Pressed.to_string(), "pressed");
        assert_eq!(KeyEventKind::Released.to_string(), "released");
        assert_eq!(KeyEventKind::Down.to_string(), "down");
    }
}
