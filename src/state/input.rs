//! Input Module - Terminal host bridge
//!
//! Bridges crossterm's event system with the key state tracker.
//! Terminal key events become press/release signals keyed by DOM-style
//! `code` names, so `Shift+a` and `a` land on the same `KeyA` entry.
//!
//! # API
//!
//! - `key_code_name` - Name a crossterm key code
//! - `convert_key_event` - Convert a crossterm KeyEvent to a HostSignal
//! - `apply` / `feed` - Deliver signals or raw crossterm events to a Keyboard
//! - `poll_into` - Drain pending terminal events into a Keyboard
//! - `enable_release_events` / `disable_release_events` - Key-up reporting
//!
//! # Example
//!
//! ```ignore
//! use spark_keystate::{Keyboard, input::{poll_into, PollOptions}};
//!
//! let mut keyboard = Keyboard::new();
//! let options = PollOptions::default();
//! loop {
//!     poll_into(&mut keyboard, &options)?;
//!     if keyboard.is_key_pressed(&["Space"]) {
//!         // jump
//!     }
//!     keyboard.update();
//! }
//! ```

use std::io::stdout;
use std::time::Duration;

use crossterm::event::{
    Event as CrosstermEvent,
    KeyCode as TermKeyCode,
    KeyEvent as CrosstermKeyEvent,
    KeyEventKind,
    KeyModifiers,
    KeyboardEnhancementFlags,
    ModifierKeyCode,
    PopKeyboardEnhancementFlags,
    PushKeyboardEnhancementFlags,
    poll, read,
};
use crossterm::execute;
use crossterm::terminal::supports_keyboard_enhancement;
use log::{debug, trace, warn};

use super::keyboard::Keyboard;
use crate::error::{KeysError, Result};
use crate::types::{KeyCode, KeyPayload, Modifiers};

// =============================================================================
// HOST SIGNAL
// =============================================================================

/// Press or release as delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostSignal {
    Press(KeyCode, KeyPayload),
    Release(KeyCode),
}

impl HostSignal {
    pub fn code(&self) -> &KeyCode {
        match self {
            HostSignal::Press(code, _) | HostSignal::Release(code) => code,
        }
    }
}

// =============================================================================
// POLL OPTIONS
// =============================================================================

/// Tuning for `poll_into`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    /// How long to wait for the first event.
    pub timeout: Duration,
    /// Upper bound on events drained per call.
    pub max_events: usize,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(16),
            max_events: 64,
        }
    }
}

// =============================================================================
// KEY NAMING
// =============================================================================

/// Physical key for a printable character on a US layout.
fn char_code_name(c: char) -> String {
    if c.is_ascii_alphabetic() {
        return format!("Key{}", c.to_ascii_uppercase());
    }
    if c.is_ascii_digit() {
        return format!("Digit{}", c);
    }
    // Other letters: one name for both cases
    if c.is_alphabetic() {
        return c.to_lowercase().collect();
    }

    let name = match c {
        ' ' => "Space",
        ')' => "Digit0",
        '!' => "Digit1",
        '@' => "Digit2",
        '#' => "Digit3",
        '$' => "Digit4",
        '%' => "Digit5",
        '^' => "Digit6",
        '&' => "Digit7",
        '*' => "Digit8",
        '(' => "Digit9",
        '-' | '_' => "Minus",
        '=' | '+' => "Equal",
        '[' | '{' => "BracketLeft",
        ']' | '}' => "BracketRight",
        '\\' | '|' => "Backslash",
        ';' | ':' => "Semicolon",
        '\'' | '"' => "Quote",
        '`' | '~' => "Backquote",
        ',' | '<' => "Comma",
        '.' | '>' => "Period",
        '/' | '?' => "Slash",
        other => return other.to_string(),
    };
    name.to_string()
}

fn modifier_code_name(code: ModifierKeyCode) -> &'static str {
    match code {
        ModifierKeyCode::LeftShift => "ShiftLeft",
        ModifierKeyCode::RightShift => "ShiftRight",
        ModifierKeyCode::LeftControl => "ControlLeft",
        ModifierKeyCode::RightControl => "ControlRight",
        ModifierKeyCode::LeftAlt => "AltLeft",
        ModifierKeyCode::RightAlt => "AltRight",
        ModifierKeyCode::LeftSuper | ModifierKeyCode::LeftMeta => "MetaLeft",
        ModifierKeyCode::RightSuper | ModifierKeyCode::RightMeta => "MetaRight",
        ModifierKeyCode::LeftHyper => "HyperLeft",
        ModifierKeyCode::RightHyper => "HyperRight",
        ModifierKeyCode::IsoLevel3Shift => "AltGraph",
        ModifierKeyCode::IsoLevel5Shift => "IsoLevel5Shift",
    }
}

/// Name a crossterm key code. Returns None for keys the tracker ignores.
pub fn key_code_name(code: TermKeyCode) -> Option<KeyCode> {
    let name = match code {
        TermKeyCode::Char(c) => return Some(KeyCode::new(char_code_name(c))),
        TermKeyCode::F(n) => return Some(KeyCode::new(format!("F{}", n))),
        TermKeyCode::Modifier(m) => modifier_code_name(m),
        TermKeyCode::Enter => "Enter",
        TermKeyCode::Tab | TermKeyCode::BackTab => "Tab",
        TermKeyCode::Backspace => "Backspace",
        TermKeyCode::Delete => "Delete",
        TermKeyCode::Esc => "Escape",
        TermKeyCode::Up => "ArrowUp",
        TermKeyCode::Down => "ArrowDown",
        TermKeyCode::Left => "ArrowLeft",
        TermKeyCode::Right => "ArrowRight",
        TermKeyCode::Home => "Home",
        TermKeyCode::End => "End",
        TermKeyCode::PageUp => "PageUp",
        TermKeyCode::PageDown => "PageDown",
        TermKeyCode::Insert => "Insert",
        TermKeyCode::CapsLock => "CapsLock",
        TermKeyCode::ScrollLock => "ScrollLock",
        TermKeyCode::NumLock => "NumLock",
        TermKeyCode::PrintScreen => "PrintScreen",
        TermKeyCode::Pause => "Pause",
        TermKeyCode::Menu => "ContextMenu",
        _ => return None,
    };
    Some(KeyCode::new(name))
}

// =============================================================================
// EVENT CONVERSION
// =============================================================================

/// Convert crossterm KeyModifiers to our Modifiers
fn convert_modifiers(mods: KeyModifiers) -> Modifiers {
    let mut out = Modifiers::NONE;
    if mods.contains(KeyModifiers::SHIFT) {
        out |= Modifiers::SHIFT;
    }
    if mods.contains(KeyModifiers::CONTROL) {
        out |= Modifiers::CONTROL;
    }
    if mods.contains(KeyModifiers::ALT) {
        out |= Modifiers::ALT;
    }
    if mods.contains(KeyModifiers::SUPER) {
        out |= Modifiers::SUPER;
    }
    if mods.contains(KeyModifiers::HYPER) {
        out |= Modifiers::HYPER;
    }
    if mods.contains(KeyModifiers::META) {
        out |= Modifiers::META;
    }
    out
}

/// Convert a crossterm KeyEvent into a host signal.
///
/// Repeats become presses; the tracker absorbs them.
pub fn convert_key_event(event: CrosstermKeyEvent) -> Option<HostSignal> {
    let code = key_code_name(event.code)?;

    match event.kind {
        KeyEventKind::Press | KeyEventKind::Repeat => {
            let key = match event.code {
                TermKeyCode::Char(c) => c.to_string(),
                _ => code.to_string(),
            };
            let payload = KeyPayload::with_modifiers(key, convert_modifiers(event.modifiers));
            Some(HostSignal::Press(code, payload))
        }
        KeyEventKind::Release => Some(HostSignal::Release(code)),
    }
}

/// Deliver a host signal. Returns whether the tracker changed.
pub fn apply(keyboard: &mut Keyboard, signal: HostSignal) -> bool {
    match signal {
        HostSignal::Press(code, payload) => keyboard.press_with(code, Some(payload)),
        HostSignal::Release(code) => keyboard.release(code),
    }
}

/// Deliver a raw crossterm event. Returns true if it was a key event the
/// tracker understood; other events are dropped.
pub fn feed(keyboard: &mut Keyboard, event: CrosstermEvent) -> bool {
    match event {
        CrosstermEvent::Key(key) => match convert_key_event(key) {
            Some(signal) => {
                trace!("host signal {:?}", signal);
                apply(keyboard, signal);
                true
            }
            None => {
                trace!("unmapped key {:?}", key.code);
                false
            }
        },
        _ => false,
    }
}

// =============================================================================
// EVENT POLLING
// =============================================================================

/// Drain pending terminal events into the tracker.
///
/// Waits up to `options.timeout` for the first event, then takes whatever
/// is already queued without blocking. Returns the number of key signals
/// delivered.
pub fn poll_into(keyboard: &mut Keyboard, options: &PollOptions) -> Result<usize> {
    let mut delivered = 0;
    let mut timeout = options.timeout;

    for _ in 0..options.max_events {
        if !poll(timeout)? {
            break;
        }
        if feed(keyboard, read()?) {
            delivered += 1;
        }
        timeout = Duration::ZERO;
    }

    Ok(delivered)
}

// =============================================================================
// RELEASE REPORTING
// =============================================================================

/// Ask the terminal to report key-up and modifier events.
///
/// Most terminals only send presses; without this the tracker never sees a
/// release. Fails with `ReleaseUnsupported` when the terminal lacks the
/// keyboard enhancement protocol. Requires raw mode.
pub fn enable_release_events() -> Result<()> {
    if !supports_keyboard_enhancement()? {
        warn!("terminal lacks keyboard enhancement, key releases will not be reported");
        return Err(KeysError::ReleaseUnsupported);
    }

    execute!(
        stdout(),
        PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
                | KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES
        )
    )?;
    debug!("key release reporting enabled");
    Ok(())
}

/// Undo `enable_release_events`.
pub fn disable_release_events() -> Result<()> {
    execute!(stdout(), PopKeyboardEnhancementFlags)?;
    debug!("key release reporting disabled");
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
