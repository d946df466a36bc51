//! Keyboard Module - Per-frame key state tracker
//!
//! Owns one entry per key that is down or released-but-not-yet-reaped, and
//! the handler registry for `Pressed`/`Released`/`Down` events.
//! Does NOT own the terminal (that is the input module).
//!
//! # API
//!
//! - `press` / `release` - Host signals
//! - `update` - Per-frame tick: pressed keys become held, released keys are reaped
//! - `is_key_down` / `is_key_up` / `is_key_pressed` / `is_key_released` - Queries
//! - `on(kind, fn)` / `on_key(kind, key, fn)` / `off(id)` - Subscriptions
//! - `last_transition` - Reactive signal of the latest press/release
//!
//! # Example
//!
//! ```ignore
//! use spark_keystate::{Keyboard, KeyEventKind};
//!
//! let mut keyboard = Keyboard::new();
//! keyboard.on_key(KeyEventKind::Pressed, "Space", |_| println!("jump"));
//!
//! keyboard.press("Space");
//! assert!(keyboard.is_key_pressed(&["Space"]));
//!
//! keyboard.update(); // once per frame
//! assert!(keyboard.is_key_down(&["Space"]));
//! ```

use std::rc::Rc;

use log::{debug, trace};
use spark_signals::{signal, Signal};

use super::registry::{HandlerRegistry, KeyEvent, SubscriptionId, Topic};
use crate::types::{KeyCode, KeyEventKind, KeyPayload, KeyPhase, KeyState, Transition};

// =============================================================================
// ENTRY
// =============================================================================

/// Tracked key: the tracker's flags plus the host payload, kept apart.
#[derive(Debug, Clone)]
struct Entry {
    code: KeyCode,
    state: KeyState,
    payload: Option<KeyPayload>,
}

impl Entry {
    fn event(&self, kind: KeyEventKind) -> KeyEvent<'_> {
        KeyEvent {
            kind,
            code: &self.code,
            state: self.state,
            payload: self.payload.as_ref(),
        }
    }
}

// =============================================================================
// KEYBOARD
// =============================================================================

/// Key state tracker.
///
/// Construct one per input layer and hand it to consumers by reference.
pub struct Keyboard {
    // Insertion-ordered; a handful of keys are ever down at once.
    entries: Vec<Entry>,
    registry: HandlerRegistry,
    last_transition: Signal<Option<Transition>>,
}

impl Default for Keyboard {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Keyboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keyboard")
            .field("entries", &self.entries)
            .field("handlers", &self.registry.len())
            .finish()
    }
}

impl Keyboard {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            registry: HandlerRegistry::new(),
            last_transition: signal(None),
        }
    }

    fn position(&self, code: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.code == code)
    }

    fn entry(&self, code: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.code == code)
    }

    // =========================================================================
    // HOST SIGNALS
    // =========================================================================

    /// Key went down, without host payload.
    pub fn press(&mut self, code: impl Into<KeyCode>) -> bool {
        self.press_with(code, None)
    }

    /// Key went down.
    ///
    /// Creates an entry and emits `Pressed` only if the key is not already
    /// tracked; host auto-repeat is absorbed. Returns true if an entry was created.
    pub fn press_with(&mut self, code: impl Into<KeyCode>, payload: Option<KeyPayload>) -> bool {
        let code = code.into();
        if self.position(code.as_str()).is_some() {
            trace!("press {} ignored, already tracked", code);
            return false;
        }

        debug!("key pressed: {}", code);
        self.entries.push(Entry {
            code: code.clone(),
            state: KeyState::fresh(),
            payload,
        });

        if let Some(entry) = self.entries.last() {
            self.registry.emit(&entry.event(KeyEventKind::Pressed));
        }
        self.last_transition.set(Some(Transition {
            kind: KeyEventKind::Pressed,
            code,
        }));
        true
    }

    /// Key went up.
    ///
    /// Marks the entry released and emits `Released`; the entry stays until
    /// the next `update`. Unknown keys are ignored. Returns true if the key
    /// was tracked.
    pub fn release(&mut self, code: impl AsRef<str>) -> bool {
        let code = code.as_ref();
        let Some(index) = self.position(code) else {
            trace!("release {} ignored, not tracked", code);
            return false;
        };

        debug!("key released: {}", code);
        let entry = &mut self.entries[index];
        entry.state.was_released = true;
        self.registry.emit(&entry.event(KeyEventKind::Released));

        let code = entry.code.clone();
        self.last_transition.set(Some(Transition {
            kind: KeyEventKind::Released,
            code,
        }));
        true
    }

    /// Per-frame tick.
    ///
    /// Every entry becomes `already_pressed` and emits `Down`, including the
    /// ones being reaped. Entries released before this call are removed.
    pub fn update(&mut self) {
        for entry in self.entries.iter_mut() {
            entry.state.already_pressed = true;
            self.registry.emit(&entry.event(KeyEventKind::Down));
        }

        let before = self.entries.len();
        self.entries.retain(|e| !e.state.was_released);
        let reaped = before - self.entries.len();
        if reaped > 0 {
            trace!("update reaped {} released key(s)", reaped);
        }
    }

    /// Forget every key. No events are emitted.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Forget every key, drop every handler and reset the transition signal.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.registry.clear();
        self.last_transition.set(None);
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// True if any listed key is down.
    pub fn is_key_down<K: AsRef<str>>(&self, codes: &[K]) -> bool {
        codes
            .iter()
            .any(|code| self.entry(code.as_ref()).is_some_and(|e| e.state.is_down()))
    }

    /// True if none of the listed keys is down.
    ///
    /// Each listed key is checked on its own. Trackers that look the whole
    /// list up as a single key always answer true; this one does not.
    pub fn is_key_up<K: AsRef<str>>(&self, codes: &[K]) -> bool {
        !self.is_key_down(codes)
    }

    /// True if any listed key went down since the last `update`.
    pub fn is_key_pressed<K: AsRef<str>>(&self, codes: &[K]) -> bool {
        codes
            .iter()
            .any(|code| self.entry(code.as_ref()).is_some_and(|e| e.state.is_pressed()))
    }

    /// True if any listed key was released and not yet reaped by `update`.
    pub fn is_key_released<K: AsRef<str>>(&self, codes: &[K]) -> bool {
        codes
            .iter()
            .any(|code| self.entry(code.as_ref()).is_some_and(|e| e.state.was_released))
    }

    pub fn state(&self, code: impl AsRef<str>) -> Option<KeyState> {
        self.entry(code.as_ref()).map(|e| e.state)
    }

    pub fn phase(&self, code: impl AsRef<str>) -> Option<KeyPhase> {
        self.state(code).map(|s| s.phase())
    }

    /// Host payload recorded when the key went down.
    pub fn payload(&self, code: impl AsRef<str>) -> Option<&KeyPayload> {
        self.entry(code.as_ref()).and_then(|e| e.payload.as_ref())
    }

    /// Keys currently down, in the order they went down.
    pub fn held_keys(&self) -> impl Iterator<Item = &KeyCode> {
        self.entries
            .iter()
            .filter(|e| e.state.is_down())
            .map(|e| &e.code)
    }

    /// Number of tracked entries, including released keys awaiting the next tick.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // =========================================================================
    // SUBSCRIPTIONS
    // =========================================================================

    /// Subscribe to an event kind for every key.
    pub fn on<F>(&mut self, kind: KeyEventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&KeyEvent<'_>) + 'static,
    {
        self.registry.subscribe(Topic::Global(kind), Rc::new(handler))
    }

    /// Subscribe to an event kind for one key.
    pub fn on_key<F>(&mut self, kind: KeyEventKind, code: impl Into<KeyCode>, handler: F) -> SubscriptionId
    where
        F: Fn(&KeyEvent<'_>) + 'static,
    {
        self.registry
            .subscribe(Topic::Key(kind, code.into()), Rc::new(handler))
    }

    /// Subscribe to an explicit topic.
    pub fn subscribe<F>(&mut self, topic: Topic, handler: F) -> SubscriptionId
    where
        F: Fn(&KeyEvent<'_>) + 'static,
    {
        self.registry.subscribe(topic, Rc::new(handler))
    }

    /// Unsubscribe. Returns false if the id was unknown.
    pub fn off(&mut self, id: SubscriptionId) -> bool {
        self.registry.unsubscribe(id)
    }

    pub fn handler_count(&self) -> usize {
        self.registry.len()
    }

    // =========================================================================
    // REACTIVE STATE
    // =========================================================================

    /// Latest press or release.
    pub fn last_transition(&self) -> Option<Transition> {
        self.last_transition.get()
    }

    /// The signal behind `last_transition`, for effects and deriveds.
    pub fn last_transition_signal(&self) -> Signal<Option<Transition>> {
        self.last_transition.clone()
    }
}

// =============================================================================
// TESTS
// =============================================================================
