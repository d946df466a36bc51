//! Handler Registry - Typed subscriber lists for tracker events
//!
//! Handlers subscribe to a [`Topic`]: an event kind on the global channel,
//! or an event kind narrowed to one key. Dispatch is synchronous and runs
//! handlers in subscription order.

use std::collections::HashMap;
use std::rc::Rc;

use crate::types::{KeyCode, KeyEventKind, KeyPayload, KeyState};

// =============================================================================
// TYPES
// =============================================================================

/// Event delivered to handlers.
#[derive(Debug, Clone, Copy)]
pub struct KeyEvent<'a> {
    pub kind: KeyEventKind,
    pub code: &'a KeyCode,
    /// Flags after the transition was applied.
    pub state: KeyState,
    /// Host payload captured at press time.
    pub payload: Option<&'a KeyPayload>,
}

/// Handler for tracker events.
pub type KeyHandler = Rc<dyn Fn(&KeyEvent<'_>)>;

/// Subscription channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Every key.
    Global(KeyEventKind),
    /// One key only.
    Key(KeyEventKind, KeyCode),
}

impl Topic {
    pub fn kind(&self) -> KeyEventKind {
        match self {
            Topic::Global(kind) | Topic::Key(kind, _) => *kind,
        }
    }
}

/// Returned by subscribe; pass to `unsubscribe` to stop delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(usize);

// =============================================================================
// REGISTRY
// =============================================================================

type HandlerList = Vec<(SubscriptionId, KeyHandler)>;

/// Drop `id` from whichever list holds it, then drop emptied lists.
fn remove_handler(lists: &mut HashMap<KeyEventKind, HandlerList>, id: SubscriptionId) -> bool {
    let mut found = false;
    for handlers in lists.values_mut() {
        let before = handlers.len();
        handlers.retain(|(handler_id, _)| *handler_id != id);
        if handlers.len() != before {
            found = true;
            break;
        }
    }
    if found {
        lists.retain(|_, handlers| !handlers.is_empty());
    }
    found
}

#[derive(Default)]
pub struct HandlerRegistry {
    global_handlers: HashMap<KeyEventKind, HandlerList>,
    key_handlers: HashMap<KeyCode, HashMap<KeyEventKind, HandlerList>>,
    next_id: usize,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn subscribe(&mut self, topic: Topic, handler: KeyHandler) -> SubscriptionId {
        let id = self.next_id();
        let handlers = match topic {
            Topic::Global(kind) => self.global_handlers.entry(kind).or_default(),
            Topic::Key(kind, code) => self
                .key_handlers
                .entry(code)
                .or_default()
                .entry(kind)
                .or_default(),
        };
        handlers.push((id, handler));
        id
    }

    /// Remove a handler. Returns false if the id was unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        if remove_handler(&mut self.global_handlers, id) {
            return true;
        }

        let found = self
            .key_handlers
            .values_mut()
            .any(|lists| remove_handler(lists, id));
        if found {
            self.key_handlers.retain(|_, lists| !lists.is_empty());
        }
        found
    }

    /// Dispatch to the global topic, then to the key's own topic.
    ///
    /// Handlers only get the event, never the registry, so the lists are
    /// walked in place.
    pub fn emit(&self, event: &KeyEvent<'_>) {
        if let Some(handlers) = self.global_handlers.get(&event.kind) {
            for (_, handler) in handlers {
                handler(event);
            }
        }

        let keyed = self
            .key_handlers
            .get(event.code.as_str())
            .and_then(|lists| lists.get(&event.kind));
        if let Some(handlers) = keyed {
            for (_, handler) in handlers {
                handler(event);
            }
        }
    }

    pub fn len(&self) -> usize {
        let global: usize = self.global_handlers.values().map(Vec::len).sum();
        let keyed: usize = self
            .key_handlers
            .values()
            .flat_map(|lists| lists.values())
            .map(Vec::len)
            .sum();
        global + keyed
    }

    pub fn is_empty(&self) -> bool {
        self.global_handlers.is_empty() && self.key_handlers.is_empty()
    }

    /// Drop every handler. Ids are not reused.
    pub fn clear(&mut self) {
        self.global_handlers.clear();
        self.key_handlers.clear();
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(&'static str) -> KeyHandler) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let log_clone = log.clone();
        let make = move |label: &'static str| -> KeyHandler {
            let log = log_clone.clone();
            let handler: KeyHandler = Rc::new(move |event: &KeyEvent<'_>| {
                log.borrow_mut().push(format!("{}:{}:{}", label, event.kind, event.code));
            });
            handler
        };
        (log, make)
    }

    fn event(kind: KeyEventKind, code: &KeyCode) -> KeyEvent<'_> {
        KeyEvent {
            kind,
            code,
            state: KeyState::fresh(),
            payload: None,
        }
    }

    #[test]
    fn test_global_before_keyed() {
        let (log, make) = recorder();
        let mut reg = HandlerRegistry::new();

        let key_a = KeyCode::from("KeyA");
        reg.subscribe(Topic::Key(KeyEventKind::Pressed, key_a.clone()), make("keyed"));
        reg.subscribe(Topic::Global(KeyEventKind::Pressed), make("global"));

        reg.emit(&event(KeyEventKind::Pressed, &key_a));

        assert_eq!(
            *log.borrow(),
            vec!["global:pressed:KeyA".to_string(), "keyed:pressed:KeyA".to_string()]
        );
    }

    #[test]
    fn test_subscription_order() {
        let (log, make) = recorder();
        let mut reg = HandlerRegistry::new();

        reg.subscribe(Topic::Global(KeyEventKind::Down), make("first"));
        reg.subscribe(Topic::Global(KeyEventKind::Down), make("second"));

        reg.emit(&event(KeyEventKind::Down, &KeyCode::from("Space")));

        assert_eq!(
            *log.borrow(),
            vec!["first:down:Space".to_string(), "second:down:Space".to_string()]
        );
    }

    #[test]
    fn test_topics_are_isolated() {
        let (log, make) = recorder();
        let mut reg = HandlerRegistry::new();

        reg.subscribe(Topic::Key(KeyEventKind::Pressed, KeyCode::from("KeyA")), make("a"));
        reg.subscribe(Topic::Global(KeyEventKind::Released), make("released"));

        // Different key, different kind
        reg.emit(&event(KeyEventKind::Pressed, &KeyCode::from("KeyB")));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_unsubscribe() {
        let (log, make) = recorder();
        let mut reg = HandlerRegistry::new();

        let id = reg.subscribe(Topic::Global(KeyEventKind::Pressed), make("gone"));
        assert_eq!(reg.len(), 1);

        assert!(reg.unsubscribe(id));
        assert!(!reg.unsubscribe(id));
        assert!(reg.is_empty());

        reg.emit(&event(KeyEventKind::Pressed, &KeyCode::from("KeyA")));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_unsubscribe_keyed() {
        let (log, make) = recorder();
        let mut reg = HandlerRegistry::new();

        let key_a = KeyCode::from("KeyA");
        let down = reg.subscribe(Topic::Key(KeyEventKind::Down, key_a.clone()), make("down"));
        let up = reg.subscribe(Topic::Key(KeyEventKind::Released, key_a.clone()), make("up"));
        assert_eq!(reg.len(), 2);

        assert!(reg.unsubscribe(down));
        reg.emit(&event(KeyEventKind::Down, &key_a));
        reg.emit(&event(KeyEventKind::Released, &key_a));
        assert_eq!(*log.borrow(), vec!["up:released:KeyA".to_string()]);

        assert!(reg.unsubscribe(up));
        assert!(reg.is_empty());
        assert_eq!(reg.len(), 0);
    }

    #[test]
    fn test_ids_not_reused_after_clear() {
        let (_log, make) = recorder();
        let mut reg = HandlerRegistry::new();

        let first = reg.subscribe(Topic::Global(KeyEventKind::Down), make("x"));
        reg.clear();
        let second = reg.subscribe(Topic::Global(KeyEventKind::Down), make("y"));

        assert_ne!(first, second);
        assert!(!reg.unsubscribe(first));
        assert!(reg.unsubscribe(second));
    }

    #[test]
    fn test_topic_kind() {
        assert_eq!(Topic::Global(KeyEventKind::Down).kind(), KeyEventKind::Down);
        assert_eq!(
            Topic::Key(KeyEventKind::Released, KeyCode::from("KeyA")).kind(),
            KeyEventKind::Released
        );
    }
}
