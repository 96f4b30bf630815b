use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::dom::NodeKey;

/// Event channels on the global scope that can signal a layout change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Resize,
    Load,
    TransitionEnd,
    AnimationStart,
    AnimationEnd,
    AnimationIteration,
    KeyUp,
    KeyDown,
    MouseUp,
    MouseDown,
    MouseOver,
    MouseOut,
    Blur,
    Focus,
    DomContentLoaded,
    Error,
}

/// An event dispatched on the global scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEvent {
    pub kind: EventKind,
    pub bubbles: bool,
    pub cancelable: bool,
    /// Diagnostic message, carried by error-shaped events.
    pub message: Option<String>,
}

impl HostEvent {
    /// A blank, uninitialised event (the legacy two-step construction path).
    #[must_use]
    pub const fn new(kind: EventKind) -> Self {
        Self {
            kind,
            bubbles: false,
            cancelable: false,
            message: None,
        }
    }

    /// Legacy initialisation step for a blank event.
    pub fn init(&mut self, bubbles: bool, cancelable: bool) {
        self.bubbles = bubbles;
        self.cancelable = cancelable;
    }

    /// An error-shaped event carrying a message (the modern construction path).
    #[must_use]
    pub fn error(message: &str) -> Self {
        Self {
            kind: EventKind::Error,
            bubbles: false,
            cancelable: false,
            message: Some(message.to_string()),
        }
    }
}

/// Callback invoked when a listened-for event fires.
pub type SignalListener = Rc<dyn Fn(&HostEvent)>;

/// Callback invoked when an observed mutation happens.
pub type MutationListener = Rc<dyn Fn()>;

/// Handle for removing a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(u64);

struct ListenerEntry {
    id: ListenerId,
    kind: EventKind,
    capture: bool,
    callback: SignalListener,
}

/// Listener registry for the global scope.
///
/// Dispatch snapshots the matching callbacks before invoking them, so a
/// listener may add or remove listeners (including itself) while running.
#[derive(Default)]
pub struct SignalHub {
    next_id: Cell<u64>,
    listeners: RefCell<Vec<ListenerEntry>>,
}

impl SignalHub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(
        &self,
        kind: EventKind,
        callback: SignalListener,
        capture: bool,
    ) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.listeners.borrow_mut().push(ListenerEntry {
            id,
            kind,
            capture,
            callback,
        });
        id
    }

    /// Register one callback on several channels at once, capture phase.
    pub fn add_listeners(&self, kinds: &[EventKind], callback: &SignalListener) -> Vec<ListenerId> {
        kinds
            .iter()
            .map(|kind| self.add_listener(*kind, Rc::clone(callback), true))
            .collect()
    }

    pub fn remove_listener(&self, id: ListenerId) {
        self.listeners.borrow_mut().retain(|entry| entry.id != id);
    }

    pub fn remove_listeners(&self, ids: &[ListenerId]) {
        self.listeners
            .borrow_mut()
            .retain(|entry| !ids.contains(&entry.id));
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Dispatch an event to every listener on its channel, capture-phase
    /// listeners first.
    pub fn dispatch(&self, event: &HostEvent) {
        let callbacks: Vec<SignalListener> = {
            let listeners = self.listeners.borrow();
            let capture = listeners
                .iter()
                .filter(|entry| entry.kind == event.kind && entry.capture);
            let bubble = listeners
                .iter()
                .filter(|entry| entry.kind == event.kind && !entry.capture);
            capture
                .chain(bubble)
                .map(|entry| Rc::clone(&entry.callback))
                .collect()
        };
        for callback in callbacks {
            callback(event);
        }
    }
}

/// What a mutation observer is interested in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationObserverConfig {
    pub attributes: bool,
    pub character_data: bool,
    pub child_list: bool,
    pub subtree: bool,
}

impl MutationObserverConfig {
    /// Observe everything under the target. This is what the scheduler
    /// attaches to the document body.
    #[must_use]
    pub const fn broad() -> Self {
        Self {
            attributes: true,
            character_data: true,
            child_list: true,
            subtree: true,
        }
    }

    #[must_use]
    pub const fn matches(&self, kind: MutationKind) -> bool {
        match kind {
            MutationKind::ChildList => self.child_list,
            MutationKind::Attributes => self.attributes,
            MutationKind::CharacterData => self.character_data,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    ChildList,
    Attributes,
    CharacterData,
}

/// One observable mutation. For child-list changes `node` is the parent the
/// children changed under; otherwise it is the mutated node itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationRecord {
    pub kind: MutationKind,
    pub node: NodeKey,
}
