use std::cell::{Cell, Ref, RefCell, RefMut};
use std::rc::Rc;

use anyhow::Error;

use crate::clock::{Clock, MonotonicClock};
use crate::dom::{Document, DomUpdate};
use crate::signals::{
    EventKind, HostEvent, ListenerId, MutationListener, MutationObserverConfig, MutationRecord,
    SignalHub, SignalListener,
};
use crate::tasks::{Task, TaskQueue};

/// The facilities the scheduler needs from a host platform: broad-spectrum
/// change listeners, the deferred-execution lanes, a clock, and global event
/// dispatch.
pub trait HostPlatform {
    /// Attach a mutation observer to the document body. If no body exists
    /// yet the attachment is deferred until one does.
    fn observe_mutations(&self, config: MutationObserverConfig, listener: MutationListener);

    fn disconnect_mutations(&self);

    /// Register one listener on several global event channels, capture phase.
    fn add_signal_listeners(&self, kinds: &[EventKind], listener: SignalListener)
    -> Vec<ListenerId>;

    fn remove_signal_listeners(&self, ids: &[ListenerId]);

    /// Queue work behind the double deferral: end of the current microtask
    /// queue first, then the next animation-frame opportunity.
    fn queue_resize_task(&self, task: Task);

    fn now_ms(&self) -> u64;

    /// Dispatch an event on the global scope.
    fn dispatch(&self, event: HostEvent);

    /// Whether the host can construct error-shaped events directly.
    fn supports_error_event(&self) -> bool;
}

struct MutationObserverEntry {
    config: MutationObserverConfig,
    callback: MutationListener,
}

#[derive(Default)]
struct MutationState {
    attached: Vec<MutationObserverEntry>,
    parked: Vec<MutationObserverEntry>,
}

/// A complete single-threaded host: document, global listener hub, task
/// lanes and clock. The embedder feeds DOM updates and events in and pumps
/// the task queue once per frame.
pub struct Host {
    document: RefCell<Document>,
    signals: SignalHub,
    tasks: Rc<TaskQueue>,
    clock: Rc<dyn Clock>,
    supports_error_event: Cell<bool>,
    mutation: RefCell<MutationState>,
}

impl Default for Host {
    fn default() -> Self {
        Self::new()
    }
}

impl Host {
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Rc::new(MonotonicClock::new()))
    }

    #[must_use]
    pub fn with_clock(clock: Rc<dyn Clock>) -> Self {
        Self {
            document: RefCell::new(Document::new()),
            signals: SignalHub::new(),
            tasks: Rc::new(TaskQueue::new()),
            clock,
            supports_error_event: Cell::new(true),
            mutation: RefCell::new(MutationState::default()),
        }
    }

    pub fn document(&self) -> Ref<'_, Document> {
        self.document.borrow()
    }

    pub fn document_mut(&self) -> RefMut<'_, Document> {
        self.document.borrow_mut()
    }

    #[must_use]
    pub fn tasks(&self) -> &TaskQueue {
        &self.tasks
    }

    #[must_use]
    pub fn signals(&self) -> &SignalHub {
        &self.signals
    }

    /// Toggle the modern error-event construction capability (legacy hosts
    /// only offer the blank-event-then-init path).
    pub fn set_supports_error_event(&self, supported: bool) {
        self.supports_error_event.set(supported);
    }

    /// Apply a DOM update and notify any mutation observers it concerns.
    pub fn apply_update(&self, update: DomUpdate) -> Result<(), Error> {
        let finishes_document =
            matches!(update, DomUpdate::EndOfDocument) && !self.document.borrow().is_ready();
        let record = self.document.borrow_mut().apply_update(update)?;
        self.attach_parked_observers();
        if let Some(record) = record {
            self.notify_mutation(record);
        }
        if finishes_document {
            self.dispatch(HostEvent::new(EventKind::DomContentLoaded));
        }
        Ok(())
    }

    fn attach_parked_observers(&self) {
        if self.document.borrow().body().is_none() {
            return;
        }
        let mut state = self.mutation.borrow_mut();
        if !state.parked.is_empty() {
            log::debug!("attaching {} deferred mutation observers", state.parked.len());
            let parked = std::mem::take(&mut state.parked);
            state.attached.extend(parked);
        }
    }

    fn notify_mutation(&self, record: MutationRecord) {
        let callbacks: Vec<MutationListener> = {
            let document = self.document.borrow();
            let Some(body) = document.body() else {
                return;
            };
            let state = self.mutation.borrow();
            state
                .attached
                .iter()
                .filter(|entry| {
                    entry.config.matches(record.kind)
                        && if entry.config.subtree {
                            document.is_in_subtree(body, record.node)
                        } else {
                            record.node == body
                        }
                })
                .map(|entry| Rc::clone(&entry.callback))
                .collect()
        };
        for callback in callbacks {
            callback();
        }
    }
}

impl HostPlatform for Host {
    fn observe_mutations(&self, config: MutationObserverConfig, listener: MutationListener) {
        let entry = MutationObserverEntry {
            config,
            callback: listener,
        };
        let body_exists = self.document.borrow().body().is_some();
        let mut state = self.mutation.borrow_mut();
        if body_exists {
            state.attached.push(entry);
        } else {
            log::debug!("no body yet, parking mutation observer");
            state.parked.push(entry);
        }
    }

    fn disconnect_mutations(&self) {
        let mut state = self.mutation.borrow_mut();
        state.attached.clear();
        state.parked.clear();
    }

    fn add_signal_listeners(
        &self,
        kinds: &[EventKind],
        listener: SignalListener,
    ) -> Vec<ListenerId> {
        self.signals.add_listeners(kinds, &listener)
    }

    fn remove_signal_listeners(&self, ids: &[ListenerId]) {
        self.signals.remove_listeners(ids);
    }

    fn queue_resize_task(&self, task: Task) {
        let tasks = Rc::clone(&self.tasks);
        self.tasks
            .queue_microtask(Box::new(move || tasks.request_frame(task)));
    }

    fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    fn dispatch(&self, event: HostEvent) {
        self.signals.dispatch(&event);
    }

    fn supports_error_event(&self) -> bool {
        self.supports_error_event.get()
    }
}
