use std::cell::{Cell, RefCell};
use std::env;
use std::rc::Rc;

use anyhow::Error;
use dom_host::{
    EventKind, HostPlatform, ListenerId, MutationListener, MutationObserverConfig, SignalListener,
};

/// How long to keep re-checking after a triggering signal before falling
/// back to passive listening.
pub const DEFAULT_CATCH_PERIOD_MS: u64 = 250;

/// Catch window granted after a delivered resize, long enough to catch
/// cascading layout effects of the change itself.
pub const DEFAULT_RESIZE_BACKOFF_MS: u64 = 1000;

/// Every global event treated as "something might have resized".
pub const LAYOUT_SIGNAL_EVENTS: &[EventKind] = &[
    // Global resize and load
    EventKind::Resize,
    EventKind::Load,
    // Transitions and animations
    EventKind::TransitionEnd,
    EventKind::AnimationEnd,
    EventKind::AnimationStart,
    EventKind::AnimationIteration,
    // Interactions
    EventKind::KeyUp,
    EventKind::KeyDown,
    EventKind::MouseUp,
    EventKind::MouseDown,
    EventKind::MouseOver,
    EventKind::MouseOut,
    EventKind::Blur,
    EventKind::Focus,
];

/// Scheduling policy. The timing constants were tuned empirically against
/// real hosts, so they are configuration rather than hard-coded law.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub catch_period_ms: u64,
    pub resize_backoff_ms: u64,
    pub signal_events: Vec<EventKind>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            catch_period_ms: DEFAULT_CATCH_PERIOD_MS,
            resize_backoff_ms: DEFAULT_RESIZE_BACKOFF_MS,
            signal_events: LAYOUT_SIGNAL_EVENTS.to_vec(),
        }
    }
}

impl SchedulerConfig {
    /// Load the timing constants from the environment.
    ///
    /// Reads `VIGIL_CATCH_PERIOD_MS` and `VIGIL_RESIZE_BACKOFF_MS`, keeping
    /// the defaults for anything unset or unparsable.
    #[must_use]
    pub fn from_env() -> Self {
        let catch_period_ms = env::var("VIGIL_CATCH_PERIOD_MS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(DEFAULT_CATCH_PERIOD_MS);
        let resize_backoff_ms = env::var("VIGIL_RESIZE_BACKOFF_MS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(DEFAULT_RESIZE_BACKOFF_MS);
        Self {
            catch_period_ms,
            resize_backoff_ms,
            ..Self::default()
        }
    }
}

/// The processing step the scheduler drives: diff every observed target and
/// deliver notifications, reporting whether any box size changed.
pub trait ProcessStep {
    fn process(&mut self) -> Result<bool, Error>;
}

impl<F: FnMut() -> Result<bool, Error>> ProcessStep for F {
    fn process(&mut self) -> Result<bool, Error> {
        self()
    }
}

struct Shared<H: HostPlatform> {
    host: Rc<H>,
    config: SchedulerConfig,
    process: RefCell<Box<dyn ProcessStep>>,
    /// Reference count across every active observation request.
    watching: Cell<i64>,
    /// Whether passive listening is currently detached.
    stopped: Cell<bool>,
    /// Reentrancy guard: at most one processing attempt in flight.
    scheduled: Cell<bool>,
    listener_ids: RefCell<Vec<ListenerId>>,
}

/// State machine that decides when to re-run the processing step.
///
/// With no native size-change primitive available, the scheduler reacts to
/// any DOM, user or animation signal that could plausibly change layout,
/// re-checks aggressively for a bounded catch window afterwards, and then
/// returns to cheap passive listening once things settle.
///
/// Handles are cheap `Rc` clones sharing one state block; everything runs on
/// the single control thread.
pub struct Scheduler<H: HostPlatform + 'static> {
    shared: Rc<Shared<H>>,
}

impl<H: HostPlatform + 'static> Clone for Scheduler<H> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<H: HostPlatform + 'static> Scheduler<H> {
    pub fn new(host: Rc<H>, process: Box<dyn ProcessStep>) -> Self {
        Self::with_config(host, process, SchedulerConfig::default())
    }

    pub fn with_config(host: Rc<H>, process: Box<dyn ProcessStep>, config: SchedulerConfig) -> Self {
        Self {
            shared: Rc::new(Shared {
                host,
                config,
                process: RefCell::new(process),
                watching: Cell::new(0),
                stopped: Cell::new(true),
                scheduled: Cell::new(false),
                listener_ids: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Whether any observation request is active.
    #[must_use]
    pub fn is_watching(&self) -> bool {
        self.shared.watching.get() > 0
    }

    #[must_use]
    pub fn watch_count(&self) -> i64 {
        self.shared.watching.get()
    }

    /// Whether passive listeners are currently attached.
    #[must_use]
    pub fn is_listening(&self) -> bool {
        !self.shared.stopped.get()
    }

    /// Adjust the watch reference count. Crossing zero upward starts passive
    /// listening; dropping back to zero stops it.
    pub fn update_count(&self, delta: i64) {
        let shared = &self.shared;
        if shared.watching.get() == 0 && delta > 0 {
            self.start();
        }
        let next = (shared.watching.get() + delta).max(0);
        shared.watching.set(next);
        if next == 0 {
            self.stop();
        }
    }

    /// Attach the broad-spectrum mutation observer and the global event
    /// listeners. No-op when already listening.
    pub fn start(&self) {
        let shared = &self.shared;
        if !shared.stopped.get() {
            return;
        }
        shared.stopped.set(false);
        shared
            .host
            .observe_mutations(MutationObserverConfig::broad(), self.mutation_listener());
        let ids = shared
            .host
            .add_signal_listeners(&shared.config.signal_events, self.signal_listener());
        *shared.listener_ids.borrow_mut() = ids;
        log::debug!("scheduler listening for layout-affecting signals");
    }

    /// Detach the mutation observer and every event listener. No-op when not
    /// listening.
    pub fn stop(&self) {
        let shared = &self.shared;
        if shared.stopped.get() {
            return;
        }
        shared.host.disconnect_mutations();
        let ids = std::mem::take(&mut *shared.listener_ids.borrow_mut());
        shared.host.remove_signal_listeners(&ids);
        shared.stopped.set(true);
        log::debug!("scheduler detached passive listeners");
    }

    /// React to a listened-for signal: leave passive listening and begin an
    /// active run.
    pub fn schedule(&self) {
        self.stop();
        self.run(self.shared.config.catch_period_ms);
    }

    fn signal_listener(&self) -> SignalListener {
        let weak = Rc::downgrade(&self.shared);
        Rc::new(move |_event| {
            if let Some(shared) = weak.upgrade() {
                Scheduler { shared }.schedule();
            }
        })
    }

    fn mutation_listener(&self) -> MutationListener {
        let weak = Rc::downgrade(&self.shared);
        Rc::new(move || {
            if let Some(shared) = weak.upgrade() {
                Scheduler { shared }.schedule();
            }
        })
    }

    /// Queue one active processing attempt behind the host's double
    /// deferral. Dropped if an attempt is already pending.
    fn run(&self, timeout_ms: u64) {
        let shared = &self.shared;
        if shared.scheduled.get() {
            return;
        }
        shared.scheduled.set(true);
        let until = shared.host.now_ms() + timeout_ms;
        let this = self.clone();
        shared
            .host
            .queue_resize_task(Box::new(move || this.finish_run(until)));
    }

    fn finish_run(&self, until: u64) {
        let shared = &self.shared;
        let outcome = shared.process.borrow_mut().process();
        // Bookkeeping runs no matter how the process step ended.
        shared.scheduled.set(false);
        let remaining = until.saturating_sub(shared.host.now_ms());
        if !self.is_watching() {
            return;
        }
        let resized = match outcome {
            Ok(resized) => resized,
            Err(err) => {
                log::warn!("resize process step failed: {err:#}");
                false
            }
        };
        if resized {
            // A delivered change can cascade into further layout changes,
            // so grant a fresh, longer window.
            self.run(shared.config.resize_backoff_ms);
        } else if remaining > 0 {
            self.run(remaining);
        } else {
            self.start();
        }
    }
}
