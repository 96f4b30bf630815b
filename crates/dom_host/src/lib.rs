//! Host-platform side of the resize observation engine: opaque node handles,
//! a side-table document mirror with per-element layout metrics and style
//! snapshots, the global signal hub, mutation observation, the cooperative
//! task lanes and clocks, and the [`Host`] aggregate tying them together.
//!
//! The observation core consumes this crate only through the [`HostDocument`]
//! and [`HostPlatform`] traits, so an embedder with a real platform behind it
//! can supply its own implementations.

mod clock;
mod dom;
mod geometry;
mod host;
mod signals;
mod style;
mod tasks;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use dom::{Document, DomUpdate, ElementMetrics, HostDocument, Namespace, NodeKey, NodeKind};
pub use geometry::{Edges, Rect};
pub use host::{Host, HostPlatform};
pub use signals::{
    EventKind, HostEvent, ListenerId, MutationKind, MutationListener, MutationObserverConfig,
    MutationRecord, SignalHub, SignalListener,
};
pub use style::{BoxSizing, ComputedStyle, Overflow, WritingMode};
pub use tasks::{Task, TaskQueue};
