//! Core algorithms of the resize observation engine: the box-size
//! computation that reproduces a native implementation's metrics, the
//! ancestor-depth calculation that orders shallow-to-deep delivery, the
//! loop-error diagnostic reporter, and the adaptive scheduler that decides
//! when to re-run the processing step on hosts without a native size-change
//! primitive.
//!
//! The surrounding observer surface plugs in through
//! [`scheduler::ProcessStep`]; this crate performs no entry construction or
//! callback delivery itself.

pub mod box_size;
pub mod depth;
pub mod element_state;
pub mod loop_error;
pub mod scheduler;

pub use box_size::{
    BoxSize, BoxSizeCache, BoxSizes, ContentRect, ObservedBox, calculate_box_size,
    calculate_box_sizes,
};
pub use depth::{NodeDepth, calculate_depth_for_node};
pub use element_state::{is_element, is_hidden, is_replaced_element, is_svg};
pub use loop_error::{LoopErrorReporter, RESIZE_LOOP_ERROR_MESSAGE, deliver_resize_loop_error};
pub use scheduler::{
    DEFAULT_CATCH_PERIOD_MS, DEFAULT_RESIZE_BACKOFF_MS, LAYOUT_SIGNAL_EVENTS, ProcessStep,
    Scheduler, SchedulerConfig,
};
