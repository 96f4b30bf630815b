use std::cell::RefCell;
use std::collections::VecDeque;

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce()>;

/// Cooperative two-lane task queue standing in for the host's microtask
/// queue and per-frame callback primitive.
///
/// The embedder pumps it: [`TaskQueue::run_frame`] models one paint
/// opportunity (pending microtasks drain first, then the frame tasks that
/// were queued before this frame started). Frame tasks queued while a frame
/// is running land in the next frame, matching animation-frame semantics.
#[derive(Default)]
pub struct TaskQueue {
    microtasks: RefCell<VecDeque<Task>>,
    frame_tasks: RefCell<VecDeque<Task>>,
}

impl TaskQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_microtask(&self, task: Task) {
        self.microtasks.borrow_mut().push_back(task);
    }

    pub fn request_frame(&self, task: Task) {
        self.frame_tasks.borrow_mut().push_back(task);
    }

    /// Run microtasks until the lane is empty, including ones queued while
    /// draining.
    pub fn drain_microtasks(&self) {
        loop {
            let task = self.microtasks.borrow_mut().pop_front();
            match task {
                Some(task) => task(),
                None => break,
            }
        }
    }

    /// One paint opportunity: drain microtasks, then run the frame tasks
    /// present at that point, then drain microtasks queued by them.
    pub fn run_frame(&self) {
        self.drain_microtasks();
        let pending = self.frame_tasks.borrow().len();
        for _ in 0..pending {
            let task = self.frame_tasks.borrow_mut().pop_front();
            match task {
                Some(task) => task(),
                None => break,
            }
        }
        self.drain_microtasks();
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.microtasks.borrow().is_empty() && self.frame_tasks.borrow().is_empty()
    }
}
