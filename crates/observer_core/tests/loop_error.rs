use std::cell::RefCell;
use std::rc::Rc;

use dom_host::{EventKind, Host, HostEvent, HostPlatform, SignalListener};
use observer_core::{LoopErrorReporter, RESIZE_LOOP_ERROR_MESSAGE, deliver_resize_loop_error};

fn capture_errors(host: &Host) -> Rc<RefCell<Vec<HostEvent>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let listener: SignalListener = {
        let seen = Rc::clone(&seen);
        Rc::new(move |event: &HostEvent| seen.borrow_mut().push(event.clone()))
    };
    host.add_signal_listeners(&[EventKind::Error], listener);
    seen
}

#[test]
fn undelivered_notifications_raise_an_error_event() {
    let host = Host::new();
    let seen = capture_errors(&host);

    deliver_resize_loop_error(&host);

    let events = seen.borrow();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, EventKind::Error);
    assert_eq!(events[0].message.as_deref(), Some(RESIZE_LOOP_ERROR_MESSAGE));
    assert!(!events[0].bubbles);
    assert!(!events[0].cancelable);
}

#[test]
fn legacy_hosts_get_the_two_step_construction() {
    let host = Host::new();
    host.set_supports_error_event(false);
    let seen = capture_errors(&host);

    let reporter = LoopErrorReporter::detect(&host);
    reporter.deliver(&host);

    let events = seen.borrow();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].message.as_deref(), Some(RESIZE_LOOP_ERROR_MESSAGE));
    assert!(!events[0].bubbles);
    assert!(!events[0].cancelable);
}

#[test]
fn the_reporter_can_fire_repeatedly() {
    let host = Host::new();
    let seen = capture_errors(&host);

    let reporter = LoopErrorReporter::detect(&host);
    reporter.deliver(&host);
    reporter.deliver(&host);

    assert_eq!(seen.borrow().len(), 2);
}
