use std::cell::{Cell, RefCell};
use std::rc::Rc;

use dom_host::{
    Clock, DomUpdate, EventKind, Host, HostEvent, HostPlatform, ManualClock, MutationListener,
    MutationObserverConfig, NodeKey, SignalListener,
};

fn insert(host: &Host, parent: NodeKey, node: NodeKey, tag: &str) {
    host.apply_update(DomUpdate::InsertElement {
        parent,
        node,
        tag: tag.to_string(),
        pos: usize::MAX,
    })
    .unwrap();
}

fn with_body(host: &Host) -> NodeKey {
    let html = NodeKey(1);
    let body = NodeKey(2);
    insert(host, NodeKey::ROOT, html, "html");
    insert(host, html, body, "body");
    body
}

fn counting_listener(hits: &Rc<Cell<u32>>) -> SignalListener {
    let hits = Rc::clone(hits);
    Rc::new(move |_event| hits.set(hits.get() + 1))
}

fn counting_mutation_listener(hits: &Rc<Cell<u32>>) -> MutationListener {
    let hits = Rc::clone(hits);
    Rc::new(move || hits.set(hits.get() + 1))
}

#[test]
fn signal_listeners_fire_and_can_be_removed() {
    let host = Host::new();
    let hits = Rc::new(Cell::new(0));
    let ids = host.add_signal_listeners(
        &[EventKind::Resize, EventKind::Load],
        counting_listener(&hits),
    );

    host.dispatch(HostEvent::new(EventKind::Resize));
    host.dispatch(HostEvent::new(EventKind::Load));
    host.dispatch(HostEvent::new(EventKind::Blur));
    assert_eq!(hits.get(), 2);

    host.remove_signal_listeners(&ids);
    host.dispatch(HostEvent::new(EventKind::Resize));
    assert_eq!(hits.get(), 2);
    assert_eq!(host.signals().listener_count(), 0);
}

#[test]
fn listener_may_remove_itself_while_dispatching() {
    let host = Rc::new(Host::new());
    let hits = Rc::new(Cell::new(0));
    let ids: Rc<RefCell<Vec<dom_host::ListenerId>>> = Rc::new(RefCell::new(Vec::new()));

    let listener: SignalListener = {
        let host = Rc::clone(&host);
        let hits = Rc::clone(&hits);
        let ids = Rc::clone(&ids);
        Rc::new(move |_event| {
            hits.set(hits.get() + 1);
            host.remove_signal_listeners(&ids.borrow());
        })
    };
    *ids.borrow_mut() = host.add_signal_listeners(&[EventKind::Resize], listener);

    host.dispatch(HostEvent::new(EventKind::Resize));
    host.dispatch(HostEvent::new(EventKind::Resize));
    assert_eq!(hits.get(), 1);
}

#[test]
fn mutation_observer_waits_for_body() {
    let _ = env_logger::builder().is_test(true).try_init();
    let host = Host::new();
    let hits = Rc::new(Cell::new(0));
    host.observe_mutations(
        MutationObserverConfig::broad(),
        counting_mutation_listener(&hits),
    );

    // Nothing to observe yet: no body exists.
    insert(&host, NodeKey::ROOT, NodeKey(1), "html");
    assert_eq!(hits.get(), 0);

    insert(&host, NodeKey(1), NodeKey(2), "body");
    // The observer attaches with the body; later mutations under it fire.
    insert(&host, NodeKey(2), NodeKey(3), "div");
    assert_eq!(hits.get(), 1);

    host.apply_update(DomUpdate::SetAttr {
        node: NodeKey(3),
        name: "class".to_string(),
        value: "wide".to_string(),
    })
    .unwrap();
    assert_eq!(hits.get(), 2);

    host.disconnect_mutations();
    insert(&host, NodeKey(2), NodeKey(4), "p");
    assert_eq!(hits.get(), 2);
}

#[test]
fn mutation_config_filters_kinds_and_subtree() {
    let host = Host::new();
    let body = with_body(&host);
    let hits = Rc::new(Cell::new(0));
    host.observe_mutations(
        MutationObserverConfig {
            attributes: false,
            character_data: false,
            child_list: true,
            subtree: false,
        },
        counting_mutation_listener(&hits),
    );

    let div = NodeKey(3);
    insert(&host, body, div, "div");
    assert_eq!(hits.get(), 1);

    // Attribute changes are filtered out by the config.
    host.apply_update(DomUpdate::SetAttr {
        node: div,
        name: "class".to_string(),
        value: "x".to_string(),
    })
    .unwrap();
    assert_eq!(hits.get(), 1);

    // Without subtree, a child-list change below the body is ignored.
    insert(&host, div, NodeKey(4), "span");
    assert_eq!(hits.get(), 1);
}

#[test]
fn mutations_outside_the_body_are_ignored() {
    let host = Host::new();
    let _body = with_body(&host);
    let hits = Rc::new(Cell::new(0));
    host.observe_mutations(
        MutationObserverConfig::broad(),
        counting_mutation_listener(&hits),
    );

    // A sibling of the body is outside the observed subtree.
    insert(&host, NodeKey(1), NodeKey(9), "head");
    assert_eq!(hits.get(), 0);
}

#[test]
fn microtasks_run_before_frame_tasks() {
    let host = Host::new();
    let order = Rc::new(RefCell::new(Vec::new()));

    let tasks = host.tasks();
    {
        let order = Rc::clone(&order);
        tasks.request_frame(Box::new(move || order.borrow_mut().push("frame")));
    }
    {
        let order = Rc::clone(&order);
        tasks.queue_microtask(Box::new(move || order.borrow_mut().push("micro")));
    }
    tasks.run_frame();
    assert_eq!(*order.borrow(), ["micro", "frame"]);
    assert!(tasks.is_idle());
}

#[test]
fn resize_tasks_take_the_double_deferral() {
    let host = Host::new();
    let ran = Rc::new(Cell::new(false));
    {
        let ran = Rc::clone(&ran);
        host.queue_resize_task(Box::new(move || ran.set(true)));
    }

    // Draining microtasks alone only moves the task to the frame lane.
    host.tasks().drain_microtasks();
    assert!(!ran.get());
    assert!(!host.tasks().is_idle());

    host.tasks().run_frame();
    assert!(ran.get());
    assert!(host.tasks().is_idle());
}

#[test]
fn frame_tasks_queued_mid_frame_wait_for_the_next_frame() {
    let host = Rc::new(Host::new());
    let runs = Rc::new(Cell::new(0));
    {
        let runs = Rc::clone(&runs);
        let host2 = Rc::clone(&host);
        host.tasks().request_frame(Box::new(move || {
            runs.set(runs.get() + 1);
            let runs = Rc::clone(&runs);
            host2
                .tasks()
                .request_frame(Box::new(move || runs.set(runs.get() + 1)));
        }));
    }
    host.tasks().run_frame();
    assert_eq!(runs.get(), 1);
    host.tasks().run_frame();
    assert_eq!(runs.get(), 2);
}

#[test]
fn end_of_document_fires_content_loaded_once() {
    let host = Host::new();
    let _body = with_body(&host);
    let hits = Rc::new(Cell::new(0));
    host.add_signal_listeners(&[EventKind::DomContentLoaded], counting_listener(&hits));

    host.apply_update(DomUpdate::EndOfDocument).unwrap();
    assert!(host.document().is_ready());
    assert_eq!(hits.get(), 1);

    host.apply_update(DomUpdate::EndOfDocument).unwrap();
    assert_eq!(hits.get(), 1);
}

#[test]
fn manual_clock_drives_now() {
    let clock = Rc::new(ManualClock::new());
    let host = Host::with_clock(Rc::clone(&clock) as Rc<dyn Clock>);
    assert_eq!(host.now_ms(), 0);
    clock.advance(250);
    assert_eq!(host.now_ms(), 250);
    clock.set(1000);
    assert_eq!(host.now_ms(), 1000);
}
