use dom_host::{Document, DomUpdate, ElementMetrics, NodeKey};
use observer_core::{NodeDepth, calculate_depth_for_node};

fn insert(doc: &mut Document, parent: NodeKey, node: NodeKey, tag: &str) {
    doc.apply_update(DomUpdate::InsertElement {
        parent,
        node,
        tag: tag.to_string(),
        pos: usize::MAX,
    })
    .unwrap();
}

fn make_visible(doc: &mut Document, node: NodeKey) {
    doc.set_metrics(
        node,
        ElementMetrics {
            offset_width: 10.0,
            offset_height: 10.0,
            client_width: 10.0,
            client_height: 10.0,
            client_rect_count: 1,
        },
    );
}

#[test]
fn depth_increases_by_one_per_ancestor_step() {
    let mut doc = Document::new();
    let a = NodeKey(1);
    let b = NodeKey(2);
    let c = NodeKey(3);
    insert(&mut doc, NodeKey::ROOT, a, "div");
    insert(&mut doc, a, b, "div");
    insert(&mut doc, b, c, "div");
    for node in [a, b, c] {
        make_visible(&mut doc, node);
    }

    let NodeDepth::Finite(depth_a) = calculate_depth_for_node(&doc, a) else {
        panic!("visible node must have finite depth");
    };
    assert_eq!(calculate_depth_for_node(&doc, b), NodeDepth::Finite(depth_a + 1));
    assert_eq!(calculate_depth_for_node(&doc, c), NodeDepth::Finite(depth_a + 2));
}

#[test]
fn hidden_nodes_are_infinitely_deep() {
    let mut doc = Document::new();
    let mut parent = NodeKey::ROOT;
    for index in 1..=20 {
        let node = NodeKey(index);
        insert(&mut doc, parent, node, "div");
        parent = node;
    }

    // No metrics set: the deepest node has no rendered box.
    assert_eq!(calculate_depth_for_node(&doc, parent), NodeDepth::Infinite);
    assert!(calculate_depth_for_node(&doc, parent).is_infinite());
}

#[test]
fn hidden_nodes_sort_after_any_finite_depth() {
    let mut doc = Document::new();
    let shallow = NodeKey(1);
    let deep_parent = NodeKey(2);
    let deep = NodeKey(3);
    let hidden = NodeKey(4);
    insert(&mut doc, NodeKey::ROOT, shallow, "div");
    insert(&mut doc, NodeKey::ROOT, deep_parent, "div");
    insert(&mut doc, deep_parent, deep, "div");
    insert(&mut doc, NodeKey::ROOT, hidden, "div");
    for node in [shallow, deep_parent, deep] {
        make_visible(&mut doc, node);
    }

    let mut nodes = vec![hidden, deep, shallow];
    nodes.sort_by_key(|node| calculate_depth_for_node(&doc, *node));
    assert_eq!(nodes, vec![shallow, deep, hidden]);
}

#[test]
fn depth_is_recomputed_not_cached() {
    let mut doc = Document::new();
    let a = NodeKey(1);
    let b = NodeKey(2);
    insert(&mut doc, NodeKey::ROOT, a, "div");
    insert(&mut doc, a, b, "div");
    make_visible(&mut doc, a);
    make_visible(&mut doc, b);

    let before = calculate_depth_for_node(&doc, b);

    // Reparent b directly under the root; depth must track the new tree.
    doc.apply_update(DomUpdate::RemoveNode { node: b }).unwrap();
    insert(&mut doc, NodeKey::ROOT, b, "div");
    make_visible(&mut doc, b);
    let after = calculate_depth_for_node(&doc, b);
    assert!(after < before);
}
