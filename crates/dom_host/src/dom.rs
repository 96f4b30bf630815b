use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use anyhow::{Error, bail};
use smallvec::SmallVec;

use crate::geometry::Rect;
use crate::signals::{MutationKind, MutationRecord};
use crate::style::ComputedStyle;

/// Opaque handle to a node in a document tree.
///
/// Keys are minted by the embedder; the document never hands out references
/// to its nodes, so a key held elsewhere keeps nothing alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(pub u64);

impl NodeKey {
    /// The document node itself (always present).
    pub const ROOT: NodeKey = NodeKey(0);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Namespace {
    #[default]
    Html,
    Svg,
}

#[derive(Debug, Clone, Default)]
pub enum NodeKind {
    #[default]
    Document,
    Element {
        tag: String,
    },
    Text {
        text: String,
    },
}

/// Layout metrics the host exposes per element, in CSS pixels.
///
/// These mirror `offsetWidth`/`offsetHeight`, `clientWidth`/`clientHeight`
/// and `getClientRects().length` on a real platform.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ElementMetrics {
    pub offset_width: f64,
    pub offset_height: f64,
    pub client_width: f64,
    pub client_height: f64,
    pub client_rect_count: usize,
}

#[derive(Debug, Clone, Default)]
struct DomNode {
    kind: NodeKind,
    namespace: Namespace,
    attrs: SmallVec<(String, String), 4>,
    parent: Option<NodeKey>,
    children: Vec<NodeKey>,
    metrics: ElementMetrics,
    bounding_box: Option<Rect>,
    style: ComputedStyle,
}

/// A single mutation applied to the document.
#[derive(Debug, Clone)]
pub enum DomUpdate {
    InsertElement {
        parent: NodeKey,
        node: NodeKey,
        tag: String,
        pos: usize,
    },
    InsertText {
        parent: NodeKey,
        node: NodeKey,
        text: String,
        pos: usize,
    },
    SetAttr {
        node: NodeKey,
        name: String,
        value: String,
    },
    SetText {
        node: NodeKey,
        text: String,
    },
    RemoveNode {
        node: NodeKey,
    },
    EndOfDocument,
}

/// Side-table document mirror keyed by [`NodeKey`].
///
/// Holds tree structure, attributes, per-element layout metrics and the
/// resolved style snapshot the box calculator reads. All mutation goes
/// through [`Document::apply_update`], which reports what kind of mutation
/// happened so observers can be notified by the surrounding host.
pub struct Document {
    nodes: HashMap<NodeKey, DomNode>,
    body: Option<NodeKey>,
    ready: bool,
    foreign_views: Vec<Rc<RefCell<Document>>>,
    device_pixel_ratio: f64,
    legacy_border_box_quirk: bool,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    #[must_use]
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(NodeKey::ROOT, DomNode::default());
        Self {
            nodes,
            body: None,
            ready: false,
            foreign_views: Vec::new(),
            device_pixel_ratio: 1.0,
            legacy_border_box_quirk: false,
        }
    }

    /// Apply a single update, returning the mutation record to report to
    /// observers (`None` for updates that are not observable mutations).
    pub fn apply_update(&mut self, update: DomUpdate) -> Result<Option<MutationRecord>, Error> {
        match update {
            DomUpdate::InsertElement {
                parent,
                node,
                tag,
                pos,
            } => {
                let tag = tag.to_ascii_lowercase();
                let namespace = if tag == "svg" {
                    Namespace::Svg
                } else {
                    self.namespace_of(parent)
                };
                self.insert_node(
                    parent,
                    node,
                    DomNode {
                        kind: NodeKind::Element { tag: tag.clone() },
                        namespace,
                        parent: Some(parent),
                        ..DomNode::default()
                    },
                    pos,
                )?;
                if self.body.is_none() && tag == "body" {
                    self.body = Some(node);
                }
                Ok(Some(MutationRecord {
                    kind: MutationKind::ChildList,
                    node: parent,
                }))
            }
            DomUpdate::InsertText {
                parent,
                node,
                text,
                pos,
            } => {
                let namespace = self.namespace_of(parent);
                self.insert_node(
                    parent,
                    node,
                    DomNode {
                        kind: NodeKind::Text { text },
                        namespace,
                        parent: Some(parent),
                        ..DomNode::default()
                    },
                    pos,
                )?;
                Ok(Some(MutationRecord {
                    kind: MutationKind::ChildList,
                    node: parent,
                }))
            }
            DomUpdate::SetAttr { node, name, value } => {
                let name = name.to_ascii_lowercase();
                let Some(entry) = self.nodes.get_mut(&node) else {
                    bail!("attribute set on unknown node {node:?}");
                };
                if let Some(existing) = entry.attrs.iter_mut().find(|(key, _)| *key == name) {
                    existing.1 = value;
                } else {
                    entry.attrs.push((name, value));
                }
                Ok(Some(MutationRecord {
                    kind: MutationKind::Attributes,
                    node,
                }))
            }
            DomUpdate::SetText { node, text } => {
                let Some(entry) = self.nodes.get_mut(&node) else {
                    bail!("text set on unknown node {node:?}");
                };
                let NodeKind::Text { text: existing } = &mut entry.kind else {
                    bail!("text set on non-text node {node:?}");
                };
                *existing = text;
                Ok(Some(MutationRecord {
                    kind: MutationKind::CharacterData,
                    node,
                }))
            }
            DomUpdate::RemoveNode { node } => {
                if node == NodeKey::ROOT {
                    bail!("cannot remove the document node");
                }
                let Some(parent) = self.nodes.get(&node).and_then(|entry| entry.parent) else {
                    bail!("removal of unknown node {node:?}");
                };
                if let Some(parent_entry) = self.nodes.get_mut(&parent) {
                    parent_entry.children.retain(|child| *child != node);
                }
                self.remove_subtree(node);
                Ok(Some(MutationRecord {
                    kind: MutationKind::ChildList,
                    node: parent,
                }))
            }
            DomUpdate::EndOfDocument => {
                self.ready = true;
                Ok(None)
            }
        }
    }

    fn insert_node(
        &mut self,
        parent: NodeKey,
        node: NodeKey,
        entry: DomNode,
        pos: usize,
    ) -> Result<(), Error> {
        if self.nodes.contains_key(&node) {
            bail!("node {node:?} inserted twice");
        }
        let Some(parent_entry) = self.nodes.get_mut(&parent) else {
            bail!("insert under unknown parent {parent:?}");
        };
        let idx = pos.min(parent_entry.children.len());
        parent_entry.children.insert(idx, node);
        self.nodes.insert(node, entry);
        Ok(())
    }

    fn remove_subtree(&mut self, node: NodeKey) {
        if let Some(entry) = self.nodes.remove(&node) {
            if self.body == Some(node) {
                self.body = None;
            }
            for child in entry.children {
                self.remove_subtree(child);
            }
        }
    }

    fn namespace_of(&self, node: NodeKey) -> Namespace {
        self.nodes
            .get(&node)
            .map(|entry| entry.namespace)
            .unwrap_or_default()
    }

    /// The first `body` element inserted, if any.
    #[must_use]
    pub fn body(&self) -> Option<NodeKey> {
        self.body
    }

    /// Whether the end of the document stream has been seen.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn children(&self, node: NodeKey) -> &[NodeKey] {
        self.nodes
            .get(&node)
            .map_or(&[][..], |entry| &entry.children)
    }

    /// True when `node` is `root` or a descendant of it.
    #[must_use]
    pub fn is_in_subtree(&self, root: NodeKey, node: NodeKey) -> bool {
        let mut current = Some(node);
        while let Some(key) = current {
            if key == root {
                return true;
            }
            current = self.nodes.get(&key).and_then(|entry| entry.parent);
        }
        false
    }

    pub fn set_metrics(&mut self, node: NodeKey, metrics: ElementMetrics) {
        if let Some(entry) = self.nodes.get_mut(&node) {
            entry.metrics = metrics;
        }
    }

    pub fn set_style(&mut self, node: NodeKey, style: ComputedStyle) {
        if let Some(entry) = self.nodes.get_mut(&node) {
            entry.style = style;
        }
    }

    /// Record the intrinsic bounding box a graphics element would report.
    pub fn set_bounding_box(&mut self, node: NodeKey, bounding_box: Rect) {
        if let Some(entry) = self.nodes.get_mut(&node) {
            entry.bounding_box = Some(bounding_box);
        }
    }

    pub fn set_device_pixel_ratio(&mut self, ratio: f64) {
        self.device_pixel_ratio = ratio;
    }

    /// Mark the host as a legacy engine that already excludes padding from
    /// `width`/`height` under border-box sizing.
    pub fn set_legacy_border_box_quirk(&mut self, quirk: bool) {
        self.legacy_border_box_quirk = quirk;
    }

    /// Register another document view whose elements this document's callers
    /// should still recognise as elements (frames from a different realm).
    pub fn register_foreign_view(&mut self, view: Rc<RefCell<Document>>) {
        self.foreign_views.push(view);
    }
}

/// Read side of a document, as consumed by the observation core.
pub trait HostDocument {
    /// Whether this document owns the node.
    fn owns(&self, node: NodeKey) -> bool;

    /// Whether a registered foreign document view owns the node as an
    /// element. Ownership alone is not enough: a foreign text or document
    /// node is still not an element.
    fn foreign_is_element(&self, _node: NodeKey) -> bool {
        false
    }

    fn is_element_node(&self, node: NodeKey) -> bool;

    /// Lowercased tag name, `None` for non-element nodes.
    fn tag(&self, node: NodeKey) -> Option<&str>;

    fn attribute(&self, node: NodeKey, name: &str) -> Option<&str>;

    fn parent(&self, node: NodeKey) -> Option<NodeKey>;

    /// Resolved style snapshot for the element.
    fn computed_style(&self, node: NodeKey) -> ComputedStyle;

    /// Whether the node is an element in the graphics (SVG) namespace that
    /// supports bounding-box queries.
    fn is_graphics_element(&self, node: NodeKey) -> bool;

    /// Nearest `svg` ancestor, excluding the node itself.
    fn owner_graphics_root(&self, node: NodeKey) -> Option<NodeKey>;

    /// Intrinsic bounding box of a graphics element (zero if unset).
    fn bounding_box(&self, node: NodeKey) -> Rect;

    fn offset_size(&self, node: NodeKey) -> (f64, f64);

    fn client_size(&self, node: NodeKey) -> (f64, f64);

    fn client_rect_count(&self, node: NodeKey) -> usize;

    fn device_pixel_ratio(&self) -> f64;

    /// True on legacy engines that never include padding in used
    /// `width`/`height` under `box-sizing: border-box`.
    fn legacy_border_box_quirk(&self) -> bool;
}

impl HostDocument for Document {
    fn owns(&self, node: NodeKey) -> bool {
        self.nodes.contains_key(&node)
    }

    fn foreign_is_element(&self, node: NodeKey) -> bool {
        self.foreign_views
            .iter()
            .any(|view| view.borrow().is_element_node(node))
    }

    fn is_element_node(&self, node: NodeKey) -> bool {
        matches!(
            self.nodes.get(&node).map(|entry| &entry.kind),
            Some(NodeKind::Element { .. })
        )
    }

    fn tag(&self, node: NodeKey) -> Option<&str> {
        match self.nodes.get(&node).map(|entry| &entry.kind) {
            Some(NodeKind::Element { tag }) => Some(tag),
            _ => None,
        }
    }

    fn attribute(&self, node: NodeKey, name: &str) -> Option<&str> {
        self.nodes.get(&node).and_then(|entry| {
            entry
                .attrs
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str())
        })
    }

    fn parent(&self, node: NodeKey) -> Option<NodeKey> {
        self.nodes.get(&node).and_then(|entry| entry.parent)
    }

    fn computed_style(&self, node: NodeKey) -> ComputedStyle {
        self.nodes
            .get(&node)
            .map(|entry| entry.style)
            .unwrap_or_default()
    }

    fn is_graphics_element(&self, node: NodeKey) -> bool {
        self.nodes.get(&node).is_some_and(|entry| {
            entry.namespace == Namespace::Svg && matches!(entry.kind, NodeKind::Element { .. })
        })
    }

    fn owner_graphics_root(&self, node: NodeKey) -> Option<NodeKey> {
        let mut current = self.parent(node);
        while let Some(key) = current {
            if self.tag(key) == Some("svg") {
                return Some(key);
            }
            current = self.parent(key);
        }
        None
    }

    fn bounding_box(&self, node: NodeKey) -> Rect {
        self.nodes
            .get(&node)
            .and_then(|entry| entry.bounding_box)
            .unwrap_or_default()
    }

    fn offset_size(&self, node: NodeKey) -> (f64, f64) {
        let metrics = self.metrics(node);
        (metrics.offset_width, metrics.offset_height)
    }

    fn client_size(&self, node: NodeKey) -> (f64, f64) {
        let metrics = self.metrics(node);
        (metrics.client_width, metrics.client_height)
    }

    fn client_rect_count(&self, node: NodeKey) -> usize {
        self.metrics(node).client_rect_count
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio
    }

    fn legacy_border_box_quirk(&self) -> bool {
        self.legacy_border_box_quirk
    }
}

impl Document {
    fn metrics(&self, node: NodeKey) -> ElementMetrics {
        self.nodes
            .get(&node)
            .map(|entry| entry.metrics)
            .unwrap_or_default()
    }
}
