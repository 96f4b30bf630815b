use dom_host::{HostDocument, NodeKey};

/// True for elements in the graphics namespace that can answer bounding-box
/// queries.
pub fn is_svg<D: HostDocument + ?Sized>(doc: &D, target: NodeKey) -> bool {
    doc.is_graphics_element(target)
}

/// Whether the element currently has no rendered box.
///
/// Graphics elements are hidden when their intrinsic bounding box is empty;
/// ordinary elements when offset width, offset height and the client-rect
/// count are all zero.
pub fn is_hidden<D: HostDocument + ?Sized>(doc: &D, target: NodeKey) -> bool {
    if is_svg(doc, target) {
        let bounding_box = doc.bounding_box(target);
        return bounding_box.width == 0.0 && bounding_box.height == 0.0;
    }
    let (offset_width, offset_height) = doc.offset_size(target);
    offset_width == 0.0 && offset_height == 0.0 && doc.client_rect_count(target) == 0
}

/// Whether the key refers to an element node, accepting elements owned by a
/// foreign document view (another realm) registered with the host.
pub fn is_element<D: HostDocument + ?Sized>(doc: &D, value: NodeKey) -> bool {
    if doc.owns(value) {
        return doc.is_element_node(value);
    }
    doc.foreign_is_element(value)
}

/// Whether the element is replaced content (media, embedded content, canvas,
/// images, image-typed form inputs, iframes).
pub fn is_replaced_element<D: HostDocument + ?Sized>(doc: &D, target: NodeKey) -> bool {
    match doc.tag(target) {
        Some("input") => doc
            .attribute(target, "type")
            .is_some_and(|value| value.eq_ignore_ascii_case("image")),
        Some("video" | "audio" | "embed" | "object" | "canvas" | "iframe" | "img") => true,
        _ => false,
    }
}
