use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use dom_host::{BoxSizing, Edges, HostDocument, NodeKey};

use crate::element_state::{is_hidden, is_svg};

/// One box size as an (inline, block) pair in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoxSize {
    pub inline_size: f64,
    pub block_size: f64,
}

impl BoxSize {
    /// Build a size pair from physical width/height, swapping axes in
    /// vertical writing modes.
    #[must_use]
    const fn from_physical(width: f64, height: f64, switch_sizes: bool) -> Self {
        if switch_sizes {
            Self {
                inline_size: height,
                block_size: width,
            }
        } else {
            Self {
                inline_size: width,
                block_size: height,
            }
        }
    }
}

/// The content rectangle: content size positioned at the padding origin.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContentRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Which box of an element an observer asked to watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObservedBox {
    #[default]
    ContentBox,
    BorderBox,
    DevicePixelContentBox,
}

impl ObservedBox {
    /// Parse an observed-box keyword; any unrecognised value falls back to
    /// `content-box`.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword {
            "border-box" => Self::BorderBox,
            "device-pixel-content-box" => Self::DevicePixelContentBox,
            _ => Self::ContentBox,
        }
    }
}

/// Immutable snapshot of every standardized box metric of an element.
///
/// Instances are shared behind `Rc` and never mutated after construction, so
/// callers may retain them across ticks without defensive copying.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoxSizes {
    pub device_pixel_content_box_size: BoxSize,
    pub border_box_size: BoxSize,
    pub content_box_size: BoxSize,
    pub content_rect: ContentRect,
}

/// Per-element memo of the last computed [`BoxSizes`].
///
/// An ownership-free side table: keys hold no reference to the node, so a
/// cached entry never keeps an element alive. Invalidation is entirely
/// caller-driven, either per call (`force_recalculation`) or by eviction when
/// the element leaves the tree.
pub struct BoxSizeCache {
    entries: RefCell<HashMap<NodeKey, Rc<BoxSizes>>>,
    /// Canonical all-zero collection shared by every hidden element.
    zero: Rc<BoxSizes>,
}

impl Default for BoxSizeCache {
    fn default() -> Self {
        Self::new()
    }
}

impl BoxSizeCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
            zero: Rc::new(BoxSizes::default()),
        }
    }

    /// Drop the cached collection for one element.
    pub fn evict(&self, target: NodeKey) {
        self.entries.borrow_mut().remove(&target);
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

/// Compute every box size of an element the way a native observer would.
///
/// Hidden elements yield the shared zero collection. Graphics elements with
/// an owning `svg` root are measured through their bounding box with padding
/// and border treated as zero. Negative computed dimensions pass through
/// unclamped, matching native behaviour.
pub fn calculate_box_sizes<D: HostDocument + ?Sized>(
    doc: &D,
    cache: &BoxSizeCache,
    target: NodeKey,
    force_recalculation: bool,
) -> Rc<BoxSizes> {
    if !force_recalculation {
        if let Some(cached) = cache.entries.borrow().get(&target) {
            log::trace!("box size cache hit for {target:?}");
            return Rc::clone(cached);
        }
    }

    if is_hidden(doc, target) {
        let zero = Rc::clone(&cache.zero);
        cache.entries.borrow_mut().insert(target, Rc::clone(&zero));
        return zero;
    }

    let style = doc.computed_style(target);

    // Graphics elements below an svg root are measured via their bounding
    // box instead of CSS box metrics.
    let svg_box = (is_svg(doc, target) && doc.owner_graphics_root(target).is_some())
        .then(|| doc.bounding_box(target));

    // Legacy engines already exclude padding from width/height under
    // border-box sizing, so it must not be subtracted a second time.
    let remove_padding =
        !doc.legacy_border_box_quirk() && style.box_sizing == BoxSizing::BorderBox;

    let switch_sizes = style.writing_mode.swaps_axes();

    let can_scroll_vertically = svg_box.is_none() && style.overflow_y.can_scroll();
    let can_scroll_horizontally = svg_box.is_none() && style.overflow_x.can_scroll();

    let padding = if svg_box.is_some() {
        Edges::default()
    } else {
        style.padding
    };
    let border = if svg_box.is_some() {
        Edges::default()
    } else {
        style.border
    };

    let horizontal_padding = padding.horizontal();
    let vertical_padding = padding.vertical();
    let horizontal_border_area = border.horizontal();
    let vertical_border_area = border.vertical();

    let (offset_width, offset_height) = doc.offset_size(target);
    let (client_width, client_height) = doc.client_size(target);

    // Thickness is named for the axis it reduces: a vertical scrollbar eats
    // content width, a horizontal one eats content height.
    let horizontal_scrollbar_thickness = if can_scroll_horizontally {
        offset_height - vertical_border_area - client_height
    } else {
        0.0
    };
    let vertical_scrollbar_thickness = if can_scroll_vertically {
        offset_width - horizontal_border_area - client_width
    } else {
        0.0
    };

    let width_reduction = if remove_padding {
        horizontal_padding + horizontal_border_area
    } else {
        0.0
    };
    let height_reduction = if remove_padding {
        vertical_padding + vertical_border_area
    } else {
        0.0
    };

    let (content_width, content_height) = match svg_box {
        Some(bounding_box) => (bounding_box.width, bounding_box.height),
        None => (
            style.width - width_reduction - vertical_scrollbar_thickness,
            style.height - height_reduction - horizontal_scrollbar_thickness,
        ),
    };

    let border_box_width =
        content_width + horizontal_padding + vertical_scrollbar_thickness + horizontal_border_area;
    let border_box_height =
        content_height + vertical_padding + horizontal_scrollbar_thickness + vertical_border_area;

    let ratio = doc.device_pixel_ratio();

    let boxes = Rc::new(BoxSizes {
        device_pixel_content_box_size: BoxSize::from_physical(
            round_half_up(content_width * ratio),
            round_half_up(content_height * ratio),
            switch_sizes,
        ),
        border_box_size: BoxSize::from_physical(border_box_width, border_box_height, switch_sizes),
        content_box_size: BoxSize::from_physical(content_width, content_height, switch_sizes),
        content_rect: ContentRect {
            x: padding.left,
            y: padding.top,
            width: content_width,
            height: content_height,
        },
    });

    cache.entries.borrow_mut().insert(target, Rc::clone(&boxes));

    boxes
}

/// Half values round toward positive infinity, as hosts round device pixels.
/// `f64::round` ties away from zero instead, which differs for negative
/// halves (unclamped dimensions can be negative).
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Compute the one box size an observer asked for.
pub fn calculate_box_size<D: HostDocument + ?Sized>(
    doc: &D,
    cache: &BoxSizeCache,
    target: NodeKey,
    observed_box: ObservedBox,
    force_recalculation: bool,
) -> BoxSize {
    let boxes = calculate_box_sizes(doc, cache, target, force_recalculation);
    match observed_box {
        ObservedBox::DevicePixelContentBox => boxes.device_pixel_content_box_size,
        ObservedBox::BorderBox => boxes.border_box_size,
        ObservedBox::ContentBox => boxes.content_box_size,
    }
}
