use crate::geometry::Edges;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoxSizing {
    #[default]
    ContentBox,
    BorderBox,
}

impl BoxSizing {
    /// Parse a `box-sizing` keyword, defaulting to `content-box`.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword {
            "border-box" => Self::BorderBox,
            _ => Self::ContentBox,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WritingMode {
    #[default]
    HorizontalTb,
    VerticalRl,
    VerticalLr,
    SidewaysRl,
    SidewaysLr,
}

impl WritingMode {
    /// Parse a `writing-mode` keyword, including the legacy `tb`-prefixed
    /// aliases, defaulting to `horizontal-tb`.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword {
            "vertical-rl" | "tb" | "tb-rl" => Self::VerticalRl,
            "vertical-lr" | "tb-lr" => Self::VerticalLr,
            "sideways-rl" => Self::SidewaysRl,
            "sideways-lr" => Self::SidewaysLr,
            _ => Self::HorizontalTb,
        }
    }

    /// Whether inline and block axes are swapped relative to the default
    /// horizontal mode when reporting size pairs. Only the `vertical`/legacy
    /// `tb` family swaps; the `sideways` keywords are left alone, matching
    /// what native observers report.
    #[inline]
    #[must_use]
    pub const fn swaps_axes(self) -> bool {
        matches!(self, Self::VerticalRl | Self::VerticalLr)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
    Clip,
    Auto,
    Scroll,
}

impl Overflow {
    /// Parse an `overflow-x`/`overflow-y` keyword, defaulting to `visible`.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword {
            "hidden" => Self::Hidden,
            "clip" => Self::Clip,
            "auto" => Self::Auto,
            "scroll" => Self::Scroll,
            _ => Self::Visible,
        }
    }

    /// True for the values that can produce a scrollbar (`auto`, `scroll`).
    #[inline]
    #[must_use]
    pub const fn can_scroll(self) -> bool {
        matches!(self, Self::Auto | Self::Scroll)
    }
}

/// Resolved style snapshot for one element at a point in time.
///
/// The box calculator reads this once per computation. `width`/`height` are
/// the used values in CSS pixels as the host resolved them, still in whichever
/// sizing mode `box_sizing` declares.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ComputedStyle {
    pub box_sizing: BoxSizing,
    pub writing_mode: WritingMode,
    pub overflow_x: Overflow,
    pub overflow_y: Overflow,
    pub padding: Edges,
    pub border: Edges,
    pub width: f64,
    pub height: f64,
}
