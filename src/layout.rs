// ── Geometry ──────────────────────────────────────────────────────────────────
//
// DPI scaling and the arithmetic behind window placement.  The Win32 layer
// converts `RECT` to and from `Rect` and applies the results; nothing here
// talks to the OS.

/// Pixel measurements in this crate are defined at this DPI.
pub(crate) const BASE_DPI: u32 = 96;

/// Font sizes are specified in points, which are 1/72 inch.
const POINTS_PER_INCH: u32 = 72;

/// Scale a pixel value defined at 96 DPI to `dpi`, saturating at the `i32`
/// range.
pub(crate) fn scale(px: i32, dpi: u32) -> i32 {
    saturate(i64::from(px) * i64::from(dpi) / i64::from(BASE_DPI))
}

/// Pixel height of a font of `size` points at `dpi`.
pub(crate) fn font_height(size: i32, dpi: u32) -> i32 {
    saturate(i64::from(size) * i64::from(dpi) / i64::from(POINTS_PER_INCH))
}

fn saturate(v: i64) -> i32 {
    i32::try_from(v).unwrap_or(if v < 0 { i32::MIN } else { i32::MAX })
}

// ── Rect ──────────────────────────────────────────────────────────────────────

/// Edges of a rectangle, same convention as Win32 `RECT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Rect {
    pub(crate) left: i32,
    pub(crate) top: i32,
    pub(crate) right: i32,
    pub(crate) bottom: i32,
}

impl Rect {
    pub(crate) fn from_size(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            right: left.saturating_add(width),
            bottom: top.saturating_add(height),
        }
    }

    pub(crate) fn width(&self) -> i32 {
        self.right.saturating_sub(self.left)
    }

    pub(crate) fn height(&self) -> i32 {
        self.bottom.saturating_sub(self.top)
    }
}

// ── Sub-control layout ────────────────────────────────────────────────────────

/// Where the two child controls go inside the client area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Layout {
    pub(crate) content: Rect,
    pub(crate) status: Rect,
}

/// Text region on top, a `status_height` strip along the bottom.
///
/// When the client area is shorter than the strip the text region collapses
/// to zero height rather than going negative.
pub(crate) fn layout_subcontrols(client: Rect, status_height: i32) -> Layout {
    let width = client.width();
    let height = client.height();
    Layout {
        content: Rect::from_size(0, 0, width, height.saturating_sub(status_height).max(0)),
        status: Rect::from_size(0, height.saturating_sub(status_height), width, status_height),
    }
}

// ── Sizing ────────────────────────────────────────────────────────────────────

/// Grow a proposed window rectangle (WM_SIZING) to at least the minimum size,
/// keeping its top-left corner where it is.
pub(crate) fn clamp_to_min(proposed: Rect, min_width: i32, min_height: i32) -> Rect {
    Rect::from_size(
        proposed.left,
        proposed.top,
        proposed.width().max(min_width),
        proposed.height().max(min_height),
    )
}

/// Move `window` to the middle of `work_area`.
///
/// Along an axis where the window is as large as or larger than the work area,
/// the window keeps its current position.
pub(crate) fn center_in(window: Rect, work_area: Rect) -> Rect {
    let mut left = window.left;
    let mut top = window.top;

    let middle_x = half_slack(work_area.width(), window.width());
    if middle_x > 0 {
        left = work_area.left.saturating_add(middle_x);
    }
    let middle_y = half_slack(work_area.height(), window.height());
    if middle_y > 0 {
        top = work_area.top.saturating_add(middle_y);
    }

    Rect::from_size(left, top, window.width(), window.height())
}

fn half_slack(outer: i32, inner: i32) -> i32 {
    outer.saturating_abs().saturating_sub(inner.saturating_abs()) / 2
}

// ── Tests ─────────────────────────────────────────────────────────────────────
