//! Screen-space rectangles and taskbar inference.
//!
//! Coordinates are desktop pixels with y growing downward, the same space the
//! windowing system uses for window positions. Rectangles are
//! [`bevy::math::Rect`] values; the helpers here build and compare them in
//! the `x, y, width, height` terms display APIs report.

use std::fmt;

use bevy::math::{Rect, Vec2};

/// Build a rect from its top-left corner and size.
pub fn rect(x: f32, y: f32, width: f32, height: f32) -> Rect {
    Rect::from_corners(Vec2::new(x, y), Vec2::new(x + width, y + height))
}

/// Build a rect from a top-left position and a size vector.
pub fn rect_at(pos: Vec2, size: Vec2) -> Rect {
    rect(pos.x, pos.y, size.x, size.y)
}

/// True when `inner` lies entirely inside `outer` (edges may touch).
pub fn contains_rect(outer: Rect, inner: Rect) -> bool {
    inner.min.x >= outer.min.x
        && inner.min.y >= outer.min.y
        && inner.max.x <= outer.max.x
        && inner.max.y <= outer.max.y
}

/// True when the two rects share a region of positive area.
pub fn overlaps(a: Rect, b: Rect) -> bool {
    a.min.x < b.max.x && a.max.x > b.min.x && a.min.y < b.max.y && a.max.y > b.min.y
}

/// Screen edge a taskbar is docked to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaskbarEdge {
    Top,
    Bottom,
    Left,
    Right,
}

impl TaskbarEdge {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for TaskbarEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The reserved strip between a display's full bounds and its work area.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TaskbarInfo {
    pub edge: TaskbarEdge,
    pub rect: Rect,
}

/// Snapshot of the primary display layout.
///
/// Snapshots are replaced wholesale when the display changes, never edited.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenGeometry {
    pub full_bounds: Rect,
    pub work_area: Rect,
    pub taskbar: Option<TaskbarInfo>,
}

impl ScreenGeometry {
    /// Geometry for a display, with the taskbar inferred from the two rects.
    pub fn new(full_bounds: Rect, work_area: Rect) -> Self {
        Self {
            full_bounds,
            work_area,
            taskbar: detect_taskbar(full_bounds, work_area),
        }
    }

    /// Geometry with no reserved area at all.
    pub fn uniform(bounds: Rect) -> Self {
        Self {
            full_bounds: bounds,
            work_area: bounds,
            taskbar: None,
        }
    }

    /// The taskbar, but only when it is docked to the bottom edge.
    pub fn bottom_taskbar(&self) -> Option<TaskbarInfo> {
        self.taskbar.filter(|t| t.edge == TaskbarEdge::Bottom)
    }
}

/// Infer where the taskbar sits by comparing the edges of the full bounds
/// with those of the work area.
///
/// Edges are checked top, bottom, left, right and the first nonzero delta
/// wins. Setups with several reserved strips (multiple bars, docks) only
/// report the first; callers rely on this order, so it is kept as is.
pub fn detect_taskbar(full: Rect, work: Rect) -> Option<TaskbarInfo> {
    let full_w = full.width();
    let full_h = full.height();

    if work.min.y > full.min.y {
        return Some(TaskbarInfo {
            edge: TaskbarEdge::Top,
            rect: rect(full.min.x, full.min.y, full_w, work.min.y - full.min.y),
        });
    }
    if work.max.y < full.max.y {
        return Some(TaskbarInfo {
            edge: TaskbarEdge::Bottom,
            rect: rect(full.min.x, work.max.y, full_w, full.max.y - work.max.y),
        });
    }
    if work.min.x > full.min.x {
        return Some(TaskbarInfo {
            edge: TaskbarEdge::Left,
            rect: rect(full.min.x, full.min.y, work.min.x - full.min.x, full_h),
        });
    }
    if work.max.x < full.max.x {
        return Some(TaskbarInfo {
            edge: TaskbarEdge::Right,
            rect: rect(work.max.x, full.min.y, full.max.x - work.max.x, full_h),
        });
    }
    None
}
