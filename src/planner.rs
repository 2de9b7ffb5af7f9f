//! Choosing a resting spot for the avatar.
//!
//! Seats are tried in a fixed order: the top edge of a foreign window, then
//! a bottom taskbar, then the bottom-left corner of the work area.

use bevy::math::{Rect, Vec2};

use crate::{
    config::PlacementConfig,
    geometry::{contains_rect, rect_at, ScreenGeometry},
    occlusion::CandidateWindow,
};

/// Gap between a taskbar seat and the right edge of the work area.
pub const TASKBAR_MARGIN: f32 = 50.0;
/// Inset of the corner positions from the work-area edges.
pub const CORNER_PADDING: f32 = 20.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlacementKind {
    Window,
    Taskbar,
    Corner,
    Center,
}

/// Where the avatar's top-left corner should go.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementDecision {
    pub x: f32,
    pub y: f32,
    pub kind: PlacementKind,
    /// The window sat on, for [`PlacementKind::Window`].
    pub window: Option<u64>,
}

impl PlacementDecision {
    fn at(pos: Vec2, kind: PlacementKind) -> Self {
        Self {
            x: pos.x,
            y: pos.y,
            kind,
            window: None,
        }
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Every placement a picker UI can offer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementOptions {
    pub corners: [(Corner, Vec2); 4],
    pub center: Vec2,
    /// What [`PlacementPlanner::find_best_position`] would pick.
    pub best: PlacementDecision,
}

impl PlacementOptions {
    pub fn corner(&self, which: Corner) -> Vec2 {
        self.corners
            .iter()
            .find(|(c, _)| *c == which)
            .map(|(_, pos)| *pos)
            .unwrap_or(self.center)
    }
}

/// Pure placement rules over a geometry snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacementPlanner {
    min_window_width: f32,
    sit_on_windows: bool,
}

impl Default for PlacementPlanner {
    fn default() -> Self {
        Self::new(&PlacementConfig::default())
    }
}

impl PlacementPlanner {
    pub fn new(cfg: &PlacementConfig) -> Self {
        Self {
            min_window_width: cfg.min_window_width,
            sit_on_windows: cfg.sit_on_windows,
        }
    }

    /// Pick the single best resting position for an avatar of `size`.
    pub fn find_best_position(
        &self,
        size: Vec2,
        geometry: &ScreenGeometry,
        candidates: &[CandidateWindow],
    ) -> PlacementDecision {
        let work = geometry.work_area;

        if self.sit_on_windows {
            if let Some(seat) = candidates
                .iter()
                .find_map(|w| self.window_seat(w, size, work))
            {
                return seat;
            }
        }

        if let Some(taskbar) = geometry.bottom_taskbar() {
            return PlacementDecision::at(
                Vec2::new(
                    work.max.x - size.x - TASKBAR_MARGIN,
                    taskbar.rect.min.y - size.y,
                ),
                PlacementKind::Taskbar,
            );
        }

        PlacementDecision::at(
            Vec2::new(
                work.min.x + CORNER_PADDING,
                work.max.y - size.y - CORNER_PADDING,
            ),
            PlacementKind::Corner,
        )
    }

    fn window_seat(&self, w: &CandidateWindow, size: Vec2, work: Rect) -> Option<PlacementDecision> {
        if !w.is_seatable(self.min_window_width) {
            return None;
        }
        let top = w.bounds.min.y;
        if top - size.y < work.min.y || top > work.max.y {
            return None;
        }
        let x = (w.bounds.center().x - size.x / 2.0)
            .min(work.max.x - size.x)
            .max(work.min.x);
        // The clamp may push the avatar's centre past the edge it would land on.
        let center = x + size.x / 2.0;
        if center < w.bounds.min.x || center > w.bounds.max.x {
            return None;
        }
        Some(PlacementDecision {
            window: Some(w.id),
            ..PlacementDecision::at(Vec2::new(x, top - size.y), PlacementKind::Window)
        })
    }

    /// The four padded corners, the center, and the best decision.
    pub fn placement_options(
        &self,
        size: Vec2,
        geometry: &ScreenGeometry,
        candidates: &[CandidateWindow],
    ) -> PlacementOptions {
        let work = geometry.work_area;
        let left = work.min.x + CORNER_PADDING;
        let right = work.max.x - size.x - CORNER_PADDING;
        let top = work.min.y + CORNER_PADDING;
        let bottom = work.max.y - size.y - CORNER_PADDING;

        PlacementOptions {
            corners: [
                (Corner::TopLeft, Vec2::new(left, top)),
                (Corner::TopRight, Vec2::new(right, top)),
                (Corner::BottomLeft, Vec2::new(left, bottom)),
                (Corner::BottomRight, Vec2::new(right, bottom)),
            ],
            center: work.min + (work.size() - size) / 2.0,
            best: self.find_best_position(size, geometry, candidates),
        }
    }

    /// True iff the whole avatar rectangle fits inside the work area.
    pub fn is_valid_position(&self, pos: Vec2, size: Vec2, geometry: &ScreenGeometry) -> bool {
        contains_rect(geometry.work_area, rect_at(pos, size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::rect;

    const AVATAR: Vec2 = Vec2::new(200.0, 300.0);

    fn taskbar_screen() -> ScreenGeometry {
        ScreenGeometry::new(rect(0.0, 0.0, 1920.0, 1080.0), rect(0.0, 0.0, 1920.0, 1040.0))
    }

    fn bare_screen() -> ScreenGeometry {
        ScreenGeometry::uniform(rect(0.0, 0.0, 1920.0, 1080.0))
    }

    fn window(id: u64, bounds: Rect) -> CandidateWindow {
        CandidateWindow {
            id,
            title: String::new(),
            bounds,
            is_minimized: false,
        }
    }

    #[test]
    fn sits_on_bottom_taskbar() {
        let d = PlacementPlanner::default().find_best_position(AVATAR, &taskbar_screen(), &[]);
        assert_eq!(d.kind, PlacementKind::Taskbar);
        assert_eq!((d.x, d.y), (1670.0, 740.0));
    }

    #[test]
    fn corner_without_taskbar() {
        let d = PlacementPlanner::default().find_best_position(AVATAR, &bare_screen(), &[]);
        assert_eq!(d.kind, PlacementKind::Corner);
        assert_eq!((d.x, d.y), (20.0, 1080.0 - 300.0 - 20.0));
    }

    #[test]
    fn side_taskbar_falls_back_to_corner() {
        let g = ScreenGeometry::new(rect(0.0, 0.0, 1920.0, 1080.0), rect(64.0, 0.0, 1856.0, 1080.0));
        let d = PlacementPlanner::default().find_best_position(AVATAR, &g, &[]);
        assert_eq!(d.kind, PlacementKind::Corner);
        assert_eq!(d.x, 84.0);
    }

    #[test]
    fn window_top_beats_taskbar() {
        let windows = [window(9, rect(400.0, 500.0, 800.0, 400.0))];
        let d = PlacementPlanner::default().find_best_position(AVATAR, &taskbar_screen(), &windows);
        assert_eq!(d.kind, PlacementKind::Window);
        assert_eq!(d.window, Some(9));
        assert_eq!((d.x, d.y), (700.0, 200.0));
    }

    #[test]
    fn skips_unusable_windows() {
        let mut minimized = window(1, rect(400.0, 500.0, 800.0, 400.0));
        minimized.is_minimized = true;
        let narrow = window(2, rect(400.0, 500.0, 120.0, 400.0));
        let too_high = window(3, rect(400.0, 100.0, 800.0, 400.0));
        let d = PlacementPlanner::default().find_best_position(
            AVATAR,
            &taskbar_screen(),
            &[minimized, narrow, too_high],
        );
        assert_eq!(d.kind, PlacementKind::Taskbar);
    }

    #[test]
    fn window_seat_is_clamped_into_work_area() {
        let windows = [window(4, rect(1700.0, 600.0, 400.0, 300.0))];
        let d = PlacementPlanner::default().find_best_position(AVATAR, &bare_screen(), &windows);
        assert_eq!(d.x, 1720.0);
    }

    #[test]
    fn skips_window_hanging_off_screen() {
        let windows = [window(6, rect(-150.0, 500.0, 200.0, 400.0))];
        let d = PlacementPlanner::default().find_best_position(AVATAR, &taskbar_screen(), &windows);
        assert_eq!(d.kind, PlacementKind::Taskbar);
        assert_eq!(d.window, None);
    }

    #[test]
    fn window_sitting_can_be_disabled() {
        let planner = PlacementPlanner::new(&PlacementConfig {
            sit_on_windows: false,
            ..PlacementConfig::default()
        });
        let windows = [window(9, rect(400.0, 500.0, 800.0, 400.0))];
        let d = planner.find_best_position(AVATAR, &taskbar_screen(), &windows);
        assert_eq!(d.kind, PlacementKind::Taskbar);
    }

    #[test]
    fn options_cover_corners_and_center() {
        let planner = PlacementPlanner::default();
        let opts = planner.placement_options(AVATAR, &taskbar_screen(), &[]);
        assert_eq!(opts.corner(Corner::TopLeft), Vec2::new(20.0, 20.0));
        assert_eq!(opts.corner(Corner::TopRight), Vec2::new(1700.0, 20.0));
        assert_eq!(opts.corner(Corner::BottomLeft), Vec2::new(20.0, 720.0));
        assert_eq!(opts.corner(Corner::BottomRight), Vec2::new(1700.0, 720.0));
        assert_eq!(opts.center, Vec2::new(860.0, 370.0));
        assert_eq!(opts.best.kind, PlacementKind::Taskbar);
        for (_, pos) in opts.corners {
            assert!(planner.is_valid_position(pos, AVATAR, &taskbar_screen()));
        }
    }

    #[test]
    fn validity_is_work_area_containment() {
        let planner = PlacementPlanner::default();
        let g = taskbar_screen();
        assert!(planner.is_valid_position(Vec2::new(0.0, 740.0), AVATAR, &g));
        assert!(!planner.is_valid_position(Vec2::new(0.0, 741.0), AVATAR, &g));
        assert!(!planner.is_valid_position(Vec2::new(-1.0, 0.0), AVATAR, &g));
        assert!(!planner.is_valid_position(Vec2::new(1721.0, 0.0), AVATAR, &g));
    }
}
