//! Discovery of other windows the avatar could land on.

use bevy::log::{debug, warn};
use bevy::math::Rect;

use crate::{
    geometry::{overlaps, rect, TaskbarInfo},
    host::WindowSource,
    screen::ScreenGeometryProvider,
};

/// A foreign window as seen at one poll.
///
/// Snapshots are consumed by the planner right away and replaced on the
/// next poll; nothing holds on to them.
#[derive(Clone, Debug, PartialEq)]
pub struct CandidateWindow {
    pub id: u64,
    pub title: String,
    pub bounds: Rect,
    pub is_minimized: bool,
}

impl CandidateWindow {
    /// Whether the top edge of this window can carry an avatar.
    pub fn is_seatable(&self, min_width: f32) -> bool {
        !self.is_minimized && self.bounds.width() >= min_width
    }
}

/// Polls the host for foreign windows and caches the taskbar rectangle.
///
/// Enumeration is optional: without a [`WindowSource`] the tracker reports
/// no windows, or a fixed development list when `dev_fallback` is set.
pub struct WindowOcclusionTracker {
    source: Option<Box<dyn WindowSource>>,
    dev_fallback: bool,
    viewport: Rect,
    windows: Vec<CandidateWindow>,
    // Outer None means the cache is stale.
    taskbar: Option<Option<TaskbarInfo>>,
    warned: bool,
}

impl WindowOcclusionTracker {
    pub fn new(source: Option<Box<dyn WindowSource>>, dev_fallback: bool, viewport: Rect) -> Self {
        Self {
            source,
            dev_fallback,
            viewport,
            windows: Vec::new(),
            taskbar: None,
            warned: false,
        }
    }

    /// Take a fresh snapshot of foreign windows.
    pub fn refresh(&mut self) -> &[CandidateWindow] {
        let listed = match self.source.as_mut().map(|s| s.windows()) {
            Some(Ok(windows)) => Some(windows),
            Some(Err(e)) => {
                if !self.warned {
                    warn!("window enumeration unavailable: {e}");
                    self.warned = true;
                }
                None
            }
            None => None,
        };

        self.windows = match listed {
            Some(windows) => windows
                .into_iter()
                .filter(|w| w.bounds.width() > 0.0 && w.bounds.height() > 0.0)
                .collect(),
            None if self.dev_fallback => self.fallback_windows(),
            None => Vec::new(),
        };
        debug!("tracked {} windows", self.windows.len());
        &self.windows
    }

    /// The snapshot from the last refresh.
    pub fn windows(&self) -> &[CandidateWindow] {
        &self.windows
    }

    /// Last known taskbar, computed on first use and after [`invalidate`].
    ///
    /// [`invalidate`]: Self::invalidate
    pub fn taskbar(&mut self, screens: &mut ScreenGeometryProvider) -> Option<TaskbarInfo> {
        match self.taskbar {
            Some(cached) => cached,
            None => {
                let fresh = screens.geometry().taskbar;
                self.taskbar = Some(fresh);
                fresh
            }
        }
    }

    /// Forget the cached taskbar, e.g. after a display change.
    pub fn invalidate(&mut self) {
        self.taskbar = None;
    }

    /// Area the development window list is laid out in.
    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
    }

    /// True if `area` intersects any visible tracked window.
    pub fn is_overlapping(&self, area: Rect) -> bool {
        self.windows
            .iter()
            .any(|w| !w.is_minimized && overlaps(w.bounds, area))
    }

    fn fallback_windows(&self) -> Vec<CandidateWindow> {
        let w = self.viewport.width();
        let h = self.viewport.height();
        vec![
            CandidateWindow {
                id: 1,
                title: "Browser Window".into(),
                bounds: rect(100.0, 100.0, w * 0.6, h * 0.7),
                is_minimized: false,
            },
            CandidateWindow {
                id: 2,
                title: "Code Editor".into(),
                bounds: rect(w * 0.4, 50.0, w * 0.5, h * 0.8),
                is_minimized: false,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use super::*;
    use crate::{
        geometry::TaskbarEdge,
        host::{DisplayHost, DisplayInfo},
        Error, Result,
    };

    struct Listed(Vec<CandidateWindow>);

    impl WindowSource for Listed {
        fn windows(&mut self) -> Result<Vec<CandidateWindow>> {
            Ok(self.0.clone())
        }
    }

    struct Broken;

    impl WindowSource for Broken {
        fn windows(&mut self) -> Result<Vec<CandidateWindow>> {
            Err(Error::Enumeration("no accessibility access".into()))
        }
    }

    struct CountingDisplay(Rc<Cell<u32>>);

    impl DisplayHost for CountingDisplay {
        fn primary_display(&self) -> Option<DisplayInfo> {
            self.0.set(self.0.get() + 1);
            Some(DisplayInfo {
                id: 1,
                bounds: rect(0.0, 0.0, 1920.0, 1080.0),
                work_area: rect(0.0, 0.0, 1920.0, 1040.0),
            })
        }

        fn all_displays(&self) -> Vec<DisplayInfo> {
            self.primary_display().into_iter().collect()
        }
    }

    fn window(id: u64, bounds: Rect) -> CandidateWindow {
        CandidateWindow {
            id,
            title: format!("window {id}"),
            bounds,
            is_minimized: false,
        }
    }

    fn viewport() -> Rect {
        rect(0.0, 0.0, 1000.0, 800.0)
    }

    #[test]
    fn drops_zero_sized_windows() {
        let source = Listed(vec![
            window(1, rect(0.0, 0.0, 300.0, 200.0)),
            window(2, rect(10.0, 10.0, 0.0, 200.0)),
            window(3, rect(10.0, 10.0, 300.0, 0.0)),
        ]);
        let mut tracker = WindowOcclusionTracker::new(Some(Box::new(source)), false, viewport());
        let ids: Vec<u64> = tracker.refresh().iter().map(|w| w.id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn missing_source_is_empty_outside_dev() {
        let mut tracker = WindowOcclusionTracker::new(None, false, viewport());
        assert!(tracker.refresh().is_empty());
    }

    #[test]
    fn dev_fallback_is_deterministic() {
        let mut tracker = WindowOcclusionTracker::new(None, true, viewport());
        let first = tracker.refresh().to_vec();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].bounds, rect(100.0, 100.0, 600.0, 560.0));
        assert_eq!(first[1].bounds, rect(400.0, 50.0, 500.0, 640.0));
        assert_eq!(tracker.refresh(), first.as_slice());
    }

    #[test]
    fn failing_source_degrades() {
        let mut tracker = WindowOcclusionTracker::new(Some(Box::new(Broken)), false, viewport());
        assert!(tracker.refresh().is_empty());
        let mut dev = WindowOcclusionTracker::new(Some(Box::new(Broken)), true, viewport());
        assert_eq!(dev.refresh().len(), 2);
    }

    #[test]
    fn taskbar_is_cached_until_invalidated() {
        let calls = Rc::new(Cell::new(0));
        let mut screens = ScreenGeometryProvider::new(
            Some(Box::new(CountingDisplay(calls.clone()))),
            viewport(),
        );
        let mut tracker = WindowOcclusionTracker::new(None, false, viewport());

        let tb = tracker.taskbar(&mut screens).unwrap();
        assert_eq!(tb.edge, TaskbarEdge::Bottom);
        tracker.refresh();
        tracker.taskbar(&mut screens);
        assert_eq!(calls.get(), 1);

        tracker.invalidate();
        tracker.taskbar(&mut screens);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn overlap_ignores_minimized() {
        let mut minimized = window(2, rect(500.0, 500.0, 200.0, 200.0));
        minimized.is_minimized = true;
        let source = Listed(vec![window(1, rect(0.0, 0.0, 100.0, 100.0)), minimized]);
        let mut tracker = WindowOcclusionTracker::new(Some(Box::new(source)), false, viewport());
        tracker.refresh();
        assert!(tracker.is_overlapping(rect(50.0, 50.0, 10.0, 10.0)));
        assert!(!tracker.is_overlapping(rect(550.0, 550.0, 10.0, 10.0)));
    }
}
