//! Display layout queries.

use bevy::log::{debug, info};
use bevy::math::Rect;

use crate::{
    geometry::ScreenGeometry,
    host::{DisplayHost, DisplayInfo},
};

/// Reads the primary display from the host and turns it into a
/// [`ScreenGeometry`] snapshot.
///
/// Without a host, or when the host has nothing to say, the fallback bounds
/// are used as both full bounds and work area.
pub struct ScreenGeometryProvider {
    host: Option<Box<dyn DisplayHost>>,
    fallback: Rect,
    last: Option<ScreenGeometry>,
}

impl ScreenGeometryProvider {
    pub fn new(host: Option<Box<dyn DisplayHost>>, fallback: Rect) -> Self {
        Self {
            host,
            fallback,
            last: None,
        }
    }

    /// Current geometry of the primary display.
    pub fn geometry(&mut self) -> ScreenGeometry {
        let geometry = match self.host.as_ref().and_then(|h| h.primary_display()) {
            Some(display) => ScreenGeometry::new(display.bounds, display.work_area),
            None => ScreenGeometry::uniform(self.fallback),
        };
        if self.last != Some(geometry) {
            info!(
                "display geometry: bounds={:?} work_area={:?}",
                geometry.full_bounds, geometry.work_area
            );
            match geometry.taskbar {
                Some(tb) => debug!("taskbar on {} edge at {:?}", tb.edge, tb.rect),
                None => debug!("no taskbar reserved"),
            }
            self.last = Some(geometry);
        }
        geometry
    }

    /// Every attached display. Falls back to a single synthetic display.
    pub fn displays(&self) -> Vec<DisplayInfo> {
        let displays = self
            .host
            .as_ref()
            .map(|h| h.all_displays())
            .unwrap_or_default();
        if displays.is_empty() {
            vec![DisplayInfo {
                id: 0,
                bounds: self.fallback,
                work_area: self.fallback,
            }]
        } else {
            displays
        }
    }

    /// Replace the bounds used when the host has no answer.
    pub fn set_fallback(&mut self, fallback: Rect) {
        self.fallback = fallback;
    }
}
