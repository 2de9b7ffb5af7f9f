//! Host adapters backed by the bevy window.
//!
//! The placement core runs inside a bevy system but only ever sees these
//! handles. Systems copy what winit reports into the shared slots before the
//! core runs, and copy the core's requested position back out afterwards.

use std::{
    cell::RefCell,
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    rc::Rc,
};

use bevy::math::{IVec2, Rect, Vec2};
use bevy::winit::WinitWindows;
use bevy::prelude::Entity;

use perch::{
    config::Insets,
    geometry::rect_at,
    host::{DisplayHost, DisplayInfo, WindowHost},
};

#[derive(Debug, Default)]
struct WindowSlot {
    bounds: Option<Rect>,
    pending: Option<IVec2>,
}

/// The avatar window as the core sees it.
#[derive(Clone, Debug, Default)]
pub struct ShellWindow(Rc<RefCell<WindowSlot>>);

impl ShellWindow {
    /// Record what winit knows about the window. The position is only taken
    /// the first time; after that the core owns it.
    pub fn sync(&self, bounds: Option<Rect>) {
        let mut slot = self.0.borrow_mut();
        slot.bounds = match (slot.bounds, bounds) {
            (Some(known), Some(fresh)) => Some(rect_at(known.min, fresh.size())),
            (_, fresh) => fresh,
        };
    }

    pub fn is_known(&self) -> bool {
        self.0.borrow().bounds.is_some()
    }

    /// Position requested since the last call, if any.
    pub fn take_pending(&self) -> Option<IVec2> {
        self.0.borrow_mut().pending.take()
    }
}

impl WindowHost for ShellWindow {
    fn character_bounds(&self) -> Option<Rect> {
        self.0.borrow().bounds
    }

    fn set_character_position(&mut self, pos: IVec2) -> bool {
        let mut slot = self.0.borrow_mut();
        let Some(bounds) = slot.bounds else {
            return false;
        };
        slot.bounds = Some(rect_at(pos.as_vec2(), bounds.size()));
        slot.pending = Some(pos);
        true
    }
}

/// Monitor list mirrored from winit, primary first.
#[derive(Clone, Debug, Default)]
pub struct ShellDisplays(Rc<RefCell<Vec<DisplayInfo>>>);

impl ShellDisplays {
    /// Replace the mirrored list. Returns true if it differs from before.
    pub fn replace(&self, displays: Vec<DisplayInfo>) -> bool {
        let mut current = self.0.borrow_mut();
        if *current == displays {
            return false;
        }
        *current = displays;
        true
    }
}

impl DisplayHost for ShellDisplays {
    fn primary_display(&self) -> Option<DisplayInfo> {
        self.0.borrow().first().copied()
    }

    fn all_displays(&self) -> Vec<DisplayInfo> {
        self.0.borrow().clone()
    }
}

/// Outer bounds of the avatar window in physical pixels.
pub fn window_bounds(winit: &WinitWindows, entity: Entity) -> Option<Rect> {
    let raw = winit.get_window(entity)?;
    let pos = raw.outer_position().ok()?;
    let size = raw.inner_size();
    Some(rect_at(
        Vec2::new(pos.x as f32, pos.y as f32),
        Vec2::new(size.width as f32, size.height as f32),
    ))
}

/// Every monitor winit reports, primary first. Winit has no notion of a
/// work area, so the configured insets are taken off the primary display.
pub fn monitor_displays(winit: &WinitWindows, entity: Entity, insets: &Insets) -> Vec<DisplayInfo> {
    let Some(raw) = winit.get_window(entity) else {
        return Vec::new();
    };
    let primary = raw.primary_monitor();

    let mut displays: Vec<(bool, DisplayInfo)> = raw
        .available_monitors()
        .map(|mon| {
            let pos = mon.position();
            let size = mon.size();
            let bounds = rect_at(
                Vec2::new(pos.x as f32, pos.y as f32),
                Vec2::new(size.width as f32, size.height as f32),
            );
            let is_primary = primary.as_ref() == Some(&mon);
            let work_area = if is_primary { insets.shrink(bounds) } else { bounds };

            let mut hasher = DefaultHasher::new();
            mon.name().hash(&mut hasher);
            (pos.x, pos.y).hash(&mut hasher);

            (
                is_primary,
                DisplayInfo {
                    id: hasher.finish(),
                    bounds,
                    work_area,
                },
            )
        })
        .collect();
    displays.sort_by_key(|(is_primary, _)| !is_primary);
    displays.into_iter().map(|(_, d)| d).collect()
}
