//! In-memory hosts for the test suite.
//!
//! Each fake is a cheap handle over shared state, so a test can keep one
//! clone to inspect or mutate while the component under test owns another.

use std::{cell::RefCell, rc::Rc};

use bevy::math::{IVec2, Rect, Vec2};

use crate::{
    geometry::rect,
    host::{DisplayHost, DisplayInfo, WindowHost, WindowSource},
    occlusion::CandidateWindow,
    Result,
};

#[derive(Debug, Default)]
struct WindowState {
    bounds: Option<Rect>,
    moves: Vec<IVec2>,
}

/// Avatar window that records every move.
#[derive(Clone, Debug, Default)]
pub struct FakeWindow(Rc<RefCell<WindowState>>);

impl FakeWindow {
    pub fn new(bounds: Rect) -> Self {
        Self(Rc::new(RefCell::new(WindowState {
            bounds: Some(bounds),
            moves: Vec::new(),
        })))
    }

    /// A window at `pos` with the given avatar size.
    pub fn at(pos: Vec2, size: Vec2) -> Self {
        Self::new(rect(pos.x, pos.y, size.x, size.y))
    }

    /// Simulate the window being closed.
    pub fn destroy(&self) {
        self.0.borrow_mut().bounds = None;
    }

    pub fn restore(&self, bounds: Rect) {
        self.0.borrow_mut().bounds = Some(bounds);
    }

    pub fn moves(&self) -> Vec<IVec2> {
        self.0.borrow().moves.clone()
    }

    pub fn last_move(&self) -> Option<IVec2> {
        self.0.borrow().moves.last().copied()
    }
}

impl WindowHost for FakeWindow {
    fn character_bounds(&self) -> Option<Rect> {
        self.0.borrow().bounds
    }

    fn set_character_position(&mut self, pos: IVec2) -> bool {
        let mut state = self.0.borrow_mut();
        let Some(bounds) = state.bounds else {
            return false;
        };
        let size = bounds.size();
        state.bounds = Some(rect(pos.x as f32, pos.y as f32, size.x, size.y));
        state.moves.push(pos);
        true
    }
}

/// Display host whose layout a test can swap at any time.
#[derive(Clone, Debug, Default)]
pub struct FakeDisplays(Rc<RefCell<Vec<DisplayInfo>>>);

impl FakeDisplays {
    /// A single primary display.
    pub fn single(bounds: Rect, work_area: Rect) -> Self {
        let displays = Self::default();
        displays.set(vec![DisplayInfo {
            id: 1,
            bounds,
            work_area,
        }]);
        displays
    }

    pub fn set(&self, displays: Vec<DisplayInfo>) {
        *self.0.borrow_mut() = displays;
    }
}

impl DisplayHost for FakeDisplays {
    fn primary_display(&self) -> Option<DisplayInfo> {
        self.0.borrow().first().copied()
    }

    fn all_displays(&self) -> Vec<DisplayInfo> {
        self.0.borrow().clone()
    }
}

/// Window source returning whatever list the test last set.
#[derive(Clone, Debug, Default)]
pub struct FakeWindowList(Rc<RefCell<Vec<CandidateWindow>>>);

impl FakeWindowList {
    pub fn set(&self, windows: Vec<CandidateWindow>) {
        *self.0.borrow_mut() = windows;
    }
}

impl WindowSource for FakeWindowList {
    fn windows(&mut self) -> Result<Vec<CandidateWindow>> {
        Ok(self.0.borrow().clone())
    }
}

/// A plain visible window for fixtures.
pub fn candidate(id: u64, bounds: Rect) -> CandidateWindow {
    CandidateWindow {
        id,
        title: format!("window {id}"),
        bounds,
        is_minimized: false,
    }
}
