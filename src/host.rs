//! Collaborators the placement core borrows from the hosting shell.
//!
//! None of these are guaranteed to work at runtime. A display host may have
//! nothing to report, the avatar window may be destroyed between two frames,
//! and foreign-window enumeration is simply missing on some platforms. The
//! core treats every one of those as an expected state.

use bevy::math::{IVec2, Rect};

use crate::{occlusion::CandidateWindow, Result};

/// One attached display as the platform reports it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayInfo {
    pub id: u64,
    pub bounds: Rect,
    pub work_area: Rect,
}

/// Platform display queries.
pub trait DisplayHost {
    /// The primary display, or `None` when the platform cannot answer.
    fn primary_display(&self) -> Option<DisplayInfo>;

    /// Every attached display, primary included.
    fn all_displays(&self) -> Vec<DisplayInfo>;
}

/// Handle to the window the avatar is drawn in.
pub trait WindowHost {
    /// Current outer bounds of the avatar window, `None` once it is gone.
    fn character_bounds(&self) -> Option<Rect>;

    /// Move the avatar window. Returns false if the window no longer exists.
    fn set_character_position(&mut self, pos: IVec2) -> bool;
}

/// Best-effort enumeration of other applications' windows.
pub trait WindowSource {
    /// Visible windows, front-most first.
    fn windows(&mut self) -> Result<Vec<CandidateWindow>>;
}
