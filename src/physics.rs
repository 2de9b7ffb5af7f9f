//! Gravity, bouncing and sitting for the floating avatar.
//!
//! Units are pixels and 60Hz frames: an `update(1.0)` advances one nominal
//! frame, velocities are pixels per frame. The simulator owns the only copy
//! of [`AvatarPhysicsState`]; everything else reads snapshots or issues the
//! discrete commands (`jump`, `push`, `teleport`, `drop`).
//!
//! Per frame, in order:
//! 1. gravity (skipped while sitting)
//! 2. friction on both axes
//! 3. integration
//! 4. landing on window top edges
//! 5. landing on a bottom taskbar
//! 6. work-area walls, ceiling and floor
//!
//! The rounded position is then pushed to the avatar window.

use bevy::log::debug;
use bevy::math::{IVec2, Rect, Vec2};
use rand::{rngs::SmallRng, Rng, SeedableRng};

use crate::{config::PhysicsConfig, geometry::ScreenGeometry, host::WindowHost};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SittingKind {
    Taskbar,
    Window,
    ScreenBottom,
}

/// The surface the avatar is resting on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SittingTarget {
    pub kind: SittingKind,
    pub rect: Option<Rect>,
    /// Set for [`SittingKind::Window`].
    pub window: Option<u64>,
}

impl SittingTarget {
    fn surface(kind: SittingKind, rect: Rect) -> Self {
        Self {
            kind,
            rect: Some(rect),
            window: None,
        }
    }
}

/// Position and motion of the avatar's top-left corner.
///
/// While `is_sitting` holds, `velocity.y` is zero and the avatar's bottom
/// edge lies exactly on the contact surface.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AvatarPhysicsState {
    pub position: Vec2,
    pub velocity: Vec2,
    pub is_sitting: bool,
    pub sitting_target: Option<SittingTarget>,
}

impl AvatarPhysicsState {
    pub fn motion(&self) -> Motion {
        if self.is_sitting {
            Motion::Sitting
        } else {
            Motion::Falling
        }
    }
}

/// Resting behavior. `Sitting` is only ever entered by settling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Motion {
    Falling,
    Sitting,
}

/// Top edge of a foreign window the avatar can land on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LandingSurface {
    pub window: u64,
    pub rect: Rect,
}

pub struct PhysicsSimulator {
    config: PhysicsConfig,
    state: AvatarPhysicsState,
    /// Used when the window reports no size.
    default_size: Vec2,
    geometry: ScreenGeometry,
    surfaces: Vec<LandingSurface>,
    window: Option<Box<dyn WindowHost>>,
    window_lost: bool,
    rng: SmallRng,
}

impl PhysicsSimulator {
    pub fn new(config: PhysicsConfig, geometry: ScreenGeometry, default_size: Vec2) -> Self {
        Self::with_rng(config, geometry, default_size, SmallRng::from_os_rng())
    }

    /// A simulator whose jump spread is reproducible.
    pub fn seeded(
        config: PhysicsConfig,
        geometry: ScreenGeometry,
        default_size: Vec2,
        seed: u64,
    ) -> Self {
        Self::with_rng(config, geometry, default_size, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(
        config: PhysicsConfig,
        geometry: ScreenGeometry,
        default_size: Vec2,
        rng: SmallRng,
    ) -> Self {
        Self {
            config,
            state: AvatarPhysicsState::default(),
            default_size,
            geometry,
            surfaces: Vec::new(),
            window: None,
            window_lost: false,
            rng,
        }
    }

    /// Attach the avatar window and adopt its current position.
    pub fn attach(&mut self, window: Box<dyn WindowHost>) {
        if let Some(bounds) = window.character_bounds() {
            self.state.position = bounds.min;
        }
        self.window = Some(window);
        self.window_lost = false;
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> AvatarPhysicsState {
        self.state
    }

    pub fn motion(&self) -> Motion {
        self.state.motion()
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// The position as reported to the window: whole pixels.
    pub fn rounded_position(&self) -> IVec2 {
        self.state.position.round().as_ivec2()
    }

    /// The avatar size, from the window when it knows it.
    pub fn avatar_size(&self) -> Vec2 {
        self.window
            .as_ref()
            .and_then(|w| w.character_bounds())
            .map(|b| b.size())
            .filter(|s| s.x > 0.0 && s.y > 0.0)
            .unwrap_or(self.default_size)
    }

    /// Replace the screen snapshot. A sitting avatar whose taskbar or floor
    /// moved starts falling again.
    pub fn set_geometry(&mut self, geometry: ScreenGeometry) {
        if geometry == self.geometry {
            return;
        }
        let support_moved = match self.state.sitting_target.map(|t| t.kind) {
            Some(SittingKind::Taskbar) => {
                geometry.bottom_taskbar().map(|t| t.rect) != self.geometry.bottom_taskbar().map(|t| t.rect)
            }
            Some(SittingKind::ScreenBottom) => {
                geometry.work_area.max.y != self.geometry.work_area.max.y
                    || geometry.bottom_taskbar().is_some()
            }
            _ => false,
        };
        self.geometry = geometry;
        if support_moved {
            debug!("sitting surface moved with the display, falling");
            self.lose_support();
        }
    }

    /// Replace the window edges the avatar can land on. An avatar sitting on
    /// a window that vanished or moved starts falling again.
    pub fn set_landing_surfaces(&mut self, surfaces: Vec<LandingSurface>) {
        if let Some(SittingTarget {
            kind: SittingKind::Window,
            window: Some(id),
            rect,
        }) = self.state.sitting_target
        {
            let still_there = surfaces
                .iter()
                .any(|s| s.window == id && Some(s.rect) == rect);
            if !still_there {
                debug!("window {id} under the avatar is gone, falling");
                self.lose_support();
            }
        }
        self.surfaces = surfaces;
    }

    fn lose_support(&mut self) {
        self.state.is_sitting = false;
        self.state.sitting_target = None;
    }

    /// Whether the avatar window is still around.
    pub fn has_window(&self) -> bool {
        self.window
            .as_ref()
            .is_some_and(|w| w.character_bounds().is_some())
    }

    /// Advance by `delta` nominal frames and move the window.
    ///
    /// `delta` is clamped to `[0, max_delta]`. Returns false when the window
    /// is missing; state is then left untouched for the next frame.
    pub fn update(&mut self, delta: f32) -> bool {
        if !self.has_window() {
            if !self.window_lost {
                debug!("avatar window unavailable, skipping physics");
                self.window_lost = true;
            }
            return false;
        }
        self.window_lost = false;

        let delta = if delta.is_finite() {
            delta.clamp(0.0, self.config.max_delta)
        } else {
            0.0
        };
        if delta > 0.0 {
            let size = self.avatar_size();
            self.step(delta, size);
        }
        self.apply()
    }

    fn step(&mut self, delta: f32, size: Vec2) {
        let prev_bottom = self.state.position.y + size.y;

        if !self.state.is_sitting {
            self.state.velocity.y += self.config.gravity * delta;
        }
        self.state.velocity *= self.config.friction.powf(delta);
        self.state.position += self.state.velocity * delta;

        self.check_window_support(size);
        self.collide_surfaces(prev_bottom, size);
        self.collide_taskbar(size);
        self.collide_bounds(size);
    }

    /// A seat on a window only holds while the avatar's centre is over it.
    fn check_window_support(&mut self, size: Vec2) {
        let Some(SittingTarget {
            kind: SittingKind::Window,
            rect: Some(seat),
            window,
        }) = self.state.sitting_target
        else {
            return;
        };
        let center = self.state.position.x + size.x / 2.0;
        if center < seat.min.x || center > seat.max.x {
            debug!("avatar slid off window {window:?}, falling");
            self.lose_support();
        }
    }

    fn collide_surfaces(&mut self, prev_bottom: f32, size: Vec2) {
        if self.state.velocity.y < 0.0 {
            return;
        }
        let bottom = self.state.position.y + size.y;
        let center = self.state.position.x + size.x / 2.0;
        let hit = self
            .surfaces
            .iter()
            .filter(|s| center >= s.rect.min.x && center <= s.rect.max.x)
            .filter(|s| prev_bottom <= s.rect.min.y && bottom >= s.rect.min.y)
            .min_by(|a, b| a.rect.min.y.total_cmp(&b.rect.min.y))
            .copied();
        if let Some(surface) = hit {
            let target = SittingTarget {
                kind: SittingKind::Window,
                rect: Some(surface.rect),
                window: Some(surface.window),
            };
            self.land(surface.rect.min.y, size, target);
        }
    }

    fn collide_taskbar(&mut self, size: Vec2) {
        let Some(taskbar) = self.geometry.bottom_taskbar() else {
            return;
        };
        if self.state.is_sitting
            && self.state.sitting_target.map(|t| t.kind) == Some(SittingKind::Window)
        {
            return;
        }
        let top = taskbar.rect.min.y;
        if self.state.position.y + size.y >= top {
            self.land(
                top,
                size,
                SittingTarget::surface(SittingKind::Taskbar, taskbar.rect),
            );
        }
    }

    /// Clamp onto a surface at `surface_y`, bounce, and settle once slow.
    fn land(&mut self, surface_y: f32, size: Vec2, target: SittingTarget) {
        let st = &mut self.state;
        st.position.y = surface_y - size.y;
        st.velocity.y *= -self.config.restitution;
        if st.velocity.y.abs() < self.config.settle_speed {
            st.velocity.y = 0.0;
            if !st.is_sitting {
                debug!("settled on {:?}", target.kind);
            }
            st.is_sitting = true;
            st.sitting_target = Some(target);
        }
    }

    fn collide_bounds(&mut self, size: Vec2) {
        let work = self.geometry.work_area;
        let bounce = -self.config.restitution;
        let has_floor = self.geometry.bottom_taskbar().is_none();
        let st = &mut self.state;

        if st.position.x < work.min.x {
            st.position.x = work.min.x;
            st.velocity.x *= bounce;
        }
        if st.position.x + size.x > work.max.x {
            st.position.x = work.max.x - size.x;
            st.velocity.x *= bounce;
        }
        if st.position.y < work.min.y {
            st.position.y = work.min.y;
            st.velocity.y *= bounce;
        }
        if has_floor && st.position.y + size.y > work.max.y {
            st.position.y = work.max.y - size.y;
            // No bounce: a sitting avatar never carries vertical velocity.
            st.velocity.y = 0.0;
            if !st.is_sitting {
                debug!("settled on screen bottom");
            }
            st.is_sitting = true;
            st.sitting_target = Some(SittingTarget {
                kind: SittingKind::ScreenBottom,
                rect: None,
                window: None,
            });
        }
    }

    fn apply(&mut self) -> bool {
        let pos = self.rounded_position();
        let moved = self
            .window
            .as_mut()
            .is_some_and(|w| w.set_character_position(pos));
        if !moved {
            self.window_lost = true;
        }
        moved
    }

    /// Leap upward with `force` (config default when `None`) and a random
    /// sideways drift.
    pub fn jump(&mut self, force: Option<f32>) -> bool {
        if !self.has_window() {
            return false;
        }
        let force = force.unwrap_or(self.config.jump_force);
        let spread = self.config.jump_spread;
        self.lose_support();
        self.state.velocity.y = -force;
        self.state.velocity.x = if spread > 0.0 {
            self.rng.random_range(-spread..=spread)
        } else {
            0.0
        };
        true
    }

    /// Add to the current velocity.
    pub fn push(&mut self, dx: f32, dy: f32) -> bool {
        if !self.has_window() {
            return false;
        }
        self.lose_support();
        self.state.velocity += Vec2::new(dx, dy);
        true
    }

    /// Move straight to `pos` and come to rest in mid-air.
    pub fn teleport(&mut self, pos: Vec2) -> bool {
        if !self.has_window() {
            return false;
        }
        self.lose_support();
        self.state.position = pos;
        self.state.velocity = Vec2::ZERO;
        true
    }

    /// Let go of the current seat; gravity takes over on the next frame.
    pub fn drop(&mut self) -> bool {
        if !self.has_window() {
            return false;
        }
        self.lose_support();
        self.state.velocity.y = 0.0;
        true
    }

    /// Release the window and reset all motion.
    pub fn dispose(&mut self) {
        self.window = None;
        self.surfaces.clear();
        self.state = AvatarPhysicsState::default();
    }
}
