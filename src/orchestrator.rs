//! The control loop tying displays, windows, planning and physics together.
//!
//! Two loops run at different cadences on the host's scheduler:
//!
//! - the physics loop, one step per displayed frame, with the delta taken
//!   from the wall clock;
//! - the window poll, on a fixed interval, refreshing the window edges the
//!   avatar can land on.
//!
//! Placement itself only runs on demand: at startup, when asked to find a
//! seat, and after a display change.

use std::time::{Duration, Instant};

use bevy::log::{debug, info};
use bevy::math::Vec2;

use crate::{
    config::{PerchConfig, PlacementConfig, PlacementMotion},
    geometry::{rect, ScreenGeometry, TaskbarInfo},
    host::{DisplayHost, WindowHost, WindowSource},
    occlusion::WindowOcclusionTracker,
    physics::{AvatarPhysicsState, LandingSurface, Motion, PhysicsSimulator},
    planner::{PlacementDecision, PlacementOptions, PlacementPlanner},
    scheduler::{FrameScheduler, FrameToken, TimerToken, Wake},
    screen::ScreenGeometryProvider,
};

/// Everything the orchestrator borrows from the shell.
pub struct Hosts {
    pub window: Box<dyn WindowHost>,
    pub displays: Option<Box<dyn DisplayHost>>,
    /// Missing on platforms that cannot list other windows.
    pub windows: Option<Box<dyn WindowSource>>,
    pub scheduler: Box<dyn FrameScheduler>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Created,
    Running,
    Paused,
    Disposed,
}

/// Read-only view of the orchestrator for UIs and diagnostics.
#[derive(Clone, Debug, PartialEq)]
pub struct OrchestratorStatus {
    pub state: AvatarPhysicsState,
    pub motion: Motion,
    pub geometry: ScreenGeometry,
    pub taskbar: Option<TaskbarInfo>,
    pub tracked_windows: usize,
    pub frames: u64,
    pub last_decision: Option<PlacementDecision>,
    pub running: bool,
}

pub struct PlacementOrchestrator {
    screens: ScreenGeometryProvider,
    planner: PlacementPlanner,
    physics: PhysicsSimulator,
    tracker: WindowOcclusionTracker,
    scheduler: Box<dyn FrameScheduler>,
    placement: PlacementConfig,
    poll_interval: Duration,
    frame_ms: f32,
    geometry: ScreenGeometry,
    phase: Phase,
    pending_frame: Option<FrameToken>,
    poll_timer: Option<TimerToken>,
    last_frame: Option<Instant>,
    frames: u64,
    last_decision: Option<PlacementDecision>,
}

impl PlacementOrchestrator {
    pub fn new(config: &PerchConfig, hosts: Hosts) -> Self {
        Self::build(config, hosts, None)
    }

    /// Like [`new`](Self::new) with a fixed seed for jump randomness.
    pub fn seeded(config: &PerchConfig, hosts: Hosts, seed: u64) -> Self {
        Self::build(config, hosts, Some(seed))
    }

    fn build(config: &PerchConfig, hosts: Hosts, seed: Option<u64>) -> Self {
        let fallback = rect(
            0.0,
            0.0,
            config.display.fallback_width,
            config.display.fallback_height,
        );
        let mut screens = ScreenGeometryProvider::new(hosts.displays, fallback);
        let geometry = screens.geometry();
        let size = config.avatar.size();

        let mut physics = match seed {
            Some(seed) => PhysicsSimulator::seeded(config.physics.clone(), geometry, size, seed),
            None => PhysicsSimulator::new(config.physics.clone(), geometry, size),
        };
        physics.attach(hosts.window);

        Self {
            screens,
            planner: PlacementPlanner::new(&config.placement),
            physics,
            tracker: WindowOcclusionTracker::new(
                hosts.windows,
                config.tracker.dev_fallback,
                geometry.work_area,
            ),
            scheduler: hosts.scheduler,
            placement: config.placement.clone(),
            poll_interval: config.tracker.poll_interval(),
            frame_ms: config.physics.frame_ms,
            geometry,
            phase: Phase::Created,
            pending_frame: None,
            poll_timer: None,
            last_frame: None,
            frames: 0,
            last_decision: None,
        }
    }

    /// Start both loops and seat the avatar.
    pub fn initialize(&mut self, now: Instant) {
        if self.phase != Phase::Created {
            return;
        }
        self.phase = Phase::Running;
        self.last_frame = Some(now);
        self.poll_timer = Some(self.scheduler.start_interval(self.poll_interval));
        self.pending_frame = Some(self.scheduler.request_frame());
        info!(
            "placement started, polling windows every {:?}",
            self.poll_interval
        );
        self.find_seat();
    }

    /// Route a scheduler wake-up. Returns false if it was ignored.
    pub fn dispatch(&mut self, wake: Wake, now: Instant) -> bool {
        match wake {
            Wake::Frame(token) => self.on_frame(token, now),
            Wake::Interval(token) => self.on_poll(token),
        }
    }

    /// One physics step. Stale or cancelled tokens are ignored.
    pub fn on_frame(&mut self, token: FrameToken, now: Instant) -> bool {
        if self.phase != Phase::Running || self.pending_frame != Some(token) {
            return false;
        }
        let delta = match self.last_frame {
            Some(last) => now.saturating_duration_since(last).as_secs_f32() * 1000.0 / self.frame_ms,
            None => 1.0,
        };
        self.last_frame = Some(now);

        self.physics.update(delta);
        self.frames += 1;
        self.pending_frame = Some(self.scheduler.request_frame());
        true
    }

    /// One window poll. Stale or cancelled tokens are ignored.
    pub fn on_poll(&mut self, token: TimerToken) -> bool {
        if self.phase == Phase::Disposed || self.poll_timer != Some(token) {
            return false;
        }
        self.poll_windows();
        true
    }

    fn poll_windows(&mut self) {
        let min_width = self.placement.min_window_width;
        let surfaces = if self.placement.sit_on_windows {
            self.tracker
                .refresh()
                .iter()
                .filter(|w| w.is_seatable(min_width))
                .map(|w| LandingSurface {
                    window: w.id,
                    rect: w.bounds,
                })
                .collect()
        } else {
            self.tracker.refresh();
            Vec::new()
        };
        self.physics.set_landing_surfaces(surfaces);
    }

    fn refresh_geometry(&mut self) {
        self.geometry = self.screens.geometry();
        self.physics.set_geometry(self.geometry);
        self.tracker.set_viewport(self.geometry.work_area);
    }

    /// Run the placement loop: look at the screen and the windows, pick a
    /// seat and move the avatar toward it.
    pub fn find_seat(&mut self) -> Option<PlacementDecision> {
        if self.phase == Phase::Disposed {
            return None;
        }
        self.refresh_geometry();
        self.poll_windows();

        let size = self.physics.avatar_size();
        let decision = self
            .planner
            .find_best_position(size, &self.geometry, self.tracker.windows());

        let moved = match self.placement.motion {
            PlacementMotion::Teleport => self.physics.teleport(decision.position()),
            PlacementMotion::Drop => {
                let start_y = (decision.y - self.placement.drop_height).max(self.geometry.work_area.min.y);
                self.physics.teleport(Vec2::new(decision.x, start_y)) && self.physics.drop()
            }
        };
        if !moved {
            debug!("no avatar window, placement skipped");
            return None;
        }
        info!(
            "placing avatar: {:?} at ({}, {})",
            decision.kind, decision.x, decision.y
        );
        self.last_decision = Some(decision);
        Some(decision)
    }

    /// The display layout changed: forget cached geometry and re-seat.
    pub fn display_changed(&mut self) -> Option<PlacementDecision> {
        if self.phase == Phase::Disposed {
            return None;
        }
        self.tracker.invalidate();
        self.find_seat()
    }

    /// Pause or resume the physics loop without tearing anything down.
    pub fn set_enabled(&mut self, enabled: bool) {
        match (self.phase, enabled) {
            (Phase::Running, false) => {
                if let Some(token) = self.pending_frame.take() {
                    self.scheduler.cancel_frame(token);
                }
                self.phase = Phase::Paused;
                debug!("physics paused");
            }
            (Phase::Paused, true) => {
                self.phase = Phase::Running;
                self.last_frame = None;
                self.pending_frame = Some(self.scheduler.request_frame());
                debug!("physics resumed");
            }
            _ => {}
        }
    }

    /// Stop both loops and release the avatar window. No frame or poll
    /// callback has any effect afterwards.
    pub fn dispose(&mut self) {
        if self.phase == Phase::Disposed {
            return;
        }
        if let Some(token) = self.pending_frame.take() {
            self.scheduler.cancel_frame(token);
        }
        if let Some(token) = self.poll_timer.take() {
            self.scheduler.cancel_interval(token);
        }
        self.physics.dispose();
        self.phase = Phase::Disposed;
        info!("placement disposed after {} frames", self.frames);
    }

    pub fn jump(&mut self, force: Option<f32>) -> bool {
        self.physics.jump(force)
    }

    pub fn push(&mut self, dx: f32, dy: f32) -> bool {
        self.physics.push(dx, dy)
    }

    pub fn teleport(&mut self, pos: Vec2) -> bool {
        self.physics.teleport(pos)
    }

    pub fn drop(&mut self) -> bool {
        self.physics.drop()
    }

    pub fn placement_options(&self) -> PlacementOptions {
        self.planner.placement_options(
            self.physics.avatar_size(),
            &self.geometry,
            self.tracker.windows(),
        )
    }

    pub fn is_valid_position(&self, pos: Vec2) -> bool {
        self.planner
            .is_valid_position(pos, self.physics.avatar_size(), &self.geometry)
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn status(&mut self) -> OrchestratorStatus {
        let state = self.physics.state();
        OrchestratorStatus {
            state,
            motion: state.motion(),
            geometry: self.geometry,
            taskbar: self.tracker.taskbar(&mut self.screens),
            tracked_windows: self.tracker.windows().len(),
            frames: self.frames,
            last_decision: self.last_decision,
            running: self.is_running(),
        }
    }
}
