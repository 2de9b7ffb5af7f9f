//! Placement and physics for a floating desktop companion.
//!
//! The avatar lives in its own borderless window. This crate decides where
//! that window goes: it infers the taskbar from the display layout, picks a
//! seat (a window edge, the taskbar, or a corner), and runs a small gravity
//! simulation that lets the avatar fall, bounce, and sit.
//!
//! Everything platform specific sits behind the traits in [`host`]; the
//! frame loop is driven by a host-supplied [`scheduler::FrameScheduler`].

pub mod config;
pub mod error;
pub mod geometry;
pub mod host;
pub mod occlusion;
pub mod orchestrator;
pub mod physics;
pub mod planner;
pub mod scheduler;
pub mod screen;
pub mod test_support;

pub use config::PerchConfig;
pub use error::{Error, Result};
pub use geometry::{ScreenGeometry, TaskbarEdge, TaskbarInfo};
pub use occlusion::{CandidateWindow, WindowOcclusionTracker};
pub use orchestrator::{Hosts, OrchestratorStatus, PlacementOrchestrator};
pub use physics::{AvatarPhysicsState, Motion, PhysicsSimulator, SittingKind, SittingTarget};
pub use planner::{PlacementDecision, PlacementKind, PlacementPlanner};
pub use scheduler::{FrameScheduler, QueuedScheduler, Wake};
pub use screen::ScreenGeometryProvider;
