//! Runtime configuration, read from a TOML file.
//!
//! Every section and field has a default, so an empty file (or no file at
//! all) gives the stock behavior:
//!
//! ```toml
//! [physics]
//! gravity = 0.5
//! friction = 0.95
//!
//! [placement]
//! motion = "drop"
//!
//! [tracker]
//! poll_interval_ms = 2000
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use bevy::math::{Rect, Vec2};
use serde::Deserialize;

use crate::{Error, Result};

/// Integrator constants. Velocities are in pixels per 60Hz frame.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration, pixels per frame squared.
    pub gravity: f32,
    /// Velocity retained per frame.
    pub friction: f32,
    /// Fraction of velocity reflected on a bounce.
    pub restitution: f32,
    /// Vertical speed below which a bounce turns into sitting.
    pub settle_speed: f32,
    /// Default upward impulse for a jump.
    pub jump_force: f32,
    /// Jumps add a random horizontal velocity in `[-spread, spread]`.
    pub jump_spread: f32,
    /// Largest frame delta a single update will integrate.
    pub max_delta: f32,
    /// Length of one nominal frame in milliseconds.
    pub frame_ms: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 0.5,
            friction: 0.95,
            restitution: 0.3,
            settle_speed: 1.0,
            jump_force: 15.0,
            jump_spread: 2.5,
            max_delta: 3.0,
            frame_ms: 16.67,
        }
    }
}

/// How a placement decision is handed to the simulator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacementMotion {
    /// Put the avatar exactly on the chosen spot.
    Teleport,
    /// Put the avatar above the chosen spot and let gravity land it.
    #[default]
    Drop,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    pub motion: PlacementMotion,
    /// Height above the target a dropped avatar starts from.
    pub drop_height: f32,
    /// Narrowest window the avatar will sit on.
    pub min_window_width: f32,
    /// Consider window top edges as seats at all.
    pub sit_on_windows: bool,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            motion: PlacementMotion::Drop,
            drop_height: 120.0,
            min_window_width: 200.0,
            sit_on_windows: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub poll_interval_ms: u64,
    /// Synthesize a window list when the host cannot enumerate windows.
    /// Only meant for development.
    pub dev_fallback: bool,
}

impl TrackerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 2000,
            dev_fallback: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AvatarConfig {
    pub width: f32,
    pub height: f32,
    /// Image drawn in the avatar window, relative to the asset root.
    pub image: PathBuf,
}

impl AvatarConfig {
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            width: 200.0,
            height: 300.0,
            image: PathBuf::from("avatar.png"),
        }
    }
}

/// Space reserved by the desktop on each edge of the primary display.
///
/// Some windowing layers only report monitor bounds; these insets stand in
/// for the work area they cannot provide.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Insets {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl Insets {
    /// `bounds` minus the reserved edges, never inverted.
    pub fn shrink(&self, bounds: Rect) -> Rect {
        let min = bounds.min + Vec2::new(self.left, self.top);
        let max = (bounds.max - Vec2::new(self.right, self.bottom)).max(min);
        Rect { min, max }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub work_area_insets: Insets,
    /// Display size assumed when the platform reports none.
    pub fallback_width: f32,
    pub fallback_height: f32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            work_area_insets: Insets::default(),
            fallback_width: 1920.0,
            fallback_height: 1080.0,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PerchConfig {
    pub physics: PhysicsConfig,
    pub placement: PlacementConfig,
    pub tracker: TrackerConfig,
    pub avatar: AvatarConfig,
    pub display: DisplayConfig,
}

impl PerchConfig {
    /// Read and validate a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    /// Parse config text; `origin` is only used in error messages.
    pub fn parse(text: &str, origin: &Path) -> Result<Self> {
        let cfg: Self = toml::from_str(text).map_err(|source| Error::ConfigParse {
            path: origin.to_path_buf(),
            source,
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        let p = &self.physics;
        if !(0.0..=1.0).contains(&p.friction) {
            return Err(Error::ConfigValue {
                field: "physics.friction",
                reason: "must be within 0..=1",
            });
        }
        if !(0.0..1.0).contains(&p.restitution) {
            return Err(Error::ConfigValue {
                field: "physics.restitution",
                reason: "must be within 0..1",
            });
        }
        if p.max_delta <= 0.0 {
            return Err(Error::ConfigValue {
                field: "physics.max_delta",
                reason: "must be positive",
            });
        }
        if p.frame_ms <= 0.0 {
            return Err(Error::ConfigValue {
                field: "physics.frame_ms",
                reason: "must be positive",
            });
        }
        if self.tracker.poll_interval_ms == 0 {
            return Err(Error::ConfigValue {
                field: "tracker.poll_interval_ms",
                reason: "must be positive",
            });
        }
        if self.avatar.width <= 0.0 || self.avatar.height <= 0.0 {
            return Err(Error::ConfigValue {
                field: "avatar",
                reason: "size must be positive",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<PerchConfig> {
        PerchConfig::parse(text, Path::new("test.toml"))
    }

    #[test]
    fn empty_file_is_default() {
        assert_eq!(parse("").unwrap(), PerchConfig::default());
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let cfg = parse(
            r#"
            [physics]
            gravity = 0.8

            [placement]
            motion = "teleport"

            [display.work_area_insets]
            bottom = 48
            "#,
        )
        .unwrap();
        assert_eq!(cfg.physics.gravity, 0.8);
        assert_eq!(cfg.physics.friction, 0.95);
        assert_eq!(cfg.placement.motion, PlacementMotion::Teleport);
        assert_eq!(cfg.placement.drop_height, 120.0);
        assert_eq!(cfg.display.work_area_insets.bottom, 48.0);
        assert_eq!(cfg.tracker.poll_interval(), Duration::from_secs(2));
    }

    #[test]
    fn rejects_bouncy_restitution() {
        let err = parse("[physics]\nrestitution = 1.5\n").unwrap_err();
        assert!(matches!(
            err,
            Error::ConfigValue {
                field: "physics.restitution",
                ..
            }
        ));
    }

    #[test]
    fn reports_parse_errors_with_path() {
        let err = parse("[physics\n").unwrap_err();
        assert!(err.to_string().contains("test.toml"));
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = PerchConfig::load(Path::new("/nonexistent/perch.toml")).unwrap_err();
        assert!(matches!(err, Error::ConfigRead { .. }));
    }

    #[test]
    fn insets_shrink_bounds() {
        let insets = Insets {
            bottom: 40.0,
            left: 10.0,
            ..Insets::default()
        };
        let work = insets.shrink(Rect::new(0.0, 0.0, 1920.0, 1080.0));
        assert_eq!(work, Rect::new(10.0, 0.0, 1920.0, 1040.0));

        let huge = Insets {
            top: 900.0,
            bottom: 900.0,
            ..Insets::default()
        };
        let work = huge.shrink(Rect::new(0.0, 0.0, 100.0, 1000.0));
        assert_eq!(work.height(), 0.0);
    }
}
