//! Physics world capability consumed by the tools and the game loop.
//!
//! The tools never see the physics engine directly: they talk to a [`World`],
//! which creates bodies and joints, answers spatial queries, steps the
//! simulation and renders itself onto a [`Surface`]. [`RapierWorld`] is the
//! production implementation; tests substitute a recording mock.
//!
//! All points passed into a `World` are device pixels unless a method says
//! otherwise. Body positions are in meters, in a y-up world frame.

pub mod rapier;
pub mod snapshot;

#[cfg(test)]
pub(crate) mod mock;

pub use rapier::RapierWorld;

use crate::draw::Surface;
use crate::util::Point;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Opaque reference to a body owned by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyHandle(pub u64);

/// Opaque reference to a joint owned by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JointHandle(pub u64);

impl fmt::Display for BodyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "body#{}", self.0)
    }
}

impl fmt::Display for JointHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "joint#{}", self.0)
    }
}

/// Body creation options shared by every shape constructor.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BodyOptions {
    pub dynamic: bool,
    pub density: f64,
    pub restitution: f64,
    pub friction: f64,
}

impl Default for BodyOptions {
    fn default() -> Self {
        Self {
            dynamic: true,
            density: 1.0,
            restitution: 0.16,
            friction: 0.5,
        }
    }
}

/// Errors reported by a [`World`] implementation.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("unknown {0}")]
    UnknownBody(BodyHandle),

    #[error("failed to access snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed snapshot: {0}")]
    Format(#[from] serde_json::Error),

    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u32),
}

/// The physics-engine collaborator.
///
/// Implementations own every body and joint; handles are only valid until the
/// corresponding object is destroyed or the world is reloaded.
pub trait World {
    fn add_circle(
        &mut self,
        center: Point,
        radius: f64,
        options: BodyOptions,
    ) -> Result<BodyHandle, WorldError>;

    fn add_rect(
        &mut self,
        center: Point,
        half_width: f64,
        half_height: f64,
        options: BodyOptions,
    ) -> Result<BodyHandle, WorldError>;

    fn add_convex_polygon(
        &mut self,
        vertices: &[Point],
        options: BodyOptions,
    ) -> Result<BodyHandle, WorldError>;

    /// Arbitrary (possibly concave) outline; a repeated closing vertex is allowed.
    fn add_complex_polygon(
        &mut self,
        vertices: &[Point],
        options: BodyOptions,
    ) -> Result<BodyHandle, WorldError>;

    /// Two-body distance joint anchored at the two click points.
    fn add_distance_joint(
        &mut self,
        body_a: BodyHandle,
        body_b: BodyHandle,
        anchor_a: Point,
        anchor_b: Point,
    ) -> Result<JointHandle, WorldError>;

    /// Pins `body` to the static world at `anchor`.
    fn add_pin_joint(&mut self, body: BodyHandle, anchor: Point)
    -> Result<JointHandle, WorldError>;

    /// Pins `body` to the static world at `anchor` and drives it with a motor.
    fn add_motor_joint(
        &mut self,
        body: BodyHandle,
        anchor: Point,
    ) -> Result<JointHandle, WorldError>;

    /// Bodies whose shape contains `point`, topmost (most recently created) first.
    fn bodies_at_point(&self, point: Point, include_static: bool) -> Vec<BodyHandle>;

    /// Joints attached to `body`.
    fn joints_of(&self, body: BodyHandle) -> Vec<JointHandle>;

    fn contains_body(&self, body: BodyHandle) -> bool;

    fn destroy_body(&mut self, body: BodyHandle);

    fn destroy_joint(&mut self, joint: JointHandle);

    /// Attaches the single pointer joint used to drag `body` while running.
    fn attach_pointer_joint(&mut self, body: BodyHandle, point: Point);

    fn move_pointer_joint(&mut self, point: Point);

    /// Removes the pointer joint if one exists.
    fn remove_pointer_joint(&mut self);

    /// Converts a pixel point into the y-up world frame, still in pixel units.
    fn to_world(&self, pixel: Point) -> Point;

    fn pixels_per_meter(&self) -> f64;

    /// Body origin in meters.
    fn body_position(&self, body: BodyHandle) -> Option<Point>;

    /// Teleports the body origin (meters) without going through the solver.
    fn set_body_position(&mut self, body: BodyHandle, position: Point);

    fn angular_velocity(&self, body: BodyHandle) -> Option<f64>;

    fn moment_of_inertia(&self, body: BodyHandle) -> Option<f64>;

    /// Applies a torque for the next step only.
    fn apply_torque(&mut self, body: BodyHandle, torque: f64);

    /// Advances the simulation by one fixed step.
    fn step(&mut self);

    fn render(&self, surface: &mut dyn Surface);

    fn save(&mut self, path: &Path) -> Result<(), WorldError>;

    fn load(&mut self, path: &Path) -> Result<(), WorldError>;
}
