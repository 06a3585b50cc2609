//! Roll-motor annotations.
//!
//! A roll motor is not a physics joint: before every step the dispatcher
//! pushes each annotated body towards its target angular velocity with
//! `torque = strength * (target - current) * inertia`.

use crate::world::{BodyHandle, World};
use log::debug;
use std::collections::BTreeMap;

/// Per-body roll parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RollMotor {
    /// Target angular velocity in rad/s, y-up world frame (negative is clockwise).
    pub target_velocity: f64,
    pub strength: f64,
}

impl Default for RollMotor {
    fn default() -> Self {
        Self {
            target_velocity: -10.0,
            strength: 40.0,
        }
    }
}

impl RollMotor {
    /// Corrective torque for a body spinning at `current` with the given inertia.
    pub fn torque(&self, current: f64, inertia: f64) -> f64 {
        self.strength * (self.target_velocity - current) * inertia
    }
}

/// Roll-motor annotations keyed by body.
#[derive(Debug, Clone, Default)]
pub struct RollMotors {
    motors: BTreeMap<BodyHandle, RollMotor>,
}

impl RollMotors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Annotates `body`, replacing any previous annotation.
    pub fn attach(&mut self, body: BodyHandle, motor: RollMotor) {
        self.motors.insert(body, motor);
    }

    pub fn remove(&mut self, body: BodyHandle) -> Option<RollMotor> {
        self.motors.remove(&body)
    }

    pub fn get(&self, body: BodyHandle) -> Option<&RollMotor> {
        self.motors.get(&body)
    }

    pub fn contains(&self, body: BodyHandle) -> bool {
        self.motors.contains_key(&body)
    }

    pub fn len(&self) -> usize {
        self.motors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.motors.is_empty()
    }

    pub fn clear(&mut self) {
        self.motors.clear();
    }

    /// Drops annotations of destroyed bodies, then applies every motor torque.
    ///
    /// Returns the number of bodies that received a torque.
    pub fn apply(&mut self, world: &mut dyn World) -> usize {
        let before = self.motors.len();
        self.motors.retain(|body, _| world.contains_body(*body));
        if self.motors.len() != before {
            debug!(
                "Pruned {} roll motor(s) of destroyed bodies",
                before - self.motors.len()
            );
        }

        let mut applied = 0;
        for (body, motor) in &self.motors {
            let (Some(current), Some(inertia)) =
                (world.angular_velocity(*body), world.moment_of_inertia(*body))
            else {
                continue;
            };
            world.apply_torque(*body, motor.torque(current, inertia));
            applied += 1;
        }
        applied
    }
}
