//! Recording [`World`] used by tool and game tests.

use super::{BodyHandle, BodyOptions, JointHandle, World, WorldError};
use crate::draw::Surface;
use crate::util::{self, Point};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const MOCK_HEIGHT: f64 = 600.0;
pub const MOCK_PPM: f64 = 50.0;

#[derive(Debug, Clone, PartialEq)]
pub enum WorldCall {
    AddCircle { center: Point, radius: f64 },
    AddRect { center: Point, half_width: f64, half_height: f64 },
    AddConvex(Vec<Point>),
    AddComplex(Vec<Point>),
    DistanceJoint { a: BodyHandle, b: BodyHandle, anchor_a: Point, anchor_b: Point },
    PinJoint { body: BodyHandle, anchor: Point },
    MotorJoint { body: BodyHandle, anchor: Point },
    DestroyBody(BodyHandle),
    DestroyJoint(JointHandle),
    AttachPointer { body: BodyHandle, point: Point },
    MovePointer(Point),
    RemovePointer,
    SetPosition { body: BodyHandle, position: Point },
    ApplyTorque { body: BodyHandle, torque: f64 },
    Step,
    Save(PathBuf),
    Load(PathBuf),
}

/// Hit region and dynamic state of a mock body.
#[derive(Debug, Clone)]
pub struct MockBody {
    pub center: Point,
    pub radius: f64,
    pub dynamic: bool,
    pub position: Point,
    pub angular_velocity: f64,
    pub inertia: f64,
}

#[derive(Debug, Default)]
pub struct MockWorld {
    pub calls: Vec<WorldCall>,
    pub bodies: BTreeMap<BodyHandle, MockBody>,
    pub joints: BTreeMap<JointHandle, (BodyHandle, Option<BodyHandle>)>,
    pub fail_creation: bool,
    pub fail_io: bool,
    next_id: u64,
}

impl MockWorld {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Self::default()
        }
    }

    /// Places a circular hit region without recording a call.
    pub fn spawn(&mut self, center: Point, radius: f64) -> BodyHandle {
        let id = BodyHandle(self.allocate());
        let position = self.to_world(center).scaled(1.0 / MOCK_PPM);
        self.bodies.insert(
            id,
            MockBody {
                center,
                radius,
                dynamic: true,
                position,
                angular_velocity: 0.0,
                inertia: 1.0,
            },
        );
        id
    }

    pub fn spawn_static(&mut self, center: Point, radius: f64) -> BodyHandle {
        let id = self.spawn(center, radius);
        if let Some(body) = self.bodies.get_mut(&id) {
            body.dynamic = false;
        }
        id
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Calls other than stepping.
    pub fn edits(&self) -> Vec<&WorldCall> {
        self.calls
            .iter()
            .filter(|call| !matches!(call, WorldCall::Step))
            .collect()
    }

    pub fn count(&self, predicate: impl Fn(&WorldCall) -> bool) -> usize {
        self.calls.iter().filter(|call| predicate(call)).count()
    }

    fn allocate(&mut self) -> u64 {
        self.next_id = self.next_id.max(1);
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn create(
        &mut self,
        call: WorldCall,
        center: Point,
        radius: f64,
        options: BodyOptions,
    ) -> Result<BodyHandle, WorldError> {
        self.calls.push(call);
        if self.fail_creation {
            return Err(WorldError::InvalidGeometry("mock refused".to_string()));
        }
        let id = self.spawn(center, radius);
        if let Some(body) = self.bodies.get_mut(&id) {
            body.dynamic = options.dynamic;
        }
        Ok(id)
    }

    fn join(
        &mut self,
        call: WorldCall,
        a: BodyHandle,
        b: Option<BodyHandle>,
    ) -> Result<JointHandle, WorldError> {
        self.calls.push(call);
        if !self.bodies.contains_key(&a) {
            return Err(WorldError::UnknownBody(a));
        }
        let id = JointHandle(self.allocate());
        self.joints.insert(id, (a, b));
        Ok(id)
    }

    fn polygon_region(vertices: &[Point]) -> (Point, f64) {
        let center = util::centroid(vertices);
        let radius = vertices
            .iter()
            .map(|p| util::distance(center, *p))
            .fold(0.0, f64::max);
        (center, radius)
    }
}

impl World for MockWorld {
    fn add_circle(
        &mut self,
        center: Point,
        radius: f64,
        options: BodyOptions,
    ) -> Result<BodyHandle, WorldError> {
        self.create(WorldCall::AddCircle { center, radius }, center, radius, options)
    }

    fn add_rect(
        &mut self,
        center: Point,
        half_width: f64,
        half_height: f64,
        options: BodyOptions,
    ) -> Result<BodyHandle, WorldError> {
        self.create(
            WorldCall::AddRect {
                center,
                half_width,
                half_height,
            },
            center,
            half_width.min(half_height),
            options,
        )
    }

    fn add_convex_polygon(
        &mut self,
        vertices: &[Point],
        options: BodyOptions,
    ) -> Result<BodyHandle, WorldError> {
        let (center, radius) = Self::polygon_region(vertices);
        self.create(WorldCall::AddConvex(vertices.to_vec()), center, radius, options)
    }

    fn add_complex_polygon(
        &mut self,
        vertices: &[Point],
        options: BodyOptions,
    ) -> Result<BodyHandle, WorldError> {
        let (center, radius) = Self::polygon_region(vertices);
        self.create(WorldCall::AddComplex(vertices.to_vec()), center, radius, options)
    }

    fn add_distance_joint(
        &mut self,
        body_a: BodyHandle,
        body_b: BodyHandle,
        anchor_a: Point,
        anchor_b: Point,
    ) -> Result<JointHandle, WorldError> {
        self.join(
            WorldCall::DistanceJoint {
                a: body_a,
                b: body_b,
                anchor_a,
                anchor_b,
            },
            body_a,
            Some(body_b),
        )
    }

    fn add_pin_joint(&mut self, body: BodyHandle, anchor: Point) -> Result<JointHandle, WorldError> {
        self.join(WorldCall::PinJoint { body, anchor }, body, None)
    }

    fn add_motor_joint(
        &mut self,
        body: BodyHandle,
        anchor: Point,
    ) -> Result<JointHandle, WorldError> {
        self.join(WorldCall::MotorJoint { body, anchor }, body, None)
    }

    fn bodies_at_point(&self, point: Point, include_static: bool) -> Vec<BodyHandle> {
        self.bodies
            .iter()
            .rev()
            .filter(|(_, body)| include_static || body.dynamic)
            .filter(|(_, body)| util::distance(body.center, point) <= body.radius)
            .map(|(id, _)| *id)
            .collect()
    }

    fn joints_of(&self, body: BodyHandle) -> Vec<JointHandle> {
        self.joints
            .iter()
            .filter(|(_, (a, b))| *a == body || *b == Some(body))
            .map(|(id, _)| *id)
            .collect()
    }

    fn contains_body(&self, body: BodyHandle) -> bool {
        self.bodies.contains_key(&body)
    }

    fn destroy_body(&mut self, body: BodyHandle) {
        self.calls.push(WorldCall::DestroyBody(body));
        self.bodies.remove(&body);
        self.joints.retain(|_, (a, b)| *a != body && *b != Some(body));
    }

    fn destroy_joint(&mut self, joint: JointHandle) {
        self.calls.push(WorldCall::DestroyJoint(joint));
        self.joints.remove(&joint);
    }

    fn attach_pointer_joint(&mut self, body: BodyHandle, point: Point) {
        self.calls.push(WorldCall::AttachPointer { body, point });
    }

    fn move_pointer_joint(&mut self, point: Point) {
        self.calls.push(WorldCall::MovePointer(point));
    }

    fn remove_pointer_joint(&mut self) {
        self.calls.push(WorldCall::RemovePointer);
    }

    fn to_world(&self, pixel: Point) -> Point {
        Point::new(pixel.x, MOCK_HEIGHT - pixel.y)
    }

    fn pixels_per_meter(&self) -> f64 {
        MOCK_PPM
    }

    fn body_position(&self, body: BodyHandle) -> Option<Point> {
        self.bodies.get(&body).map(|b| b.position)
    }

    fn set_body_position(&mut self, body: BodyHandle, position: Point) {
        self.calls.push(WorldCall::SetPosition { body, position });
        if let Some(b) = self.bodies.get_mut(&body) {
            b.position = position;
        }
    }

    fn angular_velocity(&self, body: BodyHandle) -> Option<f64> {
        self.bodies.get(&body).map(|b| b.angular_velocity)
    }

    fn moment_of_inertia(&self, body: BodyHandle) -> Option<f64> {
        self.bodies.get(&body).map(|b| b.inertia)
    }

    fn apply_torque(&mut self, body: BodyHandle, torque: f64) {
        self.calls.push(WorldCall::ApplyTorque { body, torque });
    }

    fn step(&mut self) {
        self.calls.push(WorldCall::Step);
    }

    fn render(&self, _surface: &mut dyn Surface) {}

    fn save(&mut self, path: &Path) -> Result<(), WorldError> {
        self.calls.push(WorldCall::Save(path.to_path_buf()));
        if self.fail_io {
            return Err(WorldError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::other("mock failure"),
            });
        }
        Ok(())
    }

    fn load(&mut self, path: &Path) -> Result<(), WorldError> {
        self.calls.push(WorldCall::Load(path.to_path_buf()));
        if self.fail_io {
            return Err(WorldError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::other("mock failure"),
            });
        }
        Ok(())
    }
}
