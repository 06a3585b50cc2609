//! [`World`] implementation backed by Rapier.
//!
//! Rapier works in meters with a y-up frame; the canvas works in pixels with
//! y pointing down. Every conversion goes through [`RapierWorld::to_meters`]
//! and [`RapierWorld::to_pixels`].

use super::snapshot::{
    self, BodySnapshot, JointKind, JointSnapshot, ShapeSpec, WorldSnapshot,
};
use super::{BodyHandle, BodyOptions, JointHandle, World, WorldError};
use crate::draw::{self, Color, Surface};
use crate::util::{self, Point};
use log::{debug, info, warn};
use rapier2d::math::Isometry;
use rapier2d::na::Point2;
use rapier2d::parry::query::PointQuery;
use rapier2d::prelude::{
    CCDSolver, ColliderBuilder, ColliderSet, DefaultBroadPhase, ImpulseJointHandle,
    ImpulseJointSet, IntegrationParameters, IslandManager, MultibodyJointSet, NarrowPhase,
    PhysicsPipeline, QueryPipeline, Real, RevoluteJointBuilder, RigidBodyBuilder,
    RigidBodyHandle, RigidBodySet, SpringJointBuilder, Vector,
};
use std::collections::BTreeMap;
use std::path::Path;

/// Height of the static ground strip created along the bottom edge, in pixels.
const GROUND_THICKNESS: f64 = 20.0;
/// Smallest polygon area (m²) accepted for a body.
const MIN_POLYGON_AREA: f64 = 1e-4;

/// Construction parameters for [`RapierWorld`].
#[derive(Clone, Debug)]
pub struct RapierSettings {
    pub width: f64,
    pub height: f64,
    pub pixels_per_meter: f64,
    pub gravity: Point,
    pub frame_rate: f64,
    pub motor_speed: f64,
    pub distance_stiffness: f64,
    pub distance_damping: f64,
    pub pointer_stiffness: f64,
    pub pointer_damping: f64,
    pub body_color: Color,
    pub static_color: Color,
    pub joint_color: Color,
    pub with_ground: bool,
}

impl Default for RapierSettings {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            pixels_per_meter: 50.0,
            gravity: Point::new(0.0, -10.0),
            frame_rate: 30.0,
            motor_speed: 5.0,
            distance_stiffness: 400.0,
            distance_damping: 10.0,
            pointer_stiffness: 250.0,
            pointer_damping: 15.0,
            body_color: draw::BLACK,
            static_color: draw::GREY,
            joint_color: draw::ORANGE,
            with_ground: true,
        }
    }
}

struct BodyEntry {
    raw: RigidBodyHandle,
    shape: ShapeSpec,
    options: BodyOptions,
}

struct JointEntry {
    raw: ImpulseJointHandle,
    kind: JointKind,
    body_a: BodyHandle,
    body_b: Option<BodyHandle>,
    anchor_a: Point,
    anchor_b: Point,
}

struct PointerJoint {
    cursor: RigidBodyHandle,
    body: BodyHandle,
}

/// Rapier simulation plus the bookkeeping needed to hand out stable handles.
pub struct RapierWorld {
    settings: RapierSettings,
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    /// Collider-less fixed body at the origin that pins and motors attach to.
    anchor: RigidBodyHandle,
    registry: BTreeMap<BodyHandle, BodyEntry>,
    joints: BTreeMap<JointHandle, JointEntry>,
    pointer: Option<PointerJoint>,
    next_id: u64,
}

impl RapierWorld {
    pub fn new(settings: RapierSettings) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = (1.0 / settings.frame_rate.max(1.0)) as Real;

        let mut bodies = RigidBodySet::new();
        let anchor = bodies.insert(RigidBodyBuilder::fixed().build());

        let mut world = Self {
            gravity: Vector::new(settings.gravity.x as Real, settings.gravity.y as Real),
            settings,
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies,
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            anchor,
            registry: BTreeMap::new(),
            joints: BTreeMap::new(),
            pointer: None,
            next_id: 1,
        };

        if world.settings.with_ground {
            world.add_ground();
        }
        world
    }

    /// Number of bodies, static ones included.
    pub fn body_count(&self) -> usize {
        self.registry.len()
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    pub fn has_pointer_joint(&self) -> bool {
        self.pointer.is_some()
    }

    /// Geometry the body was created with, in body-local meters.
    pub fn body_shape(&self, body: BodyHandle) -> Option<&ShapeSpec> {
        self.registry.get(&body).map(|entry| &entry.shape)
    }

    /// Pixel point (y down) to world meters (y up).
    pub fn to_meters(&self, pixel: Point) -> Point {
        self.to_world(pixel)
            .scaled(1.0 / self.settings.pixels_per_meter)
    }

    /// World meters (y up) to pixel point (y down).
    pub fn to_pixels(&self, meters: Point) -> Point {
        let ppm = self.settings.pixels_per_meter;
        Point::new(meters.x * ppm, self.settings.height - meters.y * ppm)
    }

    fn add_ground(&mut self) {
        let center = Point::new(
            self.settings.width / 2.0,
            self.settings.height - GROUND_THICKNESS / 2.0,
        );
        let options = BodyOptions {
            dynamic: false,
            ..BodyOptions::default()
        };
        if let Err(err) = self.add_rect(
            center,
            self.settings.width / 2.0,
            GROUND_THICKNESS / 2.0,
            options,
        ) {
            warn!("Failed to create ground: {err}");
        }
    }

    fn raw_body(&self, body: BodyHandle) -> Result<RigidBodyHandle, WorldError> {
        self.registry
            .get(&body)
            .map(|entry| entry.raw)
            .ok_or(WorldError::UnknownBody(body))
    }

    fn body_isometry(&self, body: BodyHandle) -> Option<Isometry<Real>> {
        let raw = self.registry.get(&body)?.raw;
        self.bodies.get(raw).map(|rb| *rb.position())
    }

    /// Converts a world point (meters) into `body`'s local frame.
    fn local_point(&self, body: BodyHandle, world: Point) -> Result<Point, WorldError> {
        let iso = self
            .body_isometry(body)
            .ok_or(WorldError::UnknownBody(body))?;
        Ok(from_na(&iso.inverse_transform_point(&to_na(world))))
    }

    fn world_point(&self, body: BodyHandle, local: Point) -> Option<Point> {
        self.body_isometry(body)
            .map(|iso| from_na(&iso.transform_point(&to_na(local))))
    }

    fn collider_for(shape: &ShapeSpec) -> Result<ColliderBuilder, WorldError> {
        match shape {
            ShapeSpec::Circle { radius } => Ok(ColliderBuilder::ball(*radius as Real)),
            ShapeSpec::Rect {
                half_width,
                half_height,
            } => Ok(ColliderBuilder::cuboid(
                *half_width as Real,
                *half_height as Real,
            )),
            ShapeSpec::Convex { vertices } => {
                check_outline(vertices)?;
                let points: Vec<Point2<Real>> = vertices.iter().copied().map(to_na).collect();
                ColliderBuilder::convex_hull(&points).ok_or_else(|| {
                    WorldError::InvalidGeometry("convex hull is degenerate".to_string())
                })
            }
            ShapeSpec::Complex { vertices } => {
                check_outline(vertices)?;
                let points: Vec<Point2<Real>> = vertices.iter().copied().map(to_na).collect();
                let n = points.len() as u32;
                let edges: Vec<[u32; 2]> = (0..n).map(|i| [i, (i + 1) % n]).collect();
                Ok(ColliderBuilder::convex_decomposition(&points, &edges))
            }
        }
    }

    /// Inserts a body whose origin sits at `position` (meters).
    fn insert_body(
        &mut self,
        id: BodyHandle,
        position: Point,
        angle: f64,
        shape: ShapeSpec,
        options: BodyOptions,
    ) -> Result<BodyHandle, WorldError> {
        let collider = Self::collider_for(&shape)?
            .density(options.density as Real)
            .restitution(options.restitution as Real)
            .friction(options.friction as Real)
            .build();

        let builder = if options.dynamic {
            RigidBodyBuilder::dynamic()
        } else {
            RigidBodyBuilder::fixed()
        };
        let rb = builder
            .translation(Vector::new(position.x as Real, position.y as Real))
            .rotation(angle as Real)
            .user_data(id.0 as u128)
            .build();

        let raw = self.bodies.insert(rb);
        self.colliders
            .insert_with_parent(collider, raw, &mut self.bodies);
        self.registry.insert(
            id,
            BodyEntry {
                raw,
                shape,
                options,
            },
        );
        self.next_id = self.next_id.max(id.0 + 1);
        debug!("Created {id} at ({:.2}, {:.2}) m", position.x, position.y);
        Ok(id)
    }

    fn allocate_id(&mut self) -> BodyHandle {
        let id = BodyHandle(self.next_id);
        self.next_id += 1;
        id
    }

    /// Creates a polygon body centred on the centroid of `vertices` (pixels).
    fn insert_polygon(
        &mut self,
        vertices: &[Point],
        options: BodyOptions,
        convex: bool,
    ) -> Result<BodyHandle, WorldError> {
        let mut outline: Vec<Point> = util::open_outline(vertices)
            .iter()
            .map(|p| self.to_meters(*p))
            .collect();
        outline.dedup();

        check_outline(&outline)?;

        let center = util::centroid(&outline);
        let local: Vec<Point> = outline.iter().map(|p| p.delta_from(center)).collect();
        let shape = if convex {
            ShapeSpec::Convex { vertices: local }
        } else {
            ShapeSpec::Complex { vertices: local }
        };
        let id = self.allocate_id();
        self.insert_body(id, center, 0.0, shape, options)
    }

    /// Creates a joint from body-local anchors (see [`JointSnapshot`] for the convention).
    fn insert_joint(
        &mut self,
        id: JointHandle,
        kind: JointKind,
        body_a: BodyHandle,
        body_b: Option<BodyHandle>,
        anchor_a: Point,
        anchor_b: Point,
    ) -> Result<JointHandle, WorldError> {
        let raw_a = self.raw_body(body_a)?;
        let raw = match (kind, body_b) {
            (JointKind::Distance, Some(b)) => {
                let raw_b = self.raw_body(b)?;
                let world_a = self
                    .world_point(body_a, anchor_a)
                    .ok_or(WorldError::UnknownBody(body_a))?;
                let world_b = self.world_point(b, anchor_b).ok_or(WorldError::UnknownBody(b))?;
                let joint = SpringJointBuilder::new(
                    util::distance(world_a, world_b) as Real,
                    self.settings.distance_stiffness as Real,
                    self.settings.distance_damping as Real,
                )
                .local_anchor1(to_na(anchor_a))
                .local_anchor2(to_na(anchor_b))
                .build();
                self.impulse_joints.insert(raw_a, raw_b, joint, true)
            }
            (JointKind::Pin, _) => {
                let joint = RevoluteJointBuilder::new()
                    .local_anchor1(to_na(anchor_b))
                    .local_anchor2(to_na(anchor_a))
                    .build();
                self.impulse_joints.insert(self.anchor, raw_a, joint, true)
            }
            (JointKind::Motor, _) => {
                let joint = RevoluteJointBuilder::new()
                    .local_anchor1(to_na(anchor_b))
                    .local_anchor2(to_na(anchor_a))
                    .motor_velocity(self.settings.motor_speed as Real, 1.0)
                    .build();
                self.impulse_joints.insert(self.anchor, raw_a, joint, true)
            }
            (JointKind::Distance, None) => {
                return Err(WorldError::InvalidGeometry(
                    "distance joint needs two bodies".to_string(),
                ));
            }
        };

        self.joints.insert(
            id,
            JointEntry {
                raw,
                kind,
                body_a,
                body_b: if kind == JointKind::Distance { body_b } else { None },
                anchor_a,
                anchor_b,
            },
        );
        debug!("Created {kind:?} {id} on {body_a}");
        Ok(id)
    }

    fn allocate_joint_id(&mut self) -> JointHandle {
        let id = JointHandle(self.next_id);
        self.next_id += 1;
        id
    }

    fn add_world_joint(
        &mut self,
        kind: JointKind,
        body: BodyHandle,
        anchor: Point,
    ) -> Result<JointHandle, WorldError> {
        let world_anchor = self.to_meters(anchor);
        let local = self.local_point(body, world_anchor)?;
        let id = self.allocate_joint_id();
        self.insert_joint(id, kind, body, None, local, world_anchor)
    }

    fn remove_raw_body(&mut self, raw: RigidBodyHandle) {
        self.bodies.remove(
            raw,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    fn snapshot(&self) -> WorldSnapshot {
        let bodies = self
            .registry
            .iter()
            .filter_map(|(id, entry)| {
                let rb = self.bodies.get(entry.raw)?;
                Some(BodySnapshot {
                    id: id.0,
                    shape: entry.shape.clone(),
                    position: Point::new(rb.translation().x as f64, rb.translation().y as f64),
                    angle: rb.rotation().angle() as f64,
                    linear_velocity: Point::new(rb.linvel().x as f64, rb.linvel().y as f64),
                    angular_velocity: rb.angvel() as f64,
                    options: entry.options,
                })
            })
            .collect();

        let joints = self
            .joints
            .values()
            .map(|entry| JointSnapshot {
                kind: entry.kind,
                body_a: entry.body_a.0,
                body_b: entry.body_b.map(|b| b.0),
                anchor_a: entry.anchor_a,
                anchor_b: entry.anchor_b,
            })
            .collect();

        WorldSnapshot::new(bodies, joints)
    }

    /// Replaces the world with `snapshot`.
    ///
    /// The snapshot is built into a separate world first; on error the
    /// current contents are left as they were.
    fn restore(&mut self, snapshot: WorldSnapshot) -> Result<(), WorldError> {
        // The ground is part of the snapshot.
        let mut staged = RapierWorld::new(RapierSettings {
            with_ground: false,
            ..self.settings.clone()
        });
        staged.populate(snapshot)?;
        staged.settings = self.settings.clone();
        *self = staged;
        Ok(())
    }

    fn populate(&mut self, snapshot: WorldSnapshot) -> Result<(), WorldError> {
        for body in snapshot.bodies {
            let id = self.insert_body(
                BodyHandle(body.id),
                body.position,
                body.angle,
                body.shape,
                body.options,
            )?;
            let raw = self.raw_body(id)?;
            if let Some(rb) = self.bodies.get_mut(raw) {
                rb.set_linvel(
                    Vector::new(body.linear_velocity.x as Real, body.linear_velocity.y as Real),
                    true,
                );
                rb.set_angvel(body.angular_velocity as Real, true);
            }
        }

        for joint in snapshot.joints {
            let id = self.allocate_joint_id();
            let result = self.insert_joint(
                id,
                joint.kind,
                BodyHandle(joint.body_a),
                joint.body_b.map(BodyHandle),
                joint.anchor_a,
                joint.anchor_b,
            );
            if let Err(err) = result {
                warn!("Skipping joint from snapshot: {err}");
            }
        }
        Ok(())
    }

    fn outline_pixels(&self, iso: &Isometry<Real>, local: &[Point]) -> Vec<Point> {
        local
            .iter()
            .map(|p| self.to_pixels(from_na(&iso.transform_point(&to_na(*p)))))
            .collect()
    }
}

impl World for RapierWorld {
    fn add_circle(
        &mut self,
        center: Point,
        radius: f64,
        options: BodyOptions,
    ) -> Result<BodyHandle, WorldError> {
        if radius <= 0.0 {
            return Err(WorldError::InvalidGeometry(format!(
                "circle radius must be positive, got {radius}"
            )));
        }
        let id = self.allocate_id();
        let shape = ShapeSpec::Circle {
            radius: radius / self.settings.pixels_per_meter,
        };
        let position = self.to_meters(center);
        self.insert_body(id, position, 0.0, shape, options)
    }

    fn add_rect(
        &mut self,
        center: Point,
        half_width: f64,
        half_height: f64,
        options: BodyOptions,
    ) -> Result<BodyHandle, WorldError> {
        if half_width <= 0.0 || half_height <= 0.0 {
            return Err(WorldError::InvalidGeometry(format!(
                "rectangle half extents must be positive, got {half_width}x{half_height}"
            )));
        }
        let ppm = self.settings.pixels_per_meter;
        let id = self.allocate_id();
        let shape = ShapeSpec::Rect {
            half_width: half_width / ppm,
            half_height: half_height / ppm,
        };
        let position = self.to_meters(center);
        self.insert_body(id, position, 0.0, shape, options)
    }

    fn add_convex_polygon(
        &mut self,
        vertices: &[Point],
        options: BodyOptions,
    ) -> Result<BodyHandle, WorldError> {
        self.insert_polygon(vertices, options, true)
    }

    fn add_complex_polygon(
        &mut self,
        vertices: &[Point],
        options: BodyOptions,
    ) -> Result<BodyHandle, WorldError> {
        self.insert_polygon(vertices, options, false)
    }

    fn add_distance_joint(
        &mut self,
        body_a: BodyHandle,
        body_b: BodyHandle,
        anchor_a: Point,
        anchor_b: Point,
    ) -> Result<JointHandle, WorldError> {
        let local_a = self.local_point(body_a, self.to_meters(anchor_a))?;
        let local_b = self.local_point(body_b, self.to_meters(anchor_b))?;
        let id = self.allocate_joint_id();
        self.insert_joint(id, JointKind::Distance, body_a, Some(body_b), local_a, local_b)
    }

    fn add_pin_joint(
        &mut self,
        body: BodyHandle,
        anchor: Point,
    ) -> Result<JointHandle, WorldError> {
        self.add_world_joint(JointKind::Pin, body, anchor)
    }

    fn add_motor_joint(
        &mut self,
        body: BodyHandle,
        anchor: Point,
    ) -> Result<JointHandle, WorldError> {
        self.add_world_joint(JointKind::Motor, body, anchor)
    }

    fn bodies_at_point(&self, point: Point, include_static: bool) -> Vec<BodyHandle> {
        let target = to_na(self.to_meters(point));
        let mut hits: Vec<BodyHandle> = self
            .colliders
            .iter()
            .filter_map(|(_, collider)| {
                let rb = self.bodies.get(collider.parent()?)?;
                if !include_static && !rb.is_dynamic() {
                    return None;
                }
                if !PointQuery::contains_point(collider.shape(), collider.position(), &target) {
                    return None;
                }
                Some(BodyHandle(rb.user_data as u64))
            })
            .filter(|id| self.registry.contains_key(id))
            .collect();

        // Most recently created bodies are drawn last, i.e. on top.
        hits.sort_unstable_by(|a, b| b.cmp(a));
        hits.dedup();
        hits
    }

    fn joints_of(&self, body: BodyHandle) -> Vec<JointHandle> {
        self.joints
            .iter()
            .filter(|(_, entry)| entry.body_a == body || entry.body_b == Some(body))
            .map(|(id, _)| *id)
            .collect()
    }

    fn contains_body(&self, body: BodyHandle) -> bool {
        self.registry.contains_key(&body)
    }

    fn destroy_body(&mut self, body: BodyHandle) {
        if self.pointer.as_ref().is_some_and(|p| p.body == body) {
            self.remove_pointer_joint();
        }
        let Some(entry) = self.registry.remove(&body) else {
            return;
        };
        self.remove_raw_body(entry.raw);
        self.joints
            .retain(|_, joint| joint.body_a != body && joint.body_b != Some(body));
        debug!("Destroyed {body}");
    }

    fn destroy_joint(&mut self, joint: JointHandle) {
        if let Some(entry) = self.joints.remove(&joint) {
            self.impulse_joints.remove(entry.raw, true);
            debug!("Destroyed {joint}");
        }
    }

    fn attach_pointer_joint(&mut self, body: BodyHandle, point: Point) {
        self.remove_pointer_joint();

        let target = self.to_meters(point);
        let (raw, local) = match (self.raw_body(body), self.local_point(body, target)) {
            (Ok(raw), Ok(local)) => (raw, local),
            _ => {
                warn!("Cannot attach pointer joint to missing {body}");
                return;
            }
        };

        let cursor = self.bodies.insert(
            RigidBodyBuilder::kinematic_position_based()
                .translation(Vector::new(target.x as Real, target.y as Real))
                .build(),
        );
        let joint = SpringJointBuilder::new(
            0.0,
            self.settings.pointer_stiffness as Real,
            self.settings.pointer_damping as Real,
        )
        .local_anchor2(to_na(local))
        .build();
        self.impulse_joints.insert(cursor, raw, joint, true);
        self.pointer = Some(PointerJoint { cursor, body });
        debug!("Pointer joint attached to {body}");
    }

    fn move_pointer_joint(&mut self, point: Point) {
        let target = self.to_meters(point);
        if let Some(rb) = self
            .pointer
            .as_ref()
            .and_then(|pointer| self.bodies.get_mut(pointer.cursor))
        {
            rb.set_next_kinematic_translation(Vector::new(target.x as Real, target.y as Real));
        }
    }

    fn remove_pointer_joint(&mut self) {
        if let Some(pointer) = self.pointer.take() {
            self.remove_raw_body(pointer.cursor);
            debug!("Pointer joint released from {}", pointer.body);
        }
    }

    fn to_world(&self, pixel: Point) -> Point {
        Point::new(pixel.x, self.settings.height - pixel.y)
    }

    fn pixels_per_meter(&self) -> f64 {
        self.settings.pixels_per_meter
    }

    fn body_position(&self, body: BodyHandle) -> Option<Point> {
        let rb = self.bodies.get(self.registry.get(&body)?.raw)?;
        Some(Point::new(
            rb.translation().x as f64,
            rb.translation().y as f64,
        ))
    }

    fn set_body_position(&mut self, body: BodyHandle, position: Point) {
        let Some(entry) = self.registry.get(&body) else {
            return;
        };
        let Some(rb) = self.bodies.get_mut(entry.raw) else {
            return;
        };
        rb.set_translation(Vector::new(position.x as Real, position.y as Real), true);

        // Colliders only follow their parent during a step; queries while
        // paused must see the new pose.
        let iso = *rb.position();
        for handle in rb.colliders().to_vec() {
            if let Some(collider) = self.colliders.get_mut(handle) {
                let relative = collider
                    .position_wrt_parent()
                    .copied()
                    .unwrap_or_else(Isometry::identity);
                collider.set_position(iso * relative);
            }
        }
    }

    fn angular_velocity(&self, body: BodyHandle) -> Option<f64> {
        let rb = self.bodies.get(self.registry.get(&body)?.raw)?;
        Some(rb.angvel() as f64)
    }

    fn moment_of_inertia(&self, body: BodyHandle) -> Option<f64> {
        let rb = self.bodies.get(self.registry.get(&body)?.raw)?;
        let inertia = rb
            .colliders()
            .iter()
            .filter_map(|handle| self.colliders.get(*handle))
            .map(|collider| collider.mass_properties().principal_inertia() as f64)
            .sum();
        Some(inertia)
    }

    fn apply_torque(&mut self, body: BodyHandle, torque: f64) {
        let Some(entry) = self.registry.get(&body) else {
            return;
        };
        if let Some(rb) = self.bodies.get_mut(entry.raw) {
            rb.add_torque(torque as Real, true);
        }
    }

    fn step(&mut self) {
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );

        // User forces persist in Rapier; they only last one step here.
        for (_, rb) in self.bodies.iter_mut() {
            rb.reset_forces(false);
            rb.reset_torques(false);
        }
    }

    fn render(&self, surface: &mut dyn Surface) {
        let ppm = self.settings.pixels_per_meter;

        for entry in self.registry.values() {
            let Some(rb) = self.bodies.get(entry.raw) else {
                continue;
            };
            let iso = rb.position();
            let color = if entry.options.dynamic {
                self.settings.body_color
            } else {
                self.settings.static_color
            };

            match &entry.shape {
                ShapeSpec::Circle { radius } => {
                    let center = self.to_pixels(from_na(&iso.transform_point(&to_na(Point::ORIGIN))));
                    let rim = self.outline_pixels(iso, &[Point::new(*radius, 0.0)]);
                    surface.draw_circle(color, center, radius * ppm, 2.0);
                    if let Some(rim) = rim.first() {
                        surface.draw_line(color, center, *rim, 1.0);
                    }
                }
                ShapeSpec::Rect {
                    half_width,
                    half_height,
                } => {
                    let corners = [
                        Point::new(-half_width, -half_height),
                        Point::new(*half_width, -half_height),
                        Point::new(*half_width, *half_height),
                        Point::new(-half_width, *half_height),
                    ];
                    surface.draw_polygon(color, &self.outline_pixels(iso, &corners), 2.0);
                }
                ShapeSpec::Convex { vertices } | ShapeSpec::Complex { vertices } => {
                    surface.draw_polygon(color, &self.outline_pixels(iso, vertices), 2.0);
                }
            }
        }

        for joint in self.joints.values() {
            let Some(a) = self.world_point(joint.body_a, joint.anchor_a) else {
                continue;
            };
            let b = match joint.body_b {
                Some(body_b) => match self.world_point(body_b, joint.anchor_b) {
                    Some(b) => b,
                    None => continue,
                },
                None => joint.anchor_b,
            };
            let (a, b) = (self.to_pixels(a), self.to_pixels(b));
            surface.draw_line(self.settings.joint_color, a, b, 2.0);
            if joint.body_b.is_none() {
                surface.draw_circle(self.settings.joint_color, b, 4.0, 2.0);
            }
        }
    }

    fn save(&mut self, path: &Path) -> Result<(), WorldError> {
        self.remove_pointer_joint();
        snapshot::write_snapshot(path, &self.snapshot())
    }

    fn load(&mut self, path: &Path) -> Result<(), WorldError> {
        let snapshot = snapshot::read_snapshot(path)?;
        let bodies = snapshot.bodies.len();
        self.restore(snapshot)?;
        info!("Loaded {bodies} bodies from {}", path.display());
        Ok(())
    }
}

/// Rejects outlines (meters) that cannot form a polygon body.
fn check_outline(outline: &[Point]) -> Result<(), WorldError> {
    if outline.len() < 3 {
        return Err(WorldError::InvalidGeometry(format!(
            "polygon needs at least 3 distinct vertices, got {}",
            outline.len()
        )));
    }
    if util::signed_area(outline).abs() < MIN_POLYGON_AREA {
        return Err(WorldError::InvalidGeometry(
            "polygon has no area".to_string(),
        ));
    }
    Ok(())
}

fn to_na(p: Point) -> Point2<Real> {
    Point2::new(p.x as Real, p.y as Real)
}

fn from_na(p: &Point2<Real>) -> Point {
    Point::new(p.x as f64, p.y as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::surface::recording::{DrawOp, RecordingSurface};
    use tempfile::TempDir;

    fn world() -> RapierWorld {
        RapierWorld::new(RapierSettings {
            with_ground: false,
            ..RapierSettings::default()
        })
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn pixel_and_meter_conversions_round_trip() {
        let world = world();
        let m = world.to_meters(Point::new(100.0, 100.0));
        assert!(approx(m.x, 2.0) && approx(m.y, 10.0));
        let p = world.to_pixels(m);
        assert!(approx(p.x, 100.0) && approx(p.y, 100.0));
    }

    #[test]
    fn circle_is_created_at_its_center() {
        let mut world = world();
        let body = world
            .add_circle(Point::new(100.0, 100.0), 40.0, BodyOptions::default())
            .unwrap();
        let pos = world.body_position(body).unwrap();
        assert!(approx(pos.x, 2.0) && approx(pos.y, 10.0));
        assert_eq!(world.body_shape(body), Some(&ShapeSpec::Circle { radius: 0.8 }));
    }

    #[test]
    fn point_queries_return_topmost_dynamic_bodies_first() {
        let mut world = RapierWorld::new(RapierSettings::default());
        let lower = world
            .add_circle(Point::new(200.0, 200.0), 40.0, BodyOptions::default())
            .unwrap();
        let upper = world
            .add_rect(Point::new(210.0, 200.0), 30.0, 30.0, BodyOptions::default())
            .unwrap();

        assert_eq!(
            world.bodies_at_point(Point::new(205.0, 200.0), false),
            vec![upper, lower]
        );
        assert!(world.bodies_at_point(Point::new(700.0, 100.0), false).is_empty());

        // The ground strip is static and only visible to static-inclusive queries.
        let ground_hit = Point::new(400.0, 595.0);
        assert!(world.bodies_at_point(ground_hit, false).is_empty());
        assert_eq!(world.bodies_at_point(ground_hit, true).len(), 1);
    }

    #[test]
    fn degenerate_polygons_are_rejected() {
        let mut world = world();
        let line = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(20.0, 0.0),
        ];
        assert!(matches!(
            world.add_complex_polygon(&line, BodyOptions::default()),
            Err(WorldError::InvalidGeometry(_))
        ));
        assert!(world.add_circle(Point::ORIGIN, 0.0, BodyOptions::default()).is_err());
        assert_eq!(world.body_count(), 0);
    }

    #[test]
    fn closed_outline_becomes_polygon_body() {
        let mut world = world();
        let square = [
            Point::new(100.0, 100.0),
            Point::new(150.0, 100.0),
            Point::new(150.0, 150.0),
            Point::new(100.0, 150.0),
            Point::new(100.0, 100.0),
        ];
        let body = world
            .add_complex_polygon(&square, BodyOptions::default())
            .unwrap();
        assert_eq!(world.bodies_at_point(Point::new(125.0, 125.0), false), vec![body]);
        match world.body_shape(body) {
            Some(ShapeSpec::Complex { vertices }) => assert_eq!(vertices.len(), 4),
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn destroying_a_body_drops_its_joints() {
        let mut world = world();
        let a = world
            .add_circle(Point::new(100.0, 100.0), 20.0, BodyOptions::default())
            .unwrap();
        let b = world
            .add_circle(Point::new(200.0, 100.0), 20.0, BodyOptions::default())
            .unwrap();
        let joint = world
            .add_distance_joint(a, b, Point::new(100.0, 100.0), Point::new(200.0, 100.0))
            .unwrap();
        let pin = world.add_pin_joint(a, Point::new(100.0, 100.0)).unwrap();

        assert_eq!(world.joints_of(a), vec![joint, pin]);
        assert_eq!(world.joints_of(b), vec![joint]);

        world.destroy_body(a);
        assert!(!world.contains_body(a));
        assert_eq!(world.joint_count(), 0);
        assert!(world.joints_of(b).is_empty());
    }

    #[test]
    fn gravity_pulls_dynamic_bodies_down() {
        let mut world = world();
        let body = world
            .add_circle(Point::new(100.0, 100.0), 20.0, BodyOptions::default())
            .unwrap();
        let before = world.body_position(body).unwrap();
        for _ in 0..10 {
            world.step();
        }
        let after = world.body_position(body).unwrap();
        assert!(after.y < before.y, "{before:?} -> {after:?}");
    }

    #[test]
    fn torque_spins_body_for_one_step_only() {
        let mut world = RapierWorld::new(RapierSettings {
            with_ground: false,
            gravity: Point::ORIGIN,
            ..RapierSettings::default()
        });
        let body = world
            .add_circle(Point::new(100.0, 100.0), 40.0, BodyOptions::default())
            .unwrap();
        world.step();
        assert!(world.moment_of_inertia(body).unwrap() > 0.0);

        world.apply_torque(body, -50.0);
        world.step();
        let spun = world.angular_velocity(body).unwrap();
        assert!(spun < 0.0);

        world.step();
        let coasting = world.angular_velocity(body).unwrap();
        assert!(approx(coasting, spun), "{spun} then {coasting}");
    }

    #[test]
    fn teleported_body_is_hit_at_new_position_without_stepping() {
        let mut world = world();
        let body = world
            .add_circle(Point::new(100.0, 100.0), 20.0, BodyOptions::default())
            .unwrap();
        world.set_body_position(body, world.to_meters(Point::new(300.0, 100.0)));

        assert_eq!(world.bodies_at_point(Point::new(300.0, 100.0), false), vec![body]);
        assert!(world.bodies_at_point(Point::new(100.0, 100.0), false).is_empty());
    }

    #[test]
    fn pointer_joint_lifecycle() {
        let mut world = world();
        let body = world
            .add_circle(Point::new(100.0, 100.0), 20.0, BodyOptions::default())
            .unwrap();
        world.attach_pointer_joint(body, Point::new(100.0, 100.0));
        assert!(world.has_pointer_joint());
        world.move_pointer_joint(Point::new(150.0, 100.0));
        world.step();
        world.remove_pointer_joint();
        assert!(!world.has_pointer_joint());
        assert!(world.contains_body(body));
    }

    #[test]
    fn render_draws_bodies_and_joints() {
        let mut world = world();
        let body = world
            .add_rect(Point::new(100.0, 100.0), 20.0, 10.0, BodyOptions::default())
            .unwrap();
        world.add_pin_joint(body, Point::new(100.0, 100.0)).unwrap();

        let mut surface = RecordingSurface::default();
        world.render(&mut surface);

        let polygon = surface.ops.iter().find_map(|op| match op {
            DrawOp::Polygon(points) => Some(points.clone()),
            _ => None,
        });
        let polygon = polygon.expect("rect rendered as polygon");
        assert_eq!(polygon.len(), 4);
        assert!(approx(polygon[0].x, 80.0) && approx(polygon[0].y, 110.0));
        assert!(surface.ops.iter().any(|op| matches!(op, DrawOp::Line { .. })));
    }

    #[test]
    fn save_and_load_restores_bodies_and_joints() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("world.json");

        let mut world = RapierWorld::new(RapierSettings::default());
        let a = world
            .add_circle(Point::new(100.0, 100.0), 20.0, BodyOptions::default())
            .unwrap();
        let b = world
            .add_rect(Point::new(300.0, 100.0), 20.0, 20.0, BodyOptions::default())
            .unwrap();
        world
            .add_distance_joint(a, b, Point::new(100.0, 100.0), Point::new(300.0, 100.0))
            .unwrap();
        world.attach_pointer_joint(b, Point::new(300.0, 100.0));
        world.save(&path).unwrap();
        assert!(!world.has_pointer_joint());

        let mut restored = RapierWorld::new(RapierSettings::default());
        restored.load(&path).unwrap();
        assert_eq!(restored.body_count(), 3);
        assert_eq!(restored.joint_count(), 1);
        assert!(restored.contains_body(a));
        assert_eq!(restored.joints_of(b).len(), 1);

        // Fresh handles never collide with restored ones.
        let c = restored
            .add_circle(Point::new(500.0, 100.0), 10.0, BodyOptions::default())
            .unwrap();
        assert!(c.0 > b.0);
    }

    #[test]
    fn failed_load_leaves_world_untouched() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.json");
        let body = |id, shape| BodySnapshot {
            id,
            shape,
            position: Point::new(1.0, 1.0),
            angle: 0.0,
            linear_velocity: Point::default(),
            angular_velocity: 0.0,
            options: BodyOptions::default(),
        };
        let broken = WorldSnapshot::new(
            vec![
                body(1, ShapeSpec::Circle { radius: 0.5 }),
                // Collinear points enclose no area.
                body(
                    2,
                    ShapeSpec::Convex {
                        vertices: vec![
                            Point::new(0.0, 0.0),
                            Point::new(1.0, 0.0),
                            Point::new(2.0, 0.0),
                        ],
                    },
                ),
            ],
            Vec::new(),
        );
        snapshot::write_snapshot(&path, &broken).unwrap();

        let mut world = world();
        let a = world
            .add_circle(Point::new(100.0, 100.0), 20.0, BodyOptions::default())
            .unwrap();
        let b = world
            .add_circle(Point::new(200.0, 100.0), 20.0, BodyOptions::default())
            .unwrap();
        world
            .add_distance_joint(a, b, Point::new(100.0, 100.0), Point::new(200.0, 100.0))
            .unwrap();

        assert!(matches!(
            world.load(&path),
            Err(WorldError::InvalidGeometry(_))
        ));
        assert_eq!(world.body_count(), 2);
        assert_eq!(world.joint_count(), 1);
        assert!(world.contains_body(a) && world.contains_body(b));
        assert_eq!(world.bodies_at_point(Point::new(200.0, 100.0), false), vec![b]);
    }
}
