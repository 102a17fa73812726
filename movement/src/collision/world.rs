use nalgebra as na;
use rapier3d::parry::query::{Ray, ShapeCastOptions};
use rapier3d::parry::shape::{Ball, Capsule, Shape};
use rapier3d::prelude::{
    BroadPhaseBvh, Collider, ColliderBuilder, ColliderHandle, ColliderSet, IntegrationParameters,
    NarrowPhase, QueryFilter, QueryPipeline, RigidBodySet, UnitVector,
};

use super::{CastHit, SpatialQuery, capsule_support_point, facing_normal};
use crate::bitmask_flags::{CollisionLayer, LayerMask};
use crate::types::{Iso, Quat, Vec3};

/// Immutable world collider.
#[derive(Clone, Debug)]
pub struct WorldStaticDef {
    /// Stable id. Colliders are inserted in id order so handles never depend on input order.
    pub id: u32,
    pub translation: Vec3,
    pub rotation: Quat,
    pub shape: ColliderShapeDef,
    pub layers: LayerMask,
}

impl WorldStaticDef {
    pub fn new(id: u32, translation: Vec3, shape: ColliderShapeDef) -> Self {
        Self {
            id,
            translation,
            rotation: Quat::identity(),
            shape,
            layers: LayerMask::from_flags(&[CollisionLayer::Default]),
        }
    }

    /// Axis-aligned box centered at `center`.
    pub fn cuboid(id: u32, center: Vec3, half_extents: Vec3) -> Self {
        Self::new(id, center, ColliderShapeDef::Cuboid { half_extents })
    }

    /// Horizontal ground plane at height `y`.
    pub fn ground_plane(id: u32, y: f32) -> Self {
        Self::new(
            id,
            Vec3::new(0.0, y, 0.0),
            ColliderShapeDef::Plane {
                offset_along_normal: 0.0,
            },
        )
    }

    pub fn rotated(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_layers(mut self, layers: LayerMask) -> Self {
        self.layers = layers;
        self
    }

    #[inline]
    pub fn iso(&self) -> Iso {
        Iso::from_parts(na::Translation3::from(self.translation), self.rotation)
    }
}

#[derive(Clone, Debug)]
pub enum ColliderShapeDef {
    /// Infinite half-space whose surface normal is `rotation * +Y`, shifted along that normal.
    Plane { offset_along_normal: f32 },

    /// Oriented cuboid (meters).
    Cuboid { half_extents: Vec3 },

    Sphere { radius: f32 },

    /// Y-aligned capsule.
    CapsuleY { radius: f32, half_height: f32 },

    /// Y-aligned cylinder.
    CylinderY { radius: f32, half_height: f32 },
}

/// Builds a parentless Rapier collider placed at the def's pose, tagged with its layers.
pub fn collider_from_def(def: &WorldStaticDef) -> Collider {
    let builder = match &def.shape {
        ColliderShapeDef::Plane { .. } => ColliderBuilder::halfspace(UnitVector::new_normalize(
            Vec3::y(),
        )),
        ColliderShapeDef::Cuboid { half_extents } => {
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
        }
        ColliderShapeDef::Sphere { radius } => ColliderBuilder::ball(*radius),
        ColliderShapeDef::CapsuleY {
            radius,
            half_height,
        } => ColliderBuilder::capsule_y(*half_height, *radius),
        ColliderShapeDef::CylinderY {
            radius,
            half_height,
        } => ColliderBuilder::cylinder(*half_height, *radius),
    };

    let mut iso = def.iso();
    if let ColliderShapeDef::Plane {
        offset_along_normal,
    } = def.shape
    {
        let n = def.rotation * Vec3::y();
        iso.translation.vector += n * offset_along_normal;
    }

    let mut collider = builder.user_data(u128::from(def.layers.bits)).build();
    collider.set_position(iso);
    collider
}

/// Static collision scene answering [`SpatialQuery`] casts through Rapier's query pipeline.
pub struct CollisionWorld {
    bodies: RigidBodySet,
    colliders: ColliderSet,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
}

impl CollisionWorld {
    pub fn build(defs: impl IntoIterator<Item = WorldStaticDef>) -> Self {
        let mut defs: Vec<WorldStaticDef> = defs.into_iter().collect();
        defs.sort_by_key(|d| d.id);

        let bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();
        let mut modified_colliders = Vec::with_capacity(defs.len());
        for def in &defs {
            modified_colliders.push(colliders.insert(collider_from_def(def)));
        }

        let mut broad_phase = BroadPhaseBvh::new();
        let mut events = Vec::new();
        broad_phase.update(
            &IntegrationParameters::default(),
            &colliders,
            &bodies,
            &modified_colliders,
            &[],
            &mut events,
        );

        log::debug!("[CollisionWorld] built with {} static colliders", defs.len());

        Self {
            bodies,
            colliders,
            broad_phase,
            narrow_phase: NarrowPhase::default(),
        }
    }

    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    fn query_pipeline<'a>(&'a self, filter: QueryFilter<'a>) -> QueryPipeline<'a> {
        self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.bodies,
            &self.colliders,
            filter,
        )
    }

    /// Earliest shape-cast hit along a unit `dir`, as (distance, oriented normal).
    fn cast(
        &self,
        shape: &dyn Shape,
        pos: Iso,
        dir: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<(f32, Vec3)> {
        let accepts =
            move |_: ColliderHandle, co: &Collider| LayerMask::new(co.user_data as u32).intersects(mask);
        let pipeline = self.query_pipeline(QueryFilter::default().predicate(&accepts));

        let mut opts = ShapeCastOptions::with_max_time_of_impact(max_distance.max(0.0));
        opts.stop_at_penetration = true;

        let (_, hit) = pipeline.cast_shape(&pos, &dir, shape, opts)?;
        Some((hit.time_of_impact, facing_normal(hit.normal1.into_inner(), dir)))
    }
}

impl SpatialQuery for CollisionWorld {
    fn ray_cast(
        &self,
        origin: Vec3,
        dir: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<CastHit> {
        let dir = dir.try_normalize(1.0e-6)?;
        let accepts =
            move |_: ColliderHandle, co: &Collider| LayerMask::new(co.user_data as u32).intersects(mask);
        let pipeline = self.query_pipeline(QueryFilter::default().predicate(&accepts));

        let ray = Ray::new(na::Point3::from(origin), dir);
        let (_, hit) = pipeline.cast_ray_and_get_normal(&ray, max_distance.max(0.0), true)?;
        Some(CastHit {
            point: origin + dir * hit.time_of_impact,
            normal: facing_normal(hit.normal, dir),
            distance: hit.time_of_impact,
        })
    }

    fn sphere_cast(
        &self,
        center: Vec3,
        radius: f32,
        dir: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<CastHit> {
        let dir = dir.try_normalize(1.0e-6)?;
        let ball = Ball::new(radius.max(1.0e-4));
        let pos = Iso::translation(center.x, center.y, center.z);
        let (distance, normal) = self.cast(&ball, pos, dir, max_distance, mask)?;
        Some(CastHit {
            point: center + dir * distance - normal * ball.radius,
            normal,
            distance,
        })
    }

    fn capsule_cast(
        &self,
        a: Vec3,
        b: Vec3,
        radius: f32,
        dir: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<CastHit> {
        let dir = dir.try_normalize(1.0e-6)?;
        let mid = (a + b) * 0.5;
        let capsule = Capsule::new(
            na::Point3::from(a - mid),
            na::Point3::from(b - mid),
            radius.max(1.0e-4),
        );
        let pos = Iso::translation(mid.x, mid.y, mid.z);
        let (distance, normal) = self.cast(&capsule, pos, dir, max_distance, mask)?;
        let offset = dir * distance;
        Some(CastHit {
            point: capsule_support_point(a + offset, b + offset, capsule.radius, -normal),
            normal,
            distance,
        })
    }
}
