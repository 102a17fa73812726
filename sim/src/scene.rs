//! Demo collision scene.
//!
//! Three lanes running along +Z over one floor:
//! - x = -6: three steps up to a landing that ends in a 0.6 m ledge
//! - x = 0: a walkable 25 degree ramp
//! - x = 6: a 60 degree ramp the character slides off
//!
//! A wall closes the far end.

use movement::{CollisionWorld, Quat, Vec3, WorldStaticDef};

pub const STAIR_LANE_X: f32 = -6.0;
pub const RAMP_LANE_X: f32 = 0.0;
pub const STEEP_LANE_X: f32 = 6.0;

const STEP_RISE: f32 = 0.2;
const STEP_RUN: f32 = 0.6;
const STAIR_START_Z: f32 = 6.0;
const LANDING_END_Z: f32 = 12.0;

pub fn demo_world() -> CollisionWorld {
    let mut defs = vec![WorldStaticDef::cuboid(
        1,
        Vec3::new(0.0, -0.5, 20.0),
        Vec3::new(30.0, 0.5, 40.0),
    )];

    // Each step runs to the landing's far edge, so the last one is the landing itself.
    for i in 0..3u32 {
        let top = STEP_RISE * (i + 1) as f32;
        let start = STAIR_START_Z + STEP_RUN * i as f32;
        let half_z = (LANDING_END_Z - start) * 0.5;
        defs.push(WorldStaticDef::cuboid(
            10 + i,
            Vec3::new(STAIR_LANE_X, top * 0.5, start + half_z),
            Vec3::new(2.0, top * 0.5, half_z),
        ));
    }

    defs.push(
        WorldStaticDef::cuboid(20, Vec3::new(RAMP_LANE_X, 0.0, 16.0), Vec3::new(2.0, 0.5, 4.0))
            .rotated(Quat::from_axis_angle(&Vec3::x_axis(), -25f32.to_radians())),
    );
    defs.push(
        WorldStaticDef::cuboid(21, Vec3::new(STEEP_LANE_X, 0.0, 16.0), Vec3::new(2.0, 0.5, 4.0))
            .rotated(Quat::from_axis_angle(&Vec3::x_axis(), -60f32.to_radians())),
    );

    defs.push(WorldStaticDef::cuboid(
        40,
        Vec3::new(0.0, 2.0, 45.0),
        Vec3::new(30.0, 2.0, 0.5),
    ));

    CollisionWorld::build(defs)
}
