use crate::ecs::types::{NetLayer, Road, RoadBounds, RoadSegment};
use bevy_ecs::prelude::*;
use glam::Vec3;

/// What the cursor ray may hit. Disabled unless a tool asked for hits.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaycastSettings {
    pub enabled: bool,
    pub net_layers: NetLayer,
    pub allow_underground: bool,
    pub require_zones: bool,
}

impl Default for RaycastSettings {
    fn default() -> Self {
        Self { enabled: false, net_layers: NetLayer::ROAD, allow_underground: false, require_zones: false }
    }
}

impl RaycastSettings {
    /// Roads of any depth that carry zone blocks.
    pub fn for_existing_roads() -> Self {
        Self { enabled: true, net_layers: NetLayer::ROAD, allow_underground: true, require_zones: true }
    }

    pub fn accepts(&self, segment: &RoadSegment) -> bool {
        self.enabled
            && self.net_layers.intersects(segment.layer)
            && (self.allow_underground || !segment.underground)
            && (!self.require_zones || segment.zoneable)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir: dir.normalize_or_zero() }
    }

    /// Straight down onto `point` from `height` above it.
    pub fn down_onto(point: Vec3, height: f32) -> Self {
        Self::new(point + Vec3::Y * height, Vec3::NEG_Y)
    }
}

/// Cursor ray for this frame, if the cursor is over the world.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct CursorRay(pub Option<Ray>);

#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct RaycastHit {
    pub entity: Option<Entity>,
    pub distance: f32,
}

pub fn ray_aabb_intersection(origin: Vec3, dir: Vec3, min: Vec3, max: Vec3) -> Option<(f32, Vec3)> {
    let mut t_min: f32 = 0.0;
    let mut t_max: f32 = f32::INFINITY;
    let (origin_arr, dir_arr) = (origin.to_array(), dir.to_array());
    let (min_arr, max_arr) = (min.to_array(), max.to_array());
    for axis in 0..3 {
        let o = origin_arr[axis];
        let d = dir_arr[axis];
        if d.abs() < 1e-6 {
            if o < min_arr[axis] || o > max_arr[axis] {
                return None;
            }
            continue;
        }
        let inv_d = 1.0 / d;
        let mut t1 = (min_arr[axis] - o) * inv_d;
        let mut t2 = (max_arr[axis] - o) * inv_d;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }
        t_min = t_min.max(t1);
        t_max = t_max.min(t2);
        if t_min > t_max {
            return None;
        }
    }
    if t_max < 0.0 {
        return None;
    }
    let t_hit = if t_min >= 0.0 { t_min } else { t_max };
    Some((t_hit, origin + dir * t_hit))
}

/// Nearest accepted road under the cursor ray.
pub fn sys_raycast_roads(
    settings: Option<Res<RaycastSettings>>,
    cursor: Res<CursorRay>,
    roads: Query<(Entity, &RoadSegment, &RoadBounds), With<Road>>,
    mut hit: ResMut<RaycastHit>,
) {
    let mut nearest = RaycastHit::default();
    if let (Some(settings), Some(ray)) = (settings, cursor.0) {
        for (entity, segment, bounds) in &roads {
            if !settings.accepts(segment) {
                continue;
            }
            let Some((distance, _)) = ray_aabb_intersection(ray.origin, ray.dir, bounds.min, bounds.max) else {
                continue;
            };
            if nearest.entity.is_none() || distance < nearest.distance {
                nearest = RaycastHit { entity: Some(entity), distance };
            }
        }
    }
    if *hit != nearest {
        *hit = nearest;
    }
}
