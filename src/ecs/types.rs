use bevy_ecs::prelude::*;
use bitflags::bitflags;
use glam::{IVec2, Vec3};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

/// Which sides of a road segment permit adjacent zoning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ZoningMode {
    /// Both sides.
    #[default]
    Default,
    Left,
    Right,
    None,
}

impl ZoningMode {
    pub const ALL: [ZoningMode; 4] = [ZoningMode::Default, ZoningMode::Left, ZoningMode::Right, ZoningMode::None];

    pub fn next(self) -> Self {
        match self {
            ZoningMode::Default => ZoningMode::Left,
            ZoningMode::Left => ZoningMode::Right,
            ZoningMode::Right => ZoningMode::None,
            ZoningMode::None => ZoningMode::Default,
        }
    }

    /// Zoned depth per side, `x` = left and `y` = right.
    pub fn depths(self, max_depth: i32) -> IVec2 {
        let depth = max_depth.max(0);
        match self {
            ZoningMode::Default => IVec2::new(depth, depth),
            ZoningMode::Left => IVec2::new(depth, 0),
            ZoningMode::Right => IVec2::new(0, depth),
            ZoningMode::None => IVec2::ZERO,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ZoningMode::Default => "Default",
            ZoningMode::Left => "Left",
            ZoningMode::Right => "Right",
            ZoningMode::None => "None",
        }
    }
}

impl fmt::Display for ZoningMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ZoningMode {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ZoningMode::ALL
            .into_iter()
            .find(|mode| mode.label().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| anyhow::anyhow!("Unknown zoning mode '{value}'"))
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct NetLayer: u32 {
        const ROAD = 1 << 0;
        const TRAIN_TRACK = 1 << 1;
        const TRAM_TRACK = 1 << 2;
        const PATHWAY = 1 << 3;
        const POWER_LINE = 1 << 4;
    }
}

impl Default for NetLayer {
    fn default() -> Self {
        NetLayer::ROAD
    }
}

// ---------- Road network ----------

/// Marks a persistent road network segment.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Road;

#[derive(Component, Debug, Clone, Copy)]
pub struct RoadSegment {
    pub layer: NetLayer,
    pub underground: bool,
    /// The segment's prefab carries zone blocks.
    pub zoneable: bool,
}

impl Default for RoadSegment {
    fn default() -> Self {
        Self { layer: NetLayer::ROAD, underground: false, zoneable: true }
    }
}

/// Axis-aligned bounds used by the cursor ray-cast.
#[derive(Component, Debug, Clone, Copy)]
pub struct RoadBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl RoadBounds {
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ZoningInfo {
    pub mode: ZoningMode,
}

/// Unconfirmed edit shown ahead of the operator's confirmation.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeculativePreview {
    pub depths: IVec2,
}

impl SpeculativePreview {
    pub fn for_mode(mode: ZoningMode, max_depth: i32) -> Self {
        Self { depths: mode.depths(max_depth) }
    }
}

#[derive(Component, Debug, Clone, Default)]
pub struct SubBlocks(pub SmallVec<[Entity; 4]>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockSide {
    Left,
    Right,
}

/// Zoning sub-region owned by a road.
#[derive(Component, Debug, Clone, Copy)]
pub struct ZoneBlock {
    pub road: Entity,
    pub side: BlockSide,
    /// Effective zoned depth after the last evaluation.
    pub depth: i32,
}

/// Requests re-evaluation by the zoning simulation.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Updated;

/// Road spawned this cycle and not yet seen by the zoning simulation.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Created;

/// Renderer outline, written only by the highlight reconciliation.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Highlighted;

/// Description used by [`crate::ecs::ZoneToolsWorld::spawn_road`].
#[derive(Debug, Clone, Copy)]
pub struct RoadSpec {
    pub min: Vec3,
    pub max: Vec3,
    pub segment: RoadSegment,
    pub zoning: Option<ZoningMode>,
}

impl RoadSpec {
    pub fn surface(min: Vec3, max: Vec3) -> Self {
        Self { min, max, segment: RoadSegment::default(), zoning: None }
    }

    pub fn with_zoning(mut self, mode: ZoningMode) -> Self {
        self.zoning = Some(mode);
        self
    }

    pub fn underground(mut self) -> Self {
        self.segment.underground = true;
        self
    }

    pub fn non_zoneable(mut self) -> Self {
        self.segment.zoneable = false;
        self
    }

    pub fn on_layer(mut self, layer: NetLayer) -> Self {
        self.segment.layer = layer;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_cycle_visits_every_mode_in_order() {
        let mut mode = ZoningMode::Default;
        let mut seen = Vec::new();
        for _ in 0..4 {
            mode = mode.next();
            seen.push(mode);
        }
        assert_eq!(seen, vec![ZoningMode::Left, ZoningMode::Right, ZoningMode::None, ZoningMode::Default]);
    }

    #[test]
    fn depths_follow_permitted_sides() {
        assert_eq!(ZoningMode::Default.depths(6), IVec2::new(6, 6));
        assert_eq!(ZoningMode::Left.depths(6), IVec2::new(6, 0));
        assert_eq!(ZoningMode::Right.depths(6), IVec2::new(0, 6));
        assert_eq!(ZoningMode::None.depths(6), IVec2::ZERO);
        assert_eq!(ZoningMode::Default.depths(-3), IVec2::ZERO);
    }

    #[test]
    fn parses_binding_strings() {
        assert_eq!("Left".parse::<ZoningMode>().unwrap(), ZoningMode::Left);
        assert_eq!(" none ".parse::<ZoningMode>().unwrap(), ZoningMode::None);
        assert!("diagonal".parse::<ZoningMode>().is_err());
        assert_eq!(ZoningMode::Right.to_string(), "Right");
    }
}
