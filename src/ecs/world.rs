use super::systems::{
    sys_apply_mode_to_new_roads, sys_evaluate_zone_blocks, sys_raycast_roads, CursorRay, Ray, RaycastHit,
    RaycastSettings,
};
use super::types::*;
use crate::config::ZoneToolsConfig;
use crate::events::{EventBus, ZoneToolEvent};
use crate::input::{Input, InputEvent};
use crate::tool::bridge::BridgeObserver;
use crate::tool::{
    sys_clear_stale_previews, sys_existing_roads_tool, sys_reconcile_highlights, sys_zone_tool_bridge,
    ExistingRoadsTool, HighlightRequests, PhotoMode, PrefabRegistry, PreviewBackup, PreviewManager, RoadPrefab,
    ToolId, ToolState, ToolSystem, UiSnapshot, UiTrigger, UiTriggers, ZoneToolSettings, ZoneToolUi,
};
use bevy_ecs::prelude::*;
use bevy_ecs::schedule::{ExecutorKind, IntoSystemConfigs};
use bevy_tasks::{ComputeTaskPool, TaskPool};
use glam::{IVec2, Vec3};
use smallvec::smallvec;
use tracing::debug;

const HOVER_RAY_HEIGHT: f32 = 100.0;

// ---------- World container ----------
pub struct ZoneToolsWorld {
    pub world: World,
    /// Input, tool phases, then the output barrier.
    schedule_tool: Schedule,
    /// Zoning simulation; reads what the barrier flushed.
    schedule_sim: Schedule,
}

impl Default for ZoneToolsWorld {
    fn default() -> Self {
        Self::new(&ZoneToolsConfig::default())
    }
}

impl ZoneToolsWorld {
    pub fn new(config: &ZoneToolsConfig) -> Self {
        ComputeTaskPool::get_or_init(TaskPool::default);

        let settings = ZoneToolSettings::from_config(&config.tool);
        let mut world = World::new();
        world.insert_resource(Input::from_input_config(&config.input));
        world.insert_resource(ExistingRoadsTool::new(&settings));
        world.insert_resource(settings);
        world.insert_resource(PreviewManager::default());
        world.insert_resource(HighlightRequests::default());
        world.insert_resource(ZoneToolUi::default());
        world.insert_resource(UiTriggers::default());
        world.insert_resource(PhotoMode::default());
        world.insert_resource(RaycastSettings::default());
        world.insert_resource(CursorRay::default());
        world.insert_resource(RaycastHit::default());
        world.insert_resource(PrefabRegistry::with_defaults());
        world.insert_resource(EventBus::default());
        let mut tools = ToolSystem::new();
        let observer = tools.subscribe();
        world.insert_resource(tools);
        world.insert_resource(BridgeObserver(Some(observer)));

        let mut schedule_tool = Schedule::default();
        schedule_tool.set_executor_kind(ExecutorKind::SingleThreaded);
        schedule_tool.add_systems(
            (
                sys_raycast_roads,
                sys_zone_tool_bridge,
                sys_existing_roads_tool,
                sys_reconcile_highlights,
                sys_clear_stale_previews,
                apply_deferred,
            )
                .chain_ignore_deferred(),
        );

        let mut schedule_sim = Schedule::default();
        schedule_sim.set_executor_kind(ExecutorKind::SingleThreaded);
        schedule_sim.add_systems((sys_apply_mode_to_new_roads, sys_evaluate_zone_blocks).chain());

        Self { world, schedule_tool, schedule_sim }
    }

    /// One frame: tool phases, barrier, zoning simulation.
    pub fn step(&mut self) {
        self.schedule_tool.run(&mut self.world);
        self.schedule_sim.run(&mut self.world);
        self.world.resource_mut::<Input>().clear_frame();
    }

    /// Turns the tool off, lets it restore its previews, and leaves the
    /// tool-switching observer list.
    pub fn shutdown(&mut self) {
        if self.world.resource::<ToolSystem>().is_active(ToolId::ZoneExistingRoads) {
            self.world.resource_mut::<ToolSystem>().activate(ToolId::Default);
        }
        self.step();
        let observer = self.world.resource_mut::<BridgeObserver>().0.take();
        if let Some(id) = observer {
            self.world.resource_mut::<ToolSystem>().unsubscribe(id);
        }
        debug!("zone tools shut down");
    }

    // ---------- Road network ----------

    pub fn spawn_road(&mut self, spec: RoadSpec) -> Entity {
        let road = self
            .world
            .spawn((Road, spec.segment, RoadBounds { min: spec.min, max: spec.max }, Created))
            .id();
        if let Some(mode) = spec.zoning {
            self.world.entity_mut(road).insert(ZoningInfo { mode });
        }
        if spec.segment.zoneable {
            let left = self.world.spawn((ZoneBlock { road, side: BlockSide::Left, depth: 0 }, Updated)).id();
            let right = self.world.spawn((ZoneBlock { road, side: BlockSide::Right, depth: 0 }, Updated)).id();
            self.world.entity_mut(road).insert(SubBlocks(smallvec![left, right]));
        }
        road
    }

    pub fn despawn_road(&mut self, road: Entity) -> bool {
        let blocks = self.world.get::<SubBlocks>(road).map(|blocks| blocks.0.clone()).unwrap_or_default();
        for block in blocks {
            self.world.despawn(block);
        }
        self.world.despawn(road)
    }

    pub fn road_count(&mut self) -> usize {
        self.world.query_filtered::<Entity, With<Road>>().iter(&self.world).count()
    }

    // ---------- Host inputs ----------

    pub fn push_input(&mut self, event: InputEvent) {
        self.world.resource_mut::<Input>().push(event);
    }

    pub fn set_cursor_ray(&mut self, ray: Option<Ray>) {
        self.world.resource_mut::<CursorRay>().0 = ray;
    }

    /// Points the cursor straight down at the centre of `road`.
    pub fn hover_road(&mut self, road: Entity) -> bool {
        let Some(center) = self.world.get::<RoadBounds>(road).map(RoadBounds::center) else {
            return false;
        };
        self.set_cursor_ray(Some(Ray::down_onto(center, HOVER_RAY_HEIGHT)));
        true
    }

    pub fn hover_point(&mut self, point: Vec3) {
        self.set_cursor_ray(Some(Ray::down_onto(point, HOVER_RAY_HEIGHT)));
    }

    pub fn clear_cursor(&mut self) {
        self.set_cursor_ray(None);
    }

    pub fn trigger(&mut self, trigger: UiTrigger) {
        self.world.resource_mut::<UiTriggers>().push(trigger);
    }

    pub fn set_photo_mode(&mut self, enabled: bool) {
        self.world.resource_mut::<PhotoMode>().0 = enabled;
    }

    pub fn activate_tool(&mut self, tool: ToolId) {
        self.world.resource_mut::<ToolSystem>().activate(tool);
    }

    pub fn set_net_prefab(&mut self, prefab: Option<RoadPrefab>) {
        self.world.resource_mut::<ToolSystem>().set_net_prefab(prefab);
    }

    /// Drops the road ray-cast, as on hosts that do not provide one.
    pub fn remove_raycast_support(&mut self) {
        self.world.remove_resource::<RaycastSettings>();
    }

    // ---------- Observation ----------

    pub fn drain_events(&mut self) -> Vec<ZoneToolEvent> {
        self.world.resource_mut::<EventBus>().drain()
    }

    pub fn ui_snapshot(&self) -> UiSnapshot {
        self.world.resource::<ZoneToolUi>().snapshot(self.world.resource::<PhotoMode>().0)
    }

    pub fn active_tool(&self) -> ToolId {
        self.world.resource::<ToolSystem>().active()
    }

    pub fn tool_state(&self) -> ToolState {
        self.world.resource::<ExistingRoadsTool>().state()
    }

    pub fn hovered(&self) -> Option<Entity> {
        self.world.resource::<ExistingRoadsTool>().hovered()
    }

    pub fn selection(&self) -> Vec<Entity> {
        let mut selected: Vec<Entity> = self.world.resource::<ExistingRoadsTool>().selected().iter().copied().collect();
        selected.sort();
        selected
    }

    pub fn safe_prefab(&self) -> Option<RoadPrefab> {
        self.world.resource::<ExistingRoadsTool>().safe_prefab().cloned()
    }

    pub fn backup(&self, road: Entity) -> Option<PreviewBackup> {
        self.world.resource::<PreviewManager>().backup(road).copied()
    }

    pub fn backup_count(&self) -> usize {
        self.world.resource::<PreviewManager>().backup_count()
    }

    pub fn zoning_mode(&self, road: Entity) -> Option<ZoningMode> {
        self.world.get::<ZoningInfo>(road).map(|info| info.mode)
    }

    pub fn preview_depths(&self, road: Entity) -> Option<IVec2> {
        self.world.get::<SpeculativePreview>(road).map(|preview| preview.depths)
    }

    pub fn is_highlighted(&self, entity: Entity) -> bool {
        self.world.get::<Highlighted>(entity).is_some()
    }

    pub fn is_updated(&self, entity: Entity) -> bool {
        self.world.get::<Updated>(entity).is_some()
    }

    /// Evaluated zoned depth of a road's blocks, `x` = left and `y` = right.
    pub fn block_depths(&self, road: Entity) -> Option<IVec2> {
        let blocks = self.world.get::<SubBlocks>(road)?;
        let mut depths = IVec2::ZERO;
        for &block in blocks.0.iter() {
            let Some(block) = self.world.get::<ZoneBlock>(block) else {
                continue;
            };
            match block.side {
                BlockSide::Left => depths.x = block.depth,
                BlockSide::Right => depths.y = block.depth,
            }
        }
        Some(depths)
    }

    pub fn roads_with_preview(&mut self) -> usize {
        self.world.query_filtered::<Entity, With<SpeculativePreview>>().iter(&self.world).count()
    }
}
