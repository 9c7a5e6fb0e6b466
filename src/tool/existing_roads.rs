use super::bridge::ZoneToolUi;
use super::highlight::HighlightRequests;
use super::prefab_safety::{PrefabRegistry, SafePrefabResolver};
use super::preview::{PreviewManager, PreviewRequest, RoadLookup};
use super::tool_system::{RoadPrefab, ToolId, ToolSystem};
use super::{flag_blocks_for_update, ZoneToolSettings};
use crate::ecs::systems::{RaycastHit, RaycastSettings};
use crate::ecs::{ZoningInfo, ZoningMode};
use crate::events::{EventBus, ZoneToolEvent};
use crate::input::{Input, InputAction};
use bevy_ecs::prelude::*;
use bevy_ecs::system::SystemParam;
use std::collections::HashSet;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolState {
    Inactive,
    Idle,
    Previewing,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub written: usize,
    pub unchanged: usize,
    pub missing: usize,
}

/// Everything a tool cycle reads or writes besides the tool itself.
#[derive(SystemParam)]
pub struct ToolCycle<'w, 's> {
    commands: Commands<'w, 's>,
    preview: ResMut<'w, PreviewManager>,
    highlight: ResMut<'w, HighlightRequests>,
    events: ResMut<'w, EventBus>,
    roads: RoadLookup<'w, 's>,
}

/// Hover/select/apply controller for re-zoning already built roads.
#[derive(Resource, Debug)]
pub struct ExistingRoadsTool {
    state: ToolState,
    selected: HashSet<Entity>,
    hovered: Option<Entity>,
    reported_unavailable: bool,
    safe_prefab: SafePrefabResolver,
}

impl Default for ExistingRoadsTool {
    fn default() -> Self {
        Self::new(&ZoneToolSettings::default())
    }
}

impl ExistingRoadsTool {
    pub fn new(settings: &ZoneToolSettings) -> Self {
        Self {
            state: ToolState::Inactive,
            selected: HashSet::new(),
            hovered: None,
            reported_unavailable: false,
            safe_prefab: SafePrefabResolver::new(settings.safe_prefab_max_attempts),
        }
    }

    pub fn state(&self) -> ToolState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state != ToolState::Inactive
    }

    pub fn selected(&self) -> &HashSet<Entity> {
        &self.selected
    }

    pub fn hovered(&self) -> Option<Entity> {
        self.hovered
    }

    pub fn safe_prefab(&self) -> Option<&RoadPrefab> {
        self.safe_prefab.resolved()
    }

    pub fn safe_prefab_resolver(&self) -> &SafePrefabResolver {
        &self.safe_prefab
    }

    /// True the first time only; later calls stay quiet.
    pub fn report_unavailable(&mut self, reason: &'static str, events: &mut EventBus) -> bool {
        if self.reported_unavailable {
            return false;
        }
        self.reported_unavailable = true;
        warn!(reason, "zoning tool unavailable; staying inert");
        events.push(ZoneToolEvent::ToolUnavailable { reason });
        true
    }

    fn start(
        &mut self,
        cycle: &mut ToolCycle,
        ui: &mut ZoneToolUi,
        raycast: &mut RaycastSettings,
        tools: &ToolSystem,
        registry: &PrefabRegistry,
    ) {
        self.selected.clear();
        self.hovered = None;
        ui.set_zoning_mode(ZoningMode::Default);
        *raycast = RaycastSettings::for_existing_roads();
        self.safe_prefab.ensure(tools, registry);
        cycle.preview.mark_dirty();
        self.state = ToolState::Idle;
        info!("existing-roads zoning tool activated");
        cycle.events.push(ZoneToolEvent::ToolActivated);
    }

    /// Safe to call repeatedly.
    fn stop(&mut self, cycle: &mut ToolCycle, raycast: Option<&mut RaycastSettings>) {
        let report = cycle.preview.restore_and_clear(&cycle.roads, &mut cycle.commands);
        if report.restored + report.skipped > 0 {
            cycle.events.push(ZoneToolEvent::PreviewRestored { restored: report.restored, skipped: report.skipped });
        }
        self.clear_selection_and_hover(&mut cycle.highlight);
        if let Some(raycast) = raycast {
            *raycast = RaycastSettings::default();
        }
        if self.state != ToolState::Inactive {
            info!("existing-roads zoning tool deactivated");
            cycle.events.push(ZoneToolEvent::ToolDeactivated);
        }
        self.state = ToolState::Inactive;
    }

    fn sync_hover(&mut self, hit: Option<Entity>, cycle: &mut ToolCycle) {
        let hit = hit.filter(|entity| cycle.roads.contains(*entity));
        if hit == self.hovered {
            return;
        }
        if let Some(previous) = self.hovered {
            if !self.selected.contains(&previous) {
                cycle.highlight.request(previous, false);
            }
        }
        if let Some(entity) = hit {
            cycle.highlight.request(entity, true);
        }
        self.hovered = hit;
        cycle.preview.mark_dirty();
        cycle.events.push(ZoneToolEvent::HoverChanged { entity: hit });
    }

    fn add_hovered_to_selection(&mut self, cycle: &mut ToolCycle) {
        let Some(hovered) = self.hovered else {
            return;
        };
        if !cycle.roads.contains(hovered) {
            return;
        }
        if self.selected.insert(hovered) {
            cycle.highlight.request(hovered, true);
            cycle.preview.mark_dirty();
            cycle.events.push(ZoneToolEvent::SelectionAdded { entity: hovered });
        }
    }

    fn clear_selection_and_hover(&mut self, highlight: &mut HighlightRequests) {
        for entity in self.selected.drain() {
            highlight.request(entity, false);
        }
        if let Some(hovered) = self.hovered.take() {
            highlight.request(hovered, false);
        }
    }

    /// Writes `desired` to every selected road whose committed mode differs
    /// and queues its zone blocks for re-evaluation. Clears the selection.
    fn apply_selection(&mut self, desired: ZoningMode, cycle: &mut ToolCycle) -> ApplyReport {
        let mut report = ApplyReport::default();
        for &road in &self.selected {
            let Ok((zoning, _, blocks)) = cycle.roads.get(road) else {
                report.missing += 1;
                continue;
            };
            let current = zoning.map(|info| info.mode).unwrap_or_default();
            if current == desired {
                report.unchanged += 1;
                continue;
            }
            if let Some(mut road_commands) = cycle.commands.get_entity(road) {
                road_commands.try_insert(ZoningInfo { mode: desired });
            }
            flag_blocks_for_update(&mut cycle.commands, blocks);
            cycle.events.push(ZoneToolEvent::ModeApplied { entity: road, from: current, to: desired });
            report.written += 1;
        }

        for entity in self.selected.drain() {
            if Some(entity) != self.hovered {
                cycle.highlight.request(entity, false);
            }
        }
        report
    }

    fn refresh_preview(&mut self, mode: ZoningMode, block_depth: i32, cycle: &mut ToolCycle) {
        if cycle.preview.last_mode() != Some(mode) {
            cycle.preview.mark_dirty();
        }
        let request = PreviewRequest { selected: &self.selected, hovered: self.hovered, mode, block_depth };
        if let Some(targets) = cycle.preview.update_preview(&request, &cycle.roads, &mut cycle.commands) {
            cycle.events.push(ZoneToolEvent::PreviewRefreshed { targets, mode });
        }
    }

    fn update_state(&mut self, preview: &PreviewManager) {
        if self.state == ToolState::Inactive {
            return;
        }
        self.state = if preview.backup_count() > 0 { ToolState::Previewing } else { ToolState::Idle };
    }
}

#[allow(clippy::too_many_arguments)]
pub fn sys_existing_roads_tool(
    mut tool: ResMut<ExistingRoadsTool>,
    mut cycle: ToolCycle,
    mut ui: ResMut<ZoneToolUi>,
    mut raycast: Option<ResMut<RaycastSettings>>,
    hit: Res<RaycastHit>,
    tools: Res<ToolSystem>,
    registry: Res<PrefabRegistry>,
    input: Res<Input>,
    settings: Res<ZoneToolSettings>,
) {
    if !tools.is_active(ToolId::ZoneExistingRoads) {
        if tool.is_running() {
            tool.stop(&mut cycle, raycast.as_deref_mut());
        }
        return;
    }

    let Some(raycast) = raycast.as_deref_mut() else {
        tool.report_unavailable("road ray-cast is not available", &mut cycle.events);
        return;
    };
    if !tool.is_running() {
        tool.start(&mut cycle, &mut ui, raycast, &tools, &registry);
    }
    tool.safe_prefab.ensure(&tools, &registry);

    tool.sync_hover(hit.entity, &mut cycle);

    if input.was_pressed(InputAction::Cancel) {
        let report = cycle.preview.restore_and_clear(&cycle.roads, &mut cycle.commands);
        tool.clear_selection_and_hover(&mut cycle.highlight);
        debug!(restored = report.restored, skipped = report.skipped, "zoning edit cancelled");
        cycle.events.push(ZoneToolEvent::PreviewCancelled);
        tool.update_state(&cycle.preview);
        return;
    }

    if input.was_pressed(InputAction::SecondaryApply) {
        let mode = ui.zoning_mode().next();
        ui.set_zoning_mode(mode);
        cycle.preview.mark_dirty();
        cycle.events.push(ZoneToolEvent::ModeCycled { mode });
    }

    let mode = ui.zoning_mode();
    tool.refresh_preview(mode, settings.block_depth, &mut cycle);

    if input.was_pressed(InputAction::Apply) || input.is_held(InputAction::Apply) {
        tool.add_hovered_to_selection(&mut cycle);
    }

    if input.was_released(InputAction::Apply) {
        let report = tool.apply_selection(mode, &mut cycle);
        let discarded = cycle.preview.discard_backups(&cycle.roads, &mut cycle.commands);
        // The refresh reads flushed state, so it waits for the next cycle.
        cycle.preview.mark_dirty();
        debug!(written = report.written, unchanged = report.unchanged, discarded, "zoning mode applied");
        cycle.events.push(ZoneToolEvent::ApplyFinished {
            written: report.written,
            unchanged: report.unchanged,
            missing: report.missing,
        });
    }

    tool.update_state(&cycle.preview);
}
