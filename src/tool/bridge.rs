use super::existing_roads::ExistingRoadsTool;
use super::tool_system::{ToolId, ToolNotification, ToolObserverId, ToolSystem};
use super::ZoneToolSettings;
use crate::ecs::systems::RaycastSettings;
use crate::ecs::ZoningMode;
use crate::events::{EventBus, ZoneToolEvent};
use crate::input::{Input, InputAction};
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Panel state shared between the UI layer and the tool.
#[derive(Resource, Debug, Clone, Default)]
pub struct ZoneToolUi {
    visible: bool,
    zoning_mode: ZoningMode,
    apply_to_new_roads: bool,
    tool_enabled: bool,
    auto_opened: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiTrigger {
    SetZoningMode(ZoningMode),
    SetApplyToNewRoads(bool),
    SetToolEnabled(bool),
    TogglePanel,
}

/// Triggers raised by the UI since the last cycle.
#[derive(Resource, Debug, Default)]
pub struct UiTriggers(Vec<UiTrigger>);

impl UiTriggers {
    pub fn push(&mut self, trigger: UiTrigger) {
        self.0.push(trigger);
    }

    pub fn drain(&mut self) -> Vec<UiTrigger> {
        std::mem::take(&mut self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhotoMode(pub bool);

/// The bridge's registration with the tool-switching observer list.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct BridgeObserver(pub Option<ToolObserverId>);

/// What the UI binds to, keyed the way the panel reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiSnapshot {
    pub zoning_mode: ZoningMode,
    pub apply_to_new_roads: bool,
    pub tool_enabled: bool,
    pub visible: bool,
    pub photomode: bool,
}

impl ZoneToolUi {
    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn zoning_mode(&self) -> ZoningMode {
        self.zoning_mode
    }

    pub fn set_zoning_mode(&mut self, mode: ZoningMode) {
        self.zoning_mode = mode;
    }

    pub fn apply_to_new_roads(&self) -> bool {
        self.apply_to_new_roads
    }

    pub fn tool_enabled(&self) -> bool {
        self.tool_enabled
    }

    pub fn auto_opened(&self) -> bool {
        self.auto_opened
    }

    pub fn snapshot(&self, photomode: bool) -> UiSnapshot {
        UiSnapshot {
            zoning_mode: self.zoning_mode,
            apply_to_new_roads: self.apply_to_new_roads,
            tool_enabled: self.tool_enabled,
            visible: self.visible,
            photomode,
        }
    }

    pub fn apply_trigger(&mut self, trigger: UiTrigger) {
        match trigger {
            UiTrigger::SetZoningMode(mode) => self.zoning_mode = mode,
            UiTrigger::SetApplyToNewRoads(enabled) => self.apply_to_new_roads = enabled,
            UiTrigger::SetToolEnabled(enabled) => self.tool_enabled = enabled,
            UiTrigger::TogglePanel => {
                self.visible = !self.visible;
                self.auto_opened = false;
            }
        }
    }

    fn set_visible(&mut self, visible: bool, auto: bool) {
        self.visible = visible;
        self.auto_opened = visible && auto;
    }
}

fn publish_visibility(ui: &ZoneToolUi, was_visible: bool, reason: &'static str, events: &mut EventBus) {
    if ui.visible != was_visible {
        debug!(visible = ui.visible, reason, "zoning panel visibility changed");
        events.push(ZoneToolEvent::PanelVisibility { visible: ui.visible, reason });
    }
}

/// Syncs the panel with tool switching: UI triggers, the toggle hotkey,
/// road-tool auto-open, and enabling/disabling the zoning tool.
#[allow(clippy::too_many_arguments)]
pub fn sys_zone_tool_bridge(
    mut ui: ResMut<ZoneToolUi>,
    mut triggers: ResMut<UiTriggers>,
    mut tools: ResMut<ToolSystem>,
    mut roads_tool: ResMut<ExistingRoadsTool>,
    mut events: ResMut<EventBus>,
    observer: Res<BridgeObserver>,
    photo: Res<PhotoMode>,
    input: Res<Input>,
    settings: Res<ZoneToolSettings>,
    raycast: Option<Res<RaycastSettings>>,
) {
    let own = ToolId::ZoneExistingRoads;

    let notifications = observer.0.map(|id| tools.drain(id)).unwrap_or_default();
    let mut road_tool_changed = false;
    for notification in &notifications {
        match notification {
            ToolNotification::ToolChanged { tool } => {
                ui.tool_enabled = *tool == own;
                road_tool_changed = true;
            }
            ToolNotification::PrefabChanged { .. } => road_tool_changed = true,
        }
    }
    if road_tool_changed && !tools.is_active(own) {
        let was_visible = ui.visible;
        if tools.is_zonable_road_tool(tools.active()) {
            if settings.auto_open_panel_for_road_tools && !ui.visible && tools.previous() != own {
                ui.set_visible(true, true);
            }
        } else if ui.auto_opened {
            ui.set_visible(false, false);
        }
        publish_visibility(&ui, was_visible, "road tool", &mut events);
    }

    for trigger in triggers.drain() {
        let was_visible = ui.visible;
        ui.apply_trigger(trigger);
        publish_visibility(&ui, was_visible, "panel toggled", &mut events);
    }
    if input.was_pressed(InputAction::TogglePanel) {
        let was_visible = ui.visible;
        ui.apply_trigger(UiTrigger::TogglePanel);
        publish_visibility(&ui, was_visible, "hotkey", &mut events);
    }

    if ui.tool_enabled && (!ui.visible || photo.0) {
        debug!(visible = ui.visible, photomode = photo.0, "zoning tool force-disabled");
        ui.tool_enabled = false;
    }

    if ui.tool_enabled && !tools.is_active(own) {
        if raycast.is_none() {
            roads_tool.report_unavailable("road ray-cast is not available", &mut events);
            ui.tool_enabled = false;
            return;
        }
        info!("zoning tool enabled from the panel");
        tools.activate(own);
    } else if !ui.tool_enabled && tools.is_active(own) {
        let fallback = match tools.previous() {
            previous if previous == own => ToolId::Default,
            previous => previous,
        };
        info!(fallback = ?fallback, "zoning tool disabled");
        tools.activate(fallback);
    }
}
