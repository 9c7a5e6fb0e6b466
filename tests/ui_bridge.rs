use bevy_ecs::entity::Entity;
use glam::Vec3;
use winit::event::MouseButton;
use winit::keyboard::NamedKey;
use zone_tools::config::ZoneToolsConfig;
use zone_tools::ecs::{RoadSpec, ZoningMode};
use zone_tools::events::ZoneToolEvent;
use zone_tools::input::InputEvent;
use zone_tools::tool::{RoadPrefab, ToolId, ToolState, UiSnapshot, UiTrigger};
use zone_tools::ZoneToolsWorld;

fn enable_from_panel(world: &mut ZoneToolsWorld) {
    world.trigger(UiTrigger::TogglePanel);
    world.trigger(UiTrigger::SetToolEnabled(true));
    world.step();
}

fn right_zoned_road(world: &mut ZoneToolsWorld) -> Entity {
    world.spawn_road(RoadSpec::surface(Vec3::ZERO, Vec3::new(8.0, 0.2, 2.0)).with_zoning(ZoningMode::Right))
}

fn hover_and_select(world: &mut ZoneToolsWorld, road: Entity) {
    world.hover_road(road);
    world.push_input(InputEvent::mouse(MouseButton::Left, true));
    world.step();
    assert_eq!(world.selection(), vec![road]);
    assert!(world.preview_depths(road).is_some());
    assert!(world.is_highlighted(road));
}

fn assert_rolled_back(world: &ZoneToolsWorld, road: Entity) {
    assert_eq!(world.preview_depths(road), None);
    assert_eq!(world.zoning_mode(road), Some(ZoningMode::Right));
    assert_eq!(world.backup_count(), 0);
    assert!(world.selection().is_empty());
    assert!(!world.is_highlighted(road));
}

fn press_shift_z(world: &mut ZoneToolsWorld) {
    world.push_input(InputEvent::named(NamedKey::Shift, true));
    world.push_input(InputEvent::character("z", true));
    world.step();
    world.push_input(InputEvent::character("z", false));
    world.push_input(InputEvent::named(NamedKey::Shift, false));
}

#[test]
fn snapshot_reflects_panel_state() {
    let mut world = ZoneToolsWorld::default();
    world.trigger(UiTrigger::SetApplyToNewRoads(true));
    world.trigger(UiTrigger::SetZoningMode(ZoningMode::Left));
    world.set_photo_mode(true);
    world.step();
    assert_eq!(
        world.ui_snapshot(),
        UiSnapshot {
            zoning_mode: ZoningMode::Left,
            apply_to_new_roads: true,
            tool_enabled: false,
            visible: false,
            photomode: true,
        }
    );
}

#[test]
fn hiding_the_panel_disables_the_tool() {
    let mut world = ZoneToolsWorld::default();
    let road = right_zoned_road(&mut world);
    world.activate_tool(ToolId::Net);
    world.step();
    enable_from_panel(&mut world);
    assert_eq!(world.active_tool(), ToolId::ZoneExistingRoads);
    assert_eq!(world.tool_state(), ToolState::Idle);
    hover_and_select(&mut world, road);

    press_shift_z(&mut world);
    assert_rolled_back(&world, road);
    let snapshot = world.ui_snapshot();
    assert!(!snapshot.visible);
    assert!(!snapshot.tool_enabled);
    assert_eq!(world.active_tool(), ToolId::Net, "disabling returns to the previous tool");
    assert_eq!(world.tool_state(), ToolState::Inactive);
}

#[test]
fn hotkey_toggles_panel() {
    let mut world = ZoneToolsWorld::default();
    press_shift_z(&mut world);
    assert!(world.ui_snapshot().visible);
    assert!(world
        .drain_events()
        .contains(&ZoneToolEvent::PanelVisibility { visible: true, reason: "hotkey" }));

    world.push_input(InputEvent::character("z", true));
    world.step();
    assert!(world.ui_snapshot().visible, "plain z is not the toggle chord");

    world.push_input(InputEvent::character("z", false));
    press_shift_z(&mut world);
    assert!(!world.ui_snapshot().visible);
}

#[test]
fn photo_mode_forces_tool_off() {
    let mut world = ZoneToolsWorld::default();
    let road = right_zoned_road(&mut world);
    enable_from_panel(&mut world);
    assert!(world.ui_snapshot().tool_enabled);
    hover_and_select(&mut world, road);

    world.set_photo_mode(true);
    world.step();
    assert_rolled_back(&world, road);
    assert!(!world.ui_snapshot().tool_enabled);
    assert_eq!(world.active_tool(), ToolId::Default);
    assert_eq!(world.tool_state(), ToolState::Inactive);

    world.trigger(UiTrigger::SetToolEnabled(true));
    world.step();
    assert_eq!(world.active_tool(), ToolId::Default, "cannot enable while in photo mode");

    world.set_photo_mode(false);
    world.trigger(UiTrigger::SetToolEnabled(true));
    world.step();
    assert_eq!(world.active_tool(), ToolId::ZoneExistingRoads);
}

#[test]
fn zoneable_road_tool_opens_and_closes_panel() {
    let mut world = ZoneToolsWorld::default();
    world.set_net_prefab(Some(RoadPrefab::new("Avenue", true)));
    world.activate_tool(ToolId::Net);
    world.step();
    assert!(world.ui_snapshot().visible);

    world.trigger(UiTrigger::SetToolEnabled(true));
    world.step();
    world.step();
    assert_eq!(world.active_tool(), ToolId::ZoneExistingRoads);
    assert!(world.ui_snapshot().visible, "panel stays while the zoning tool runs");
    assert_eq!(world.safe_prefab(), Some(RoadPrefab::new("Avenue", true)));

    world.trigger(UiTrigger::SetToolEnabled(false));
    world.step();
    world.step();
    assert_eq!(world.active_tool(), ToolId::Net);
    assert!(world.ui_snapshot().visible);

    world.activate_tool(ToolId::Bulldoze);
    world.step();
    assert!(!world.ui_snapshot().visible, "auto-opened panel closes with the road tool");
}

#[test]
fn non_zoneable_prefab_does_not_open_panel() {
    let mut world = ZoneToolsWorld::default();
    world.set_net_prefab(Some(RoadPrefab::new("Highway", false)));
    world.activate_tool(ToolId::Net);
    world.step();
    assert!(!world.ui_snapshot().visible);
}

#[test]
fn auto_open_can_be_turned_off() {
    let mut config = ZoneToolsConfig::default();
    config.tool.auto_open_panel_for_road_tools = false;
    let mut world = ZoneToolsWorld::new(&config);
    world.set_net_prefab(Some(RoadPrefab::new("Avenue", true)));
    world.activate_tool(ToolId::Net);
    world.step();
    assert!(!world.ui_snapshot().visible);
}

#[test]
fn manually_opened_panel_survives_tool_switches() {
    let mut world = ZoneToolsWorld::default();
    world.trigger(UiTrigger::TogglePanel);
    world.step();
    world.set_net_prefab(Some(RoadPrefab::new("Avenue", true)));
    world.activate_tool(ToolId::Net);
    world.step();
    world.activate_tool(ToolId::Default);
    world.step();
    assert!(world.ui_snapshot().visible);
}

#[test]
fn missing_raycast_leaves_tool_inert_and_warns_once() {
    let mut world = ZoneToolsWorld::default();
    world.remove_raycast_support();
    enable_from_panel(&mut world);
    assert_eq!(world.active_tool(), ToolId::Default);
    assert!(!world.ui_snapshot().tool_enabled);
    let unavailable = |events: &[ZoneToolEvent]| {
        events.iter().filter(|event| matches!(event, ZoneToolEvent::ToolUnavailable { .. })).count()
    };
    assert_eq!(unavailable(&world.drain_events()), 1);

    world.trigger(UiTrigger::SetToolEnabled(true));
    world.step();
    assert_eq!(unavailable(&world.drain_events()), 0);

    world.activate_tool(ToolId::ZoneExistingRoads);
    world.step();
    assert_eq!(world.tool_state(), ToolState::Inactive, "externally activated tool stays inert");
    assert_eq!(unavailable(&world.drain_events()), 0);
}

#[test]
fn safe_prefab_falls_back_to_registry() {
    let mut world = ZoneToolsWorld::default();
    enable_from_panel(&mut world);
    assert_eq!(world.safe_prefab().map(|prefab| prefab.name), Some("Small Road".to_string()));
}
