use bevy_ecs::entity::Entity;
use glam::{IVec2, Vec3};
use winit::event::MouseButton;
use winit::keyboard::NamedKey;
use zone_tools::ecs::{RoadSpec, ZoningMode};
use zone_tools::events::ZoneToolEvent;
use zone_tools::input::InputEvent;
use zone_tools::tool::{PreviewBackup, ToolId, ToolState, UiTrigger};
use zone_tools::ZoneToolsWorld;

struct Roads {
    plain: Entity,
    right: Entity,
    far: Entity,
}

fn active_world() -> (ZoneToolsWorld, Roads) {
    let mut world = ZoneToolsWorld::default();
    let plain = world.spawn_road(RoadSpec::surface(Vec3::ZERO, Vec3::new(8.0, 0.2, 2.0)));
    let right = world.spawn_road(
        RoadSpec::surface(Vec3::new(10.0, 0.0, 0.0), Vec3::new(18.0, 0.2, 2.0)).with_zoning(ZoningMode::Right),
    );
    let far = world.spawn_road(RoadSpec::surface(Vec3::new(20.0, 0.0, 0.0), Vec3::new(28.0, 0.2, 2.0)));
    world.trigger(UiTrigger::TogglePanel);
    world.trigger(UiTrigger::SetToolEnabled(true));
    world.step();
    assert_eq!(world.active_tool(), ToolId::ZoneExistingRoads, "panel enables the tool");
    world.drain_events();
    (world, Roads { plain, right, far })
}

fn left(world: &mut ZoneToolsWorld, pressed: bool) {
    world.push_input(InputEvent::mouse(MouseButton::Left, pressed));
}

fn right_click(world: &mut ZoneToolsWorld) {
    world.push_input(InputEvent::mouse(MouseButton::Right, true));
    world.step();
    world.push_input(InputEvent::mouse(MouseButton::Right, false));
}

#[test]
fn hovering_previews_and_moving_away_restores() {
    let (mut world, roads) = active_world();
    assert_eq!(world.block_depths(roads.right), Some(IVec2::new(0, 6)));

    world.hover_road(roads.right);
    world.step();
    assert_eq!(world.hovered(), Some(roads.right));
    assert!(world.is_highlighted(roads.right));
    assert_eq!(world.preview_depths(roads.right), Some(IVec2::new(6, 6)));
    assert_eq!(world.block_depths(roads.right), Some(IVec2::new(6, 6)), "blocks follow the preview");
    assert_eq!(world.zoning_mode(roads.right), Some(ZoningMode::Right), "preview never commits");
    assert_eq!(world.tool_state(), ToolState::Previewing);
    assert_eq!(world.backup(roads.right), Some(PreviewBackup { preview: None }));

    world.clear_cursor();
    world.step();
    assert_eq!(world.hovered(), None);
    assert!(!world.is_highlighted(roads.right));
    assert_eq!(world.preview_depths(roads.right), None);
    assert_eq!(world.zoning_mode(roads.right), Some(ZoningMode::Right));
    assert_eq!(world.block_depths(roads.right), Some(IVec2::new(0, 6)));
    assert_eq!(world.backup_count(), 0);
    assert_eq!(world.tool_state(), ToolState::Idle);
}

#[test]
fn drag_select_cycle_and_apply_commits_mode() {
    let (mut world, roads) = active_world();

    world.hover_road(roads.plain);
    left(&mut world, true);
    world.step();
    assert_eq!(world.selection(), vec![roads.plain]);

    world.hover_road(roads.right);
    world.step();
    assert_eq!(world.selection().len(), 2, "held apply adds the new hover");
    assert!(world.is_highlighted(roads.plain), "selected road stays outlined after hover leaves");

    right_click(&mut world);
    assert_eq!(world.ui_snapshot().zoning_mode, ZoningMode::Left);
    world.step();
    assert_eq!(world.preview_depths(roads.plain), Some(IVec2::new(6, 0)));
    assert_eq!(world.preview_depths(roads.right), Some(IVec2::new(6, 0)));
    assert_eq!(world.backup(roads.plain), Some(PreviewBackup { preview: None }));

    world.drain_events();
    left(&mut world, false);
    world.step();
    let events = world.drain_events();
    assert!(events.contains(&ZoneToolEvent::ApplyFinished { written: 2, unchanged: 0, missing: 0 }));
    assert!(events.contains(&ZoneToolEvent::ModeApplied {
        entity: roads.right,
        from: ZoningMode::Right,
        to: ZoningMode::Left
    }));
    assert_eq!(world.zoning_mode(roads.plain), Some(ZoningMode::Left));
    assert_eq!(world.zoning_mode(roads.right), Some(ZoningMode::Left));
    assert_eq!(world.preview_depths(roads.plain), None, "committed roads lose their marker");
    assert_eq!(world.block_depths(roads.plain), Some(IVec2::new(6, 0)));
    assert!(world.selection().is_empty());
    assert!(!world.is_highlighted(roads.plain));
    assert!(world.is_highlighted(roads.right), "still hovered");
    assert_eq!(world.backup_count(), 0);

    world.step();
    assert_eq!(world.backup(roads.right), Some(PreviewBackup { preview: None }), "fresh preview after apply");
    assert_eq!(world.zoning_mode(roads.right), Some(ZoningMode::Left));
    assert_eq!(world.zoning_mode(roads.far), None);
}

#[test]
fn applying_the_current_mode_is_a_no_op() {
    let (mut world, roads) = active_world();
    world.trigger(UiTrigger::SetZoningMode(ZoningMode::Right));
    world.hover_road(roads.right);
    world.step();
    assert_eq!(world.preview_depths(roads.right), Some(IVec2::new(0, 6)));

    world.drain_events();
    left(&mut world, true);
    left(&mut world, false);
    world.step();
    let events = world.drain_events();
    assert!(events.contains(&ZoneToolEvent::ApplyFinished { written: 0, unchanged: 1, missing: 0 }));
    assert!(!events.iter().any(|event| matches!(event, ZoneToolEvent::ModeApplied { .. })));
    assert_eq!(world.zoning_mode(roads.right), Some(ZoningMode::Right));
}

#[test]
fn road_removed_before_apply_is_skipped() {
    let (mut world, roads) = active_world();
    world.hover_road(roads.plain);
    left(&mut world, true);
    world.step();
    assert_eq!(world.selection(), vec![roads.plain]);

    assert!(world.despawn_road(roads.plain));
    world.clear_cursor();
    world.drain_events();
    left(&mut world, false);
    world.step();

    let events = world.drain_events();
    assert!(events.contains(&ZoneToolEvent::ApplyFinished { written: 0, unchanged: 0, missing: 1 }));
    assert_eq!(world.backup_count(), 0);
    assert!(world.selection().is_empty());
    assert_eq!(world.tool_state(), ToolState::Idle);
}

#[test]
fn cancel_restores_and_clears_everything() {
    let (mut world, roads) = active_world();
    world.hover_road(roads.right);
    left(&mut world, true);
    world.step();
    right_click(&mut world);
    world.step();
    assert_eq!(world.preview_depths(roads.right), Some(IVec2::new(6, 0)));

    world.clear_cursor();
    world.push_input(InputEvent::named(NamedKey::Escape, true));
    world.step();
    let events = world.drain_events();
    assert!(events.contains(&ZoneToolEvent::PreviewCancelled));
    assert_eq!(world.preview_depths(roads.right), None);
    assert_eq!(world.zoning_mode(roads.right), Some(ZoningMode::Right));
    assert_eq!(world.block_depths(roads.right), Some(IVec2::new(0, 6)));
    assert!(world.selection().is_empty());
    assert!(!world.is_highlighted(roads.right));

    left(&mut world, false);
    world.step();
    assert_eq!(world.zoning_mode(roads.right), Some(ZoningMode::Right), "release after cancel applies nothing");
}

#[test]
fn secondary_apply_cycles_through_every_mode() {
    let (mut world, _) = active_world();
    let mut seen = Vec::new();
    for _ in 0..4 {
        right_click(&mut world);
        seen.push(world.ui_snapshot().zoning_mode);
    }
    assert_eq!(seen, vec![ZoningMode::Left, ZoningMode::Right, ZoningMode::None, ZoningMode::Default]);
}

#[test]
fn activation_resets_mode_cursor() {
    let mut world = ZoneToolsWorld::default();
    world.trigger(UiTrigger::SetZoningMode(ZoningMode::None));
    world.step();
    assert_eq!(world.ui_snapshot().zoning_mode, ZoningMode::None);

    world.trigger(UiTrigger::TogglePanel);
    world.trigger(UiTrigger::SetToolEnabled(true));
    world.step();
    assert_eq!(world.ui_snapshot().zoning_mode, ZoningMode::Default);
}

#[test]
fn switching_tools_mid_preview_restores() {
    let (mut world, roads) = active_world();
    world.hover_road(roads.right);
    left(&mut world, true);
    world.step();
    assert!(world.preview_depths(roads.right).is_some());

    world.activate_tool(ToolId::Bulldoze);
    world.step();
    let events = world.drain_events();
    assert!(events.contains(&ZoneToolEvent::ToolDeactivated));
    assert_eq!(world.tool_state(), ToolState::Inactive);
    assert_eq!(world.preview_depths(roads.right), None);
    assert_eq!(world.zoning_mode(roads.right), Some(ZoningMode::Right));
    assert!(!world.is_highlighted(roads.right));
    assert!(!world.ui_snapshot().tool_enabled);

    // Stopping twice is harmless.
    world.step();
    assert!(!world.drain_events().contains(&ZoneToolEvent::ToolDeactivated));
}

#[test]
fn underground_roads_are_hoverable() {
    let (mut world, _) = active_world();
    let tunnel = world.spawn_road(
        RoadSpec::surface(Vec3::new(0.0, -6.0, 10.0), Vec3::new(8.0, -5.8, 12.0)).underground(),
    );
    let rail = world.spawn_road(
        RoadSpec::surface(Vec3::new(10.0, 0.0, 10.0), Vec3::new(18.0, 0.2, 12.0))
            .on_layer(zone_tools::ecs::NetLayer::TRAIN_TRACK),
    );
    world.hover_road(tunnel);
    world.step();
    assert_eq!(world.hovered(), Some(tunnel));

    world.hover_road(rail);
    world.step();
    assert_eq!(world.hovered(), None);
}

#[test]
fn cancel_while_hovering_restores_absent_zoning() {
    let (mut world, roads) = active_world();
    world.hover_road(roads.plain);
    world.step();
    assert_eq!(world.backup(roads.plain), Some(PreviewBackup { preview: None }));
    assert_eq!(world.preview_depths(roads.plain), Some(IVec2::new(6, 6)));

    world.push_input(InputEvent::named(NamedKey::Escape, true));
    world.step();
    assert_eq!(world.hovered(), None);
    assert!(world.selection().is_empty());
    assert_eq!(world.backup_count(), 0);
    assert_eq!(world.zoning_mode(roads.plain), None);
    assert_eq!(world.preview_depths(roads.plain), None);
    assert!(!world.is_highlighted(roads.plain));
}

#[test]
fn road_built_under_the_cursor_keeps_its_stamped_mode() {
    let (mut world, _) = active_world();
    world.trigger(UiTrigger::SetApplyToNewRoads(true));
    world.trigger(UiTrigger::SetZoningMode(ZoningMode::Left));
    let fresh = world.spawn_road(RoadSpec::surface(Vec3::new(0.0, 0.0, 20.0), Vec3::new(8.0, 0.2, 22.0)));
    world.hover_road(fresh);
    world.step();
    assert_eq!(world.hovered(), Some(fresh));
    assert_eq!(world.backup(fresh), Some(PreviewBackup { preview: None }));
    assert_eq!(world.zoning_mode(fresh), Some(ZoningMode::Left), "new road stamped while previewed");

    world.clear_cursor();
    world.step();
    assert_eq!(world.preview_depths(fresh), None);
    assert_eq!(world.backup_count(), 0);
    assert_eq!(world.zoning_mode(fresh), Some(ZoningMode::Left), "restore leaves the stamped mode alone");
    assert_eq!(world.block_depths(fresh), Some(IVec2::new(6, 0)));
}
