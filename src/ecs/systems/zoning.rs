use crate::ecs::types::{BlockSide, Created, Road, RoadSegment, SpeculativePreview, SubBlocks, Updated, ZoneBlock, ZoningInfo};
use crate::events::{EventBus, ZoneToolEvent};
use crate::tool::{ZoneToolSettings, ZoneToolUi};
use bevy_ecs::prelude::*;
use std::collections::HashSet;
use tracing::trace;

/// Stamps the panel's zoning mode onto roads built since the last cycle.
pub fn sys_apply_mode_to_new_roads(
    mut commands: Commands,
    ui: Res<ZoneToolUi>,
    created: Query<(Entity, &RoadSegment, Option<&SubBlocks>), (With<Road>, With<Created>)>,
) {
    for (entity, segment, blocks) in &created {
        let Some(mut road) = commands.get_entity(entity) else {
            continue;
        };
        road.remove::<Created>();
        if !ui.apply_to_new_roads() || !segment.zoneable {
            continue;
        }
        road.try_insert((ZoningInfo { mode: ui.zoning_mode() }, Updated));
        trace!(?entity, mode = %ui.zoning_mode(), "zoning mode applied to new road");
        if let Some(blocks) = blocks {
            for &block in blocks.0.iter() {
                if let Some(mut block) = commands.get_entity(block) {
                    block.try_insert(Updated);
                }
            }
        }
    }
}

/// Recomputes the zoned depth of every block flagged for update, directly or
/// through its road. A speculative preview wins over the committed mode.
pub fn sys_evaluate_zone_blocks(
    mut commands: Commands,
    flagged_blocks: Query<Entity, (With<ZoneBlock>, With<Updated>)>,
    flagged_roads: Query<(Entity, Option<&SubBlocks>), (With<Road>, With<Updated>)>,
    roads: Query<(Option<&ZoningInfo>, Option<&SpeculativePreview>), With<Road>>,
    mut blocks: Query<&mut ZoneBlock>,
    settings: Res<ZoneToolSettings>,
    mut events: ResMut<EventBus>,
) {
    let mut pending: HashSet<Entity> = flagged_blocks.iter().collect();
    for (road, sub_blocks) in &flagged_roads {
        commands.entity(road).remove::<Updated>();
        if let Some(sub_blocks) = sub_blocks {
            pending.extend(sub_blocks.0.iter().copied());
        }
    }
    if pending.is_empty() {
        return;
    }

    let mut evaluated = 0;
    for entity in pending {
        let Ok(mut block) = blocks.get_mut(entity) else {
            continue;
        };
        if let Ok((zoning, preview)) = roads.get(block.road) {
            let depths = match preview {
                Some(preview) => preview.depths,
                None => zoning.map(|info| info.mode).unwrap_or_default().depths(settings.block_depth),
            };
            let depth = match block.side {
                BlockSide::Left => depths.x,
                BlockSide::Right => depths.y,
            };
            if block.depth != depth {
                block.depth = depth;
            }
        }
        commands.entity(entity).remove::<Updated>();
        evaluated += 1;
    }
    events.push(ZoneToolEvent::BlocksEvaluated { count: evaluated });
}
