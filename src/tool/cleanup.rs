use super::tool_system::{ToolId, ToolSystem};
use super::ZoneToolSettings;
use crate::ecs::{SpeculativePreview, Updated};
use crate::events::{EventBus, ZoneToolEvent};
use bevy_ecs::batching::BatchingStrategy;
use bevy_ecs::prelude::*;
use tracing::debug;

/// Strips speculative markers left behind once the zoning tool is no longer
/// the active tool. Runs every cycle; the active tool manages its own markers.
pub fn sys_clear_stale_previews(
    par_commands: ParallelCommands,
    marked: Query<Entity, With<SpeculativePreview>>,
    tools: Res<ToolSystem>,
    settings: Res<ZoneToolSettings>,
    mut events: ResMut<EventBus>,
) {
    if marked.is_empty() {
        return;
    }
    if tools.is_active(ToolId::ZoneExistingRoads) {
        return;
    }

    marked.par_iter().batching_strategy(BatchingStrategy::fixed(settings.cleanup_batch_size)).for_each(
        |entity| {
            par_commands.command_scope(|mut commands| {
                commands.entity(entity).remove::<SpeculativePreview>().try_insert(Updated);
            });
        },
    );

    let count = marked.iter().count();
    debug!(count, "stale speculative markers cleared");
    events.push(ZoneToolEvent::StaleMarkersCleared { count });
}
