//! The existing-roads zoning tool: interactive state machine, speculative
//! preview, highlight queue, the safety-net cleanup, and the collaborators
//! they talk to (tool switching, UI bridge, prefab safety).

use crate::config::ToolConfig;
use crate::ecs::{SubBlocks, Updated};
use bevy_ecs::prelude::*;

pub mod bridge;
pub mod cleanup;
pub mod existing_roads;
pub mod highlight;
pub mod prefab_safety;
pub mod preview;
pub mod tool_system;

pub use bridge::{sys_zone_tool_bridge, PhotoMode, UiSnapshot, UiTrigger, UiTriggers, ZoneToolUi};
pub use cleanup::sys_clear_stale_previews;
pub use existing_roads::{sys_existing_roads_tool, ApplyReport, ExistingRoadsTool, ToolState};
pub use highlight::{sys_reconcile_highlights, HighlightRequests};
pub use prefab_safety::{PrefabRegistry, SafePrefabResolver};
pub use preview::{PreviewBackup, PreviewManager, PreviewRequest, RestoreReport, RoadLookup};
pub use tool_system::{RoadPrefab, ToolId, ToolNotification, ToolObserverId, ToolSystem};

/// Tool settings handed to the per-cycle systems instead of living in globals.
#[derive(Resource, Debug, Clone)]
pub struct ZoneToolSettings {
    pub block_depth: i32,
    pub auto_open_panel_for_road_tools: bool,
    pub safe_prefab_max_attempts: u32,
    pub cleanup_batch_size: usize,
}

impl ZoneToolSettings {
    pub fn from_config(config: &ToolConfig) -> Self {
        Self {
            block_depth: config.block_depth.max(0),
            auto_open_panel_for_road_tools: config.auto_open_panel_for_road_tools,
            safe_prefab_max_attempts: config.safe_prefab_max_attempts.max(1),
            cleanup_batch_size: config.cleanup_batch_size.max(1),
        }
    }
}

impl Default for ZoneToolSettings {
    fn default() -> Self {
        Self::from_config(&ToolConfig::default())
    }
}

/// Queues re-evaluation of every zone block owned by a road.
pub(crate) fn flag_blocks_for_update(commands: &mut Commands, blocks: Option<&SubBlocks>) {
    let Some(blocks) = blocks else {
        return;
    };
    for &block in blocks.0.iter() {
        if let Some(mut block_commands) = commands.get_entity(block) {
            block_commands.try_insert(Updated);
        }
    }
}
