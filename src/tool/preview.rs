use super::flag_blocks_for_update;
use crate::ecs::{Road, SpeculativePreview, SubBlocks, ZoningInfo, ZoningMode};
use bevy_ecs::prelude::*;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Read view of the components a zoning preview touches.
pub type RoadLookup<'w, 's> = Query<
    'w,
    's,
    (Option<&'static ZoningInfo>, Option<&'static SpeculativePreview>, Option<&'static SubBlocks>),
    With<Road>,
>;

/// Exact pre-preview value of the one component a preview writes. The
/// committed `ZoningInfo` is never touched, so it is not part of the record
/// and other systems may change it while a preview is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewBackup {
    pub preview: Option<SpeculativePreview>,
}

pub struct PreviewRequest<'a> {
    pub selected: &'a HashSet<Entity>,
    pub hovered: Option<Entity>,
    pub mode: ZoningMode,
    pub block_depth: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub restored: usize,
    pub skipped: usize,
}

/// Applies speculative zoning to the hovered and selected roads and keeps
/// what it needs to undo that exactly.
///
/// An entity has a backup iff it carries a marker written by this manager.
/// Writes go through the cycle's command batch, so the store keeps showing
/// the previous cycle's state until the barrier flushes.
#[derive(Resource, Debug, Default)]
pub struct PreviewManager {
    backups: HashMap<Entity, PreviewBackup>,
    dirty: bool,
    last_mode: Option<ZoningMode>,
}

impl PreviewManager {
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn last_mode(&self) -> Option<ZoningMode> {
        self.last_mode
    }

    pub fn backup_count(&self) -> usize {
        self.backups.len()
    }

    pub fn has_backup(&self, entity: Entity) -> bool {
        self.backups.contains_key(&entity)
    }

    pub fn backup(&self, entity: Entity) -> Option<&PreviewBackup> {
        self.backups.get(&entity)
    }

    pub fn backed_up(&self) -> impl Iterator<Item = Entity> + '_ {
        self.backups.keys().copied()
    }

    /// Rebuilds the preview for the current targets. Returns the number of
    /// roads previewed, or `None` when nothing was dirty.
    pub fn update_preview(
        &mut self,
        request: &PreviewRequest<'_>,
        roads: &RoadLookup<'_, '_>,
        commands: &mut Commands,
    ) -> Option<usize> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        self.last_mode = Some(request.mode);

        // Stale previews never stack: undo everything first.
        let (mut replayed, report) = self.replay_backups(roads, commands);
        if report.skipped > 0 {
            debug!(skipped = report.skipped, "preview backups of vanished roads dropped");
        }

        let has_targets = !request.selected.is_empty() || request.hovered.is_some();
        if !has_targets {
            return Some(0);
        }

        let mut previewed = 0;
        for &road in request.selected {
            if self.apply_preview_for_road(road, request, &mut replayed, roads, commands) {
                previewed += 1;
            }
        }
        if let Some(hovered) = request.hovered {
            if !request.selected.contains(&hovered)
                && self.apply_preview_for_road(hovered, request, &mut replayed, roads, commands)
            {
                previewed += 1;
            }
        }
        Some(previewed)
    }

    /// Forgets every backup without replaying it. Used once an apply made the
    /// edit real; the roads lose their speculative marker.
    pub fn discard_backups(&mut self, roads: &RoadLookup<'_, '_>, commands: &mut Commands) -> usize {
        let mut discarded = 0;
        for (entity, _) in self.backups.drain() {
            let Ok((_, _, blocks)) = roads.get(entity) else {
                continue;
            };
            if let Some(mut entity_commands) = commands.get_entity(entity) {
                entity_commands.remove::<SpeculativePreview>();
            }
            flag_blocks_for_update(commands, blocks);
            discarded += 1;
        }
        discarded
    }

    pub fn restore_and_clear(&mut self, roads: &RoadLookup<'_, '_>, commands: &mut Commands) -> RestoreReport {
        if self.backups.is_empty() {
            return RestoreReport::default();
        }
        let (_, report) = self.replay_backups(roads, commands);
        report
    }

    /// Writes every backup back and empties the map. The replayed records are
    /// returned so a refresh in the same cycle can reuse them instead of
    /// reading values the barrier has not flushed yet.
    fn replay_backups(
        &mut self,
        roads: &RoadLookup<'_, '_>,
        commands: &mut Commands,
    ) -> (HashMap<Entity, PreviewBackup>, RestoreReport) {
        let mut report = RestoreReport::default();
        let mut replayed = HashMap::with_capacity(self.backups.len());
        for (entity, backup) in self.backups.drain() {
            let Ok((_, _, blocks)) = roads.get(entity) else {
                report.skipped += 1;
                continue;
            };
            let Some(mut entity_commands) = commands.get_entity(entity) else {
                report.skipped += 1;
                continue;
            };
            match backup.preview {
                Some(preview) => entity_commands.try_insert(preview),
                None => entity_commands.remove::<SpeculativePreview>(),
            };
            flag_blocks_for_update(commands, blocks);
            replayed.insert(entity, backup);
            report.restored += 1;
        }
        (replayed, report)
    }

    fn apply_preview_for_road(
        &mut self,
        road: Entity,
        request: &PreviewRequest<'_>,
        replayed: &mut HashMap<Entity, PreviewBackup>,
        roads: &RoadLookup<'_, '_>,
        commands: &mut Commands,
    ) -> bool {
        let Ok((_, preview, blocks)) = roads.get(road) else {
            return false;
        };
        let snapshot = replayed.remove(&road).unwrap_or(PreviewBackup { preview: preview.copied() });
        self.backups.entry(road).or_insert(snapshot);

        if let Some(mut entity_commands) = commands.get_entity(road) {
            entity_commands.try_insert(SpeculativePreview::for_mode(request.mode, request.block_depth));
        }
        flag_blocks_for_update(commands, blocks);
        true
    }
}
