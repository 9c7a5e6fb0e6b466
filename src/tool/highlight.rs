use crate::ecs::Highlighted;
use crate::events::{EventBus, ZoneToolEvent};
use bevy_ecs::prelude::*;
use std::collections::HashSet;

/// Pending outline changes. The two sets never share an entity.
#[derive(Resource, Debug, Default)]
pub struct HighlightRequests {
    to_highlight: HashSet<Entity>,
    to_unhighlight: HashSet<Entity>,
}

impl HighlightRequests {
    pub fn request(&mut self, entity: Entity, on: bool) {
        if entity == Entity::PLACEHOLDER {
            return;
        }
        if on {
            self.to_unhighlight.remove(&entity);
            self.to_highlight.insert(entity);
        } else {
            self.to_highlight.remove(&entity);
            self.to_unhighlight.insert(entity);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_highlight.is_empty() && self.to_unhighlight.is_empty()
    }

    pub fn pending_on(&self) -> &HashSet<Entity> {
        &self.to_highlight
    }

    pub fn pending_off(&self) -> &HashSet<Entity> {
        &self.to_unhighlight
    }

    /// Queues the tag changes and drains both sets. Entities that no longer
    /// exist are skipped.
    pub fn reconcile(&mut self, commands: &mut Commands) -> (usize, usize) {
        let mut on = 0;
        for entity in self.to_highlight.drain() {
            if let Some(mut entity_commands) = commands.get_entity(entity) {
                entity_commands.try_insert(Highlighted);
                on += 1;
            }
        }
        let mut off = 0;
        for entity in self.to_unhighlight.drain() {
            if let Some(mut entity_commands) = commands.get_entity(entity) {
                entity_commands.remove::<Highlighted>();
                off += 1;
            }
        }
        (on, off)
    }
}

pub fn sys_reconcile_highlights(
    mut commands: Commands,
    mut requests: ResMut<HighlightRequests>,
    mut events: ResMut<EventBus>,
) {
    if requests.is_empty() {
        return;
    }
    let (on, off) = requests.reconcile(&mut commands);
    events.push(ZoneToolEvent::HighlightsReconciled { on, off });
}
