use super::tool_system::{RoadPrefab, ToolId, ToolSystem};
use bevy_ecs::prelude::Resource;
use tracing::{debug, warn};

/// Statically known road prefabs, used as the last donor for UI safety.
#[derive(Resource, Debug, Clone, Default)]
pub struct PrefabRegistry {
    prefabs: Vec<RoadPrefab>,
}

impl PrefabRegistry {
    pub fn new(prefabs: Vec<RoadPrefab>) -> Self {
        Self { prefabs }
    }

    pub fn with_defaults() -> Self {
        Self::new(vec![
            RoadPrefab::new("Small Road", true),
            RoadPrefab::new("Medium Road", true),
            RoadPrefab::new("Large Road", true),
            RoadPrefab::new("Highway", false),
        ])
    }

    pub fn first_zoneable(&self) -> Option<&RoadPrefab> {
        self.prefabs.iter().find(|prefab| prefab.zone_block)
    }

    pub fn len(&self) -> usize {
        self.prefabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefabs.is_empty()
    }
}

/// Bounded best-effort resolution of a prefab the UI can show while the tool
/// is active. Not needed for correctness; gives up after `max_attempts`.
#[derive(Debug, Clone)]
pub struct SafePrefabResolver {
    resolved: Option<RoadPrefab>,
    attempts: u32,
    max_attempts: u32,
    gave_up: bool,
}

impl SafePrefabResolver {
    pub fn new(max_attempts: u32) -> Self {
        Self { resolved: None, attempts: 0, max_attempts: max_attempts.max(1), gave_up: false }
    }

    pub fn resolved(&self) -> Option<&RoadPrefab> {
        self.resolved.as_ref()
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn gave_up(&self) -> bool {
        self.gave_up
    }

    pub fn ensure(&mut self, tools: &ToolSystem, registry: &PrefabRegistry) -> Option<&RoadPrefab> {
        if self.resolved.is_some() || self.gave_up {
            return self.resolved.as_ref();
        }
        self.attempts += 1;

        let own = ToolId::ZoneExistingRoads;
        let donor = [tools.active(), tools.previous()]
            .into_iter()
            .filter(|tool| *tool != own)
            .find_map(|tool| tools.prefab_of(tool))
            .or_else(|| tools.net_prefab())
            .or_else(|| registry.first_zoneable())
            .cloned();

        match donor {
            Some(prefab) => {
                debug!(prefab = %prefab.name, attempts = self.attempts, "safe prefab resolved");
                self.resolved = Some(prefab);
            }
            None if self.attempts >= self.max_attempts => {
                self.gave_up = true;
                warn!(attempts = self.attempts, "no safe prefab donor found; continuing without one");
            }
            None => {}
        }
        self.resolved.as_ref()
    }
}
