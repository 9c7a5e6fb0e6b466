use bevy_ecs::prelude::Resource;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolId {
    Default,
    Net,
    Bulldoze,
    ZoneExistingRoads,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoadPrefab {
    pub name: String,
    /// The prefab spawns zone blocks alongside its segments.
    pub zone_block: bool,
}

impl RoadPrefab {
    pub fn new(name: impl Into<String>, zone_block: bool) -> Self {
        Self { name: name.into(), zone_block }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolNotification {
    ToolChanged { tool: ToolId },
    PrefabChanged { prefab: Option<RoadPrefab> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ToolObserverId(u32);

#[derive(Debug)]
struct ToolObserver {
    id: ToolObserverId,
    pending: Vec<ToolNotification>,
}

/// Host-side tool switching: which tool owns input, and who wants to hear about it.
#[derive(Resource, Debug)]
pub struct ToolSystem {
    active: ToolId,
    previous: ToolId,
    net_prefab: Option<RoadPrefab>,
    observers: Vec<ToolObserver>,
    next_observer: u32,
}

impl Default for ToolSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolSystem {
    pub fn new() -> Self {
        Self {
            active: ToolId::Default,
            previous: ToolId::Default,
            net_prefab: None,
            observers: Vec::new(),
            next_observer: 0,
        }
    }

    pub fn active(&self) -> ToolId {
        self.active
    }

    pub fn previous(&self) -> ToolId {
        self.previous
    }

    pub fn is_active(&self, tool: ToolId) -> bool {
        self.active == tool
    }

    pub fn activate(&mut self, tool: ToolId) {
        if self.active == tool {
            return;
        }
        debug!(from = ?self.active, to = ?tool, "active tool changed");
        self.previous = self.active;
        self.active = tool;
        self.notify(ToolNotification::ToolChanged { tool });
    }

    pub fn net_prefab(&self) -> Option<&RoadPrefab> {
        self.net_prefab.as_ref()
    }

    pub fn set_net_prefab(&mut self, prefab: Option<RoadPrefab>) {
        if self.net_prefab == prefab {
            return;
        }
        self.net_prefab = prefab.clone();
        self.notify(ToolNotification::PrefabChanged { prefab });
    }

    pub fn prefab_of(&self, tool: ToolId) -> Option<&RoadPrefab> {
        match tool {
            ToolId::Net => self.net_prefab.as_ref(),
            _ => None,
        }
    }

    /// Net tool holding a prefab that carries zone blocks.
    pub fn is_zonable_road_tool(&self, tool: ToolId) -> bool {
        self.prefab_of(tool).is_some_and(|prefab| prefab.zone_block)
    }

    pub fn subscribe(&mut self) -> ToolObserverId {
        let id = ToolObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push(ToolObserver { id, pending: Vec::new() });
        id
    }

    pub fn unsubscribe(&mut self, id: ToolObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|observer| observer.id != id);
        self.observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub fn drain(&mut self, id: ToolObserverId) -> Vec<ToolNotification> {
        self.observers
            .iter_mut()
            .find(|observer| observer.id == id)
            .map(|observer| std::mem::take(&mut observer.pending))
            .unwrap_or_default()
    }

    fn notify(&mut self, notification: ToolNotification) {
        for observer in &mut self.observers {
            observer.pending.push(notification.clone());
        }
    }
}
