use crate::ecs::ZoningMode;
use bevy_ecs::prelude::{Entity, Resource};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ZoneToolEvent {
    ToolActivated,
    ToolDeactivated,
    ToolUnavailable { reason: &'static str },
    HoverChanged { entity: Option<Entity> },
    SelectionAdded { entity: Entity },
    ModeCycled { mode: ZoningMode },
    ModeApplied { entity: Entity, from: ZoningMode, to: ZoningMode },
    ApplyFinished { written: usize, unchanged: usize, missing: usize },
    PreviewRefreshed { targets: usize, mode: ZoningMode },
    PreviewRestored { restored: usize, skipped: usize },
    PreviewCancelled,
    HighlightsReconciled { on: usize, off: usize },
    StaleMarkersCleared { count: usize },
    BlocksEvaluated { count: usize },
    PanelVisibility { visible: bool, reason: &'static str },
}

impl fmt::Display for ZoneToolEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneToolEvent::ToolActivated => write!(f, "ToolActivated"),
            ZoneToolEvent::ToolDeactivated => write!(f, "ToolDeactivated"),
            ZoneToolEvent::ToolUnavailable { reason } => write!(f, "ToolUnavailable reason={reason}"),
            ZoneToolEvent::HoverChanged { entity } => match entity {
                Some(entity) => write!(f, "HoverChanged entity={}", entity.index()),
                None => write!(f, "HoverChanged entity=none"),
            },
            ZoneToolEvent::SelectionAdded { entity } => write!(f, "SelectionAdded entity={}", entity.index()),
            ZoneToolEvent::ModeCycled { mode } => write!(f, "ModeCycled mode={mode}"),
            ZoneToolEvent::ModeApplied { entity, from, to } => {
                write!(f, "ModeApplied entity={} from={} to={}", entity.index(), from, to)
            }
            ZoneToolEvent::ApplyFinished { written, unchanged, missing } => {
                write!(f, "ApplyFinished written={written} unchanged={unchanged} missing={missing}")
            }
            ZoneToolEvent::PreviewRefreshed { targets, mode } => {
                write!(f, "PreviewRefreshed targets={targets} mode={mode}")
            }
            ZoneToolEvent::PreviewRestored { restored, skipped } => {
                write!(f, "PreviewRestored restored={restored} skipped={skipped}")
            }
            ZoneToolEvent::PreviewCancelled => write!(f, "PreviewCancelled"),
            ZoneToolEvent::HighlightsReconciled { on, off } => write!(f, "HighlightsReconciled on={on} off={off}"),
            ZoneToolEvent::StaleMarkersCleared { count } => write!(f, "StaleMarkersCleared count={count}"),
            ZoneToolEvent::BlocksEvaluated { count } => write!(f, "BlocksEvaluated count={count}"),
            ZoneToolEvent::PanelVisibility { visible, reason } => {
                write!(f, "PanelVisibility visible={visible} reason={reason}")
            }
        }
    }
}

#[derive(Default, Resource)]
pub struct EventBus {
    events: Vec<ZoneToolEvent>,
}

impl EventBus {
    pub fn push(&mut self, event: ZoneToolEvent) {
        tracing::trace!(target: "zone_tools::events", "{event}");
        self.events.push(event);
    }

    pub fn drain(&mut self) -> Vec<ZoneToolEvent> {
        self.events.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
