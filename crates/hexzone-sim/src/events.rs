//! Zone lifecycle events for the simulation timeline.

use std::collections::BTreeMap;

use hexzone_alloc::{BrushAction, OwnerId};
use hexzone_topology::HexCoord;
use serde::{Deserialize, Serialize};

/// How a zone's cell was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementKind {
    /// Next cell in spiral order.
    Spiral,
    /// Nearest free cell to a requested position.
    Near,
    /// Loaded from a saved grid.
    Restored,
}

/// Events that occur while sessions come and go.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ZoneEvent {
    /// A placeholder was drawn where the next zone will land
    PlaceholderShown {
        session: OwnerId,
        hex: HexCoord,
        frame: u64,
    },

    /// A session's zone was committed
    ZoneCreated {
        session: OwnerId,
        hex: HexCoord,
        kind: PlacementKind,
        frame: u64,
    },

    /// A session ended and its cell was freed
    ZoneRemoved {
        session: OwnerId,
        hex: HexCoord,
        frame: u64,
    },

    /// A zone's elevation changed through the brush
    ZoneElevated {
        session: OwnerId,
        elevation: f64,
        frame: u64,
    },

    /// A brush stroke landed on a free cell
    CellBrushed {
        hex: HexCoord,
        action: BrushAction,
        height: f64,
        frame: u64,
    },

    /// No free cell was found within the search bound
    SearchExhausted {
        session: OwnerId,
        frame: u64,
    },
}

impl ZoneEvent {
    /// Get the frame number for this event.
    pub fn frame(&self) -> u64 {
        match self {
            ZoneEvent::PlaceholderShown { frame, .. } => *frame,
            ZoneEvent::ZoneCreated { frame, .. } => *frame,
            ZoneEvent::ZoneRemoved { frame, .. } => *frame,
            ZoneEvent::ZoneElevated { frame, .. } => *frame,
            ZoneEvent::CellBrushed { frame, .. } => *frame,
            ZoneEvent::SearchExhausted { frame, .. } => *frame,
        }
    }
}

/// Zone layout rebuilt from a prefix of the timeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineState {
    pub frame: u64,
    pub zones: BTreeMap<OwnerId, HexCoord>,
    pub elevations: BTreeMap<OwnerId, f64>,
    /// Placeholder currently on screen, if any.
    pub pending: Option<HexCoord>,
}

impl TimelineState {
    /// Replay events up to (but not including) the given event index.
    pub fn from_events(events: &[ZoneEvent], up_to_event: usize) -> Self {
        let mut state = Self::default();

        for event in events.iter().take(up_to_event) {
            state.frame = event.frame();
            match event {
                ZoneEvent::PlaceholderShown { hex, .. } => {
                    state.pending = Some(*hex);
                }
                ZoneEvent::ZoneCreated { session, hex, .. } => {
                    state.pending = None;
                    state.zones.insert(session.clone(), *hex);
                    state.elevations.insert(session.clone(), 0.0);
                }
                ZoneEvent::ZoneRemoved { session, .. } => {
                    state.zones.remove(session);
                    state.elevations.remove(session);
                }
                ZoneEvent::ZoneElevated { session, elevation, .. } => {
                    state.elevations.insert(session.clone(), *elevation);
                }
                ZoneEvent::SearchExhausted { .. } => {
                    state.pending = None;
                }
                ZoneEvent::CellBrushed { .. } => {}
            }
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serialization() {
        let event = ZoneEvent::ZoneCreated {
            session: OwnerId::from("session-1"),
            hex: HexCoord::new(3, -2),
            kind: PlacementKind::Spiral,
            frame: 100,
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"ZoneCreated\""));
        assert!(json.contains("\"kind\":\"spiral\""));

        let parsed: ZoneEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
        assert_eq!(parsed.frame(), 100);
    }

    #[test]
    fn replay_tracks_zones_and_placeholder() {
        let s1 = OwnerId::from("s1");
        let events = vec![
            ZoneEvent::PlaceholderShown { session: s1.clone(), hex: HexCoord::ORIGIN, frame: 0 },
            ZoneEvent::ZoneCreated {
                session: s1.clone(),
                hex: HexCoord::ORIGIN,
                kind: PlacementKind::Spiral,
                frame: 0,
            },
            ZoneEvent::ZoneElevated { session: s1.clone(), elevation: 1.5, frame: 1 },
            ZoneEvent::ZoneRemoved { session: s1.clone(), hex: HexCoord::ORIGIN, frame: 2 },
        ];

        let first = TimelineState::from_events(&events, 1);
        assert_eq!(first.pending, Some(HexCoord::ORIGIN));
        assert!(first.zones.is_empty());

        let third = TimelineState::from_events(&events, 3);
        assert_eq!(third.pending, None);
        assert_eq!(third.zones.get("s1"), Some(&HexCoord::ORIGIN));
        assert_eq!(third.elevations.get("s1"), Some(&1.5));
        assert_eq!(third.frame, 1);

        let all = TimelineState::from_events(&events, events.len());
        assert!(all.zones.is_empty());
        assert_eq!(all.frame, 2);
    }

    #[test]
    fn empty_timeline() {
        assert_eq!(TimelineState::from_events(&[], 10), TimelineState::default());
    }
}
