use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub type ParticipantId = u32;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapPosition {
    #[serde(default)]
    pub x: i64,
    #[serde(default)]
    pub y: i64,
}

/// Participant state at the start of a minute bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParticipantSnapshot {
    pub participant_id: ParticipantId,
    pub current_gold: i64,
    pub total_gold: i64,
    pub xp: i64,
    pub level: u32,
    pub minions_killed: u32,
    pub jungle_minions_killed: u32,
    pub position: MapPosition,
    pub health: i64,
    pub health_max: i64,
    pub power: i64,
    pub power_max: i64,
    /// The provider's participant frame exactly as received.
    #[serde(skip)]
    pub raw: Map<String, Value>,
}

impl ParticipantSnapshot {
    pub fn creep_score(&self) -> u32 {
        self.minions_killed.saturating_add(self.jungle_minions_killed)
    }
}

/// An event record as the telemetry source sent it, with its tag and timestamp lifted out.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEvent {
    pub event_type: String,
    pub timestamp_ms: u64,
    pub fields: Map<String, Value>,
}

impl RawEvent {
    pub(crate) fn u32_field(&self, key: &str) -> Option<u32> {
        self.fields
            .get(key)
            .and_then(Value::as_u64)
            .and_then(|value| u32::try_from(value).ok())
    }

    pub(crate) fn str_field(&self, key: &str) -> Option<String> {
        self.fields
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    pub(crate) fn position_field(&self) -> Option<MapPosition> {
        self.fields
            .get("position")
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineFrame {
    pub minute_index: usize,
    pub timestamp_ms: u64,
    pub participants: BTreeMap<ParticipantId, ParticipantSnapshot>,
    pub events: Vec<RawEvent>,
}

impl TimelineFrame {
    pub fn timestamp_sec(&self) -> f64 {
        self.timestamp_ms as f64 / 1000.0
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct RawParticipantFrame {
    pub(crate) participant_id: Option<ParticipantId>,
    pub(crate) current_gold: i64,
    pub(crate) total_gold: i64,
    pub(crate) xp: i64,
    pub(crate) level: u32,
    pub(crate) minions_killed: u32,
    pub(crate) jungle_minions_killed: u32,
    pub(crate) position: MapPosition,
    pub(crate) champion_stats: RawChampionStats,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct RawChampionStats {
    pub(crate) health: i64,
    pub(crate) health_max: i64,
    pub(crate) power: i64,
    pub(crate) power_max: i64,
}

impl RawParticipantFrame {
    pub(crate) fn into_snapshot(
        self,
        fallback_id: ParticipantId,
        raw: Map<String, Value>,
    ) -> ParticipantSnapshot {
        ParticipantSnapshot {
            participant_id: self.participant_id.unwrap_or(fallback_id),
            current_gold: self.current_gold,
            total_gold: self.total_gold,
            xp: self.xp,
            level: self.level,
            minions_killed: self.minions_killed,
            jungle_minions_killed: self.jungle_minions_killed,
            position: self.position,
            health: self.champion_stats.health,
            health_max: self.champion_stats.health_max,
            power: self.champion_stats.power,
            power_max: self.champion_stats.power_max,
            raw,
        }
    }
}
