use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::timeline::model::{MapPosition, ParticipantId, RawEvent};

const EVENT_CHAMPION_KILL: &str = "CHAMPION_KILL";
const EVENT_ELITE_MONSTER_KILL: &str = "ELITE_MONSTER_KILL";
const EVENT_BUILDING_KILL: &str = "BUILDING_KILL";
const EVENT_ITEM_PURCHASED: &str = "ITEM_PURCHASED";
const EVENT_SKILL_LEVEL_UP: &str = "SKILL_LEVEL_UP";
const EVENT_WARD_PLACED: &str = "WARD_PLACED";
const EVENT_WARD_KILL: &str = "WARD_KILL";
const EVENT_TURRET_PLATE_DESTROYED: &str = "TURRET_PLATE_DESTROYED";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCategory {
    ChampionKill,
    EliteMonsterKill,
    BuildingKill,
    ItemPurchase,
    SkillLevelUp,
    WardPlaced,
    WardKill,
    Generic,
}

impl EventCategory {
    pub fn from_event_type(event_type: &str) -> Self {
        match event_type {
            EVENT_CHAMPION_KILL => Self::ChampionKill,
            EVENT_ELITE_MONSTER_KILL => Self::EliteMonsterKill,
            EVENT_BUILDING_KILL => Self::BuildingKill,
            EVENT_ITEM_PURCHASED => Self::ItemPurchase,
            EVENT_SKILL_LEVEL_UP => Self::SkillLevelUp,
            EVENT_WARD_PLACED => Self::WardPlaced,
            EVENT_WARD_KILL => Self::WardKill,
            _ => Self::Generic,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageContribution {
    pub attacker: Option<String>,
    pub spell: Option<String>,
    #[serde(rename = "type")]
    pub damage_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChampionKill {
    pub timestamp: u64,
    pub killer: String,
    pub victim: String,
    pub assists: Vec<String>,
    /// Serialized as `null` when the record carries no position.
    pub position: Option<MapPosition>,
    pub damage_received: Vec<DamageContribution>,
}

/// Elite monster and building kills share one shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectiveKill {
    pub timestamp: u64,
    pub killer: String,
    pub team_id: Option<u32>,
    pub monster_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monster_sub_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub building_type: Option<String>,
    pub tower_type: Option<String>,
    pub lane_type: Option<String>,
    pub position: Option<MapPosition>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPurchase {
    pub timestamp: u64,
    pub participant: String,
    pub item_id: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillLevelUp {
    pub timestamp: u64,
    pub participant: String,
    pub skill_slot: Option<u32>,
    pub level_up_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WardEvent {
    pub timestamp: u64,
    pub actor: String,
    pub ward_type: Option<String>,
}

/// An event type this crate has no dedicated shape for, kept field-for-field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenericEvent {
    #[serde(skip)]
    pub event_type: String,
    #[serde(skip)]
    pub timestamp: u64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    #[serde(rename = "CHAMPION_KILL")]
    ChampionKill(ChampionKill),
    #[serde(rename = "ELITE_MONSTER_KILL")]
    EliteMonsterKill(ObjectiveKill),
    #[serde(rename = "BUILDING_KILL")]
    BuildingKill(ObjectiveKill),
    #[serde(rename = "ITEM_PURCHASED")]
    ItemPurchase(ItemPurchase),
    #[serde(rename = "SKILL_LEVEL_UP")]
    SkillLevelUp(SkillLevelUp),
    #[serde(rename = "WARD_PLACED")]
    WardPlaced(WardEvent),
    #[serde(rename = "WARD_KILL")]
    WardKill(WardEvent),
    #[serde(untagged)]
    Generic(GenericEvent),
}

impl Event {
    pub fn category(&self) -> EventCategory {
        match self {
            Event::ChampionKill(_) => EventCategory::ChampionKill,
            Event::EliteMonsterKill(_) => EventCategory::EliteMonsterKill,
            Event::BuildingKill(_) => EventCategory::BuildingKill,
            Event::ItemPurchase(_) => EventCategory::ItemPurchase,
            Event::SkillLevelUp(_) => EventCategory::SkillLevelUp,
            Event::WardPlaced(_) => EventCategory::WardPlaced,
            Event::WardKill(_) => EventCategory::WardKill,
            Event::Generic(_) => EventCategory::Generic,
        }
    }

    pub fn timestamp_ms(&self) -> u64 {
        match self {
            Event::ChampionKill(event) => event.timestamp,
            Event::EliteMonsterKill(event) | Event::BuildingKill(event) => event.timestamp,
            Event::ItemPurchase(event) => event.timestamp,
            Event::SkillLevelUp(event) => event.timestamp,
            Event::WardPlaced(event) | Event::WardKill(event) => event.timestamp,
            Event::Generic(event) => event.timestamp,
        }
    }

    pub fn event_type(&self) -> &str {
        match self {
            Event::ChampionKill(_) => EVENT_CHAMPION_KILL,
            Event::EliteMonsterKill(_) => EVENT_ELITE_MONSTER_KILL,
            Event::BuildingKill(_) => EVENT_BUILDING_KILL,
            Event::ItemPurchase(_) => EVENT_ITEM_PURCHASED,
            Event::SkillLevelUp(_) => EVENT_SKILL_LEVEL_UP,
            Event::WardPlaced(_) => EVENT_WARD_PLACED,
            Event::WardKill(_) => EVENT_WARD_KILL,
            Event::Generic(event) => &event.event_type,
        }
    }

    /// Whether the report flow should carry this event.
    pub fn is_analysis_relevant(&self) -> bool {
        match self {
            Event::Generic(event) => event.event_type == EVENT_TURRET_PLATE_DESTROYED,
            _ => true,
        }
    }

    /// JSON form with the `timestamp_sec` convenience field added.
    pub fn to_artifact_value(&self) -> serde_json::Result<Value> {
        let mut value = serde_json::to_value(self)?;
        if let Value::Object(fields) = &mut value {
            fields.insert(
                "timestamp_sec".to_string(),
                Value::from(self.timestamp_ms() as f64 / 1000.0),
            );
        }
        Ok(value)
    }
}

/// Participant id to champion name lookup for one match.
#[derive(Debug, Clone, Default)]
pub struct ParticipantDirectory {
    names: HashMap<ParticipantId, String>,
}

impl ParticipantDirectory {
    pub fn new(names: HashMap<ParticipantId, String>) -> Self {
        Self { names }
    }

    /// Reads `info.participants[*].{participantId, championName}`.
    pub fn from_match_payload(match_payload: &Value) -> Self {
        let names = match_payload
            .get("info")
            .and_then(|info| info.get("participants"))
            .and_then(Value::as_array)
            .map(|participants| {
                participants
                    .iter()
                    .filter_map(|participant| {
                        let participant_id = participant
                            .get("participantId")
                            .and_then(Value::as_u64)
                            .and_then(|value| ParticipantId::try_from(value).ok())?;
                        let champion_name = participant.get("championName")?.as_str()?;
                        Some((participant_id, champion_name.to_string()))
                    })
                    .collect::<HashMap<_, _>>()
            })
            .unwrap_or_default();

        if names.is_empty() {
            tracing::warn!("Match payload has no participant names; ids will render as placeholders");
        }

        Self { names }
    }

    pub fn name(&self, participant_id: ParticipantId) -> String {
        self.names
            .get(&participant_id)
            .cloned()
            .unwrap_or_else(|| placeholder_name(participant_id))
    }

    fn optional_name(&self, participant_id: Option<ParticipantId>) -> String {
        match participant_id {
            Some(participant_id) => self.name(participant_id),
            None => placeholder_label("none"),
        }
    }
}

fn placeholder_name(participant_id: ParticipantId) -> String {
    placeholder_label(&participant_id.to_string())
}

fn placeholder_label(label: &str) -> String {
    format!("Unknown({label})")
}

/// Turns raw timeline events into [`Event`]s with participant names resolved.
#[derive(Debug, Clone, Default)]
pub struct EventNormalizer {
    directory: ParticipantDirectory,
}

impl EventNormalizer {
    pub fn new(directory: ParticipantDirectory) -> Self {
        Self { directory }
    }

    pub fn directory(&self) -> &ParticipantDirectory {
        &self.directory
    }

    pub fn normalize(&self, raw_event: &RawEvent) -> Event {
        let timestamp = raw_event.timestamp_ms;
        match EventCategory::from_event_type(&raw_event.event_type) {
            EventCategory::ChampionKill => Event::ChampionKill(ChampionKill {
                timestamp,
                killer: self.directory.optional_name(raw_event.u32_field("killerId")),
                victim: self.directory.optional_name(raw_event.u32_field("victimId")),
                assists: raw_event
                    .fields
                    .get("assistingParticipantIds")
                    .and_then(Value::as_array)
                    .map(|ids| {
                        ids.iter()
                            .filter_map(Value::as_u64)
                            .filter_map(|id| ParticipantId::try_from(id).ok())
                            .map(|id| self.directory.name(id))
                            .collect()
                    })
                    .unwrap_or_default(),
                position: raw_event.position_field(),
                damage_received: damage_contributions(raw_event),
            }),
            EventCategory::EliteMonsterKill => {
                Event::EliteMonsterKill(self.objective_kill(raw_event))
            }
            EventCategory::BuildingKill => Event::BuildingKill(self.objective_kill(raw_event)),
            EventCategory::ItemPurchase => Event::ItemPurchase(ItemPurchase {
                timestamp,
                participant: self
                    .directory
                    .optional_name(raw_event.u32_field("participantId")),
                item_id: raw_event.u32_field("itemId"),
            }),
            EventCategory::SkillLevelUp => Event::SkillLevelUp(SkillLevelUp {
                timestamp,
                participant: self
                    .directory
                    .optional_name(raw_event.u32_field("participantId")),
                skill_slot: raw_event.u32_field("skillSlot"),
                level_up_type: raw_event.str_field("levelUpType"),
            }),
            EventCategory::WardPlaced => Event::WardPlaced(WardEvent {
                timestamp,
                actor: self.ward_actor(raw_event, "creatorId", "killerId"),
                ward_type: raw_event.str_field("wardType"),
            }),
            EventCategory::WardKill => Event::WardKill(WardEvent {
                timestamp,
                actor: self.ward_actor(raw_event, "killerId", "creatorId"),
                ward_type: raw_event.str_field("wardType"),
            }),
            EventCategory::Generic => Event::Generic(GenericEvent {
                event_type: raw_event.event_type.clone(),
                timestamp,
                fields: raw_event.fields.clone(),
            }),
        }
    }

    fn objective_kill(&self, raw_event: &RawEvent) -> ObjectiveKill {
        ObjectiveKill {
            timestamp: raw_event.timestamp_ms,
            killer: self.directory.optional_name(raw_event.u32_field("killerId")),
            team_id: raw_event.u32_field("teamId"),
            monster_type: raw_event.str_field("monsterType"),
            monster_sub_type: raw_event.str_field("monsterSubType"),
            building_type: raw_event.str_field("buildingType"),
            tower_type: raw_event.str_field("towerType"),
            lane_type: raw_event.str_field("laneType"),
            position: raw_event.position_field(),
        }
    }

    fn ward_actor(&self, raw_event: &RawEvent, primary_key: &str, fallback_key: &str) -> String {
        let actor_id = raw_event
            .u32_field(primary_key)
            .filter(|id| *id != 0)
            .or_else(|| raw_event.u32_field(fallback_key).filter(|id| *id != 0));
        self.directory.optional_name(actor_id)
    }
}

fn damage_contributions(raw_event: &RawEvent) -> Vec<DamageContribution> {
    let Some(entries) = raw_event
        .fields
        .get("victimDamageReceived")
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    entries
        .iter()
        .map(|entry| DamageContribution {
            attacker: string_at(entry, "name"),
            spell: string_at(entry, "spellName"),
            damage_type: string_at(entry, "type"),
        })
        .collect()
}

fn string_at(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}
