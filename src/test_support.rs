//! Payload builders shared by the unit tests.

use serde_json::{json, Value};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::timeline::model::RawEvent;

pub(crate) const CHAMPIONS: [(u32, &str, u32, &str); 10] = [
    (1, "Aatrox", 100, "TOP"),
    (2, "Amumu", 100, "JUNGLE"),
    (3, "Ahri", 100, "MIDDLE"),
    (4, "Kaisa", 100, "BOTTOM"),
    (5, "Braum", 100, "UTILITY"),
    (6, "Darius", 200, "TOP"),
    (7, "Diana", 200, "JUNGLE"),
    (8, "Mel", 200, "MIDDLE"),
    (9, "Ezreal", 200, "BOTTOM"),
    (10, "Bard", 200, "UTILITY"),
];

pub(crate) fn participant_frame(participant_id: u32, timestamp_ms: u64) -> Value {
    let minute = (timestamp_ms / 60_000) as i64;
    json!({
        "participantId": participant_id,
        "currentGold": 150 + minute * 10,
        "totalGold": 500 + minute * 400,
        "xp": minute * 300,
        "level": 1 + minute / 2,
        "minionsKilled": minute * 7,
        "jungleMinionsKilled": minute,
        "position": { "x": 1000 + participant_id * 100, "y": 2000 + participant_id * 50 },
        "championStats": { "health": 600, "healthMax": 900, "power": 300, "powerMax": 400, "armor": 80 },
        "damageStats": { "totalDamageDoneToChampions": minute * 450, "totalDamageTaken": minute * 380 },
        "timeEnemySpentControlled": minute * 2
    })
}

pub(crate) fn frame(timestamp_ms: u64, events: Vec<Value>) -> Value {
    let participant_frames = CHAMPIONS
        .iter()
        .map(|(participant_id, ..)| {
            (
                participant_id.to_string(),
                participant_frame(*participant_id, timestamp_ms),
            )
        })
        .collect::<serde_json::Map<String, Value>>();

    json!({
        "timestamp": timestamp_ms,
        "participantFrames": participant_frames,
        "events": events
    })
}

pub(crate) fn timeline_payload(frames: Vec<Value>) -> Value {
    json!({ "metadata": { "matchId": "KR_7971051219" }, "info": { "frameInterval": 60000, "frames": frames } })
}

pub(crate) fn champion_kill(timestamp_ms: u64, killer_id: u32, victim_id: u32, assists: &[u32]) -> Value {
    json!({
        "type": "CHAMPION_KILL",
        "timestamp": timestamp_ms,
        "killerId": killer_id,
        "victimId": victim_id,
        "assistingParticipantIds": assists,
        "position": { "x": 7000, "y": 7200 },
        "victimDamageReceived": []
    })
}

pub(crate) fn elite_monster_kill(timestamp_ms: u64, killer_id: u32, monster_type: &str) -> Value {
    json!({
        "type": "ELITE_MONSTER_KILL",
        "timestamp": timestamp_ms,
        "killerId": killer_id,
        "killerTeamId": if killer_id > 5 { 200 } else { 100 },
        "teamId": if killer_id > 5 { 200 } else { 100 },
        "monsterType": monster_type,
        "position": { "x": 9866, "y": 4414 }
    })
}

pub(crate) fn item_purchase(timestamp_ms: u64, participant_id: u32, item_id: u32) -> Value {
    json!({
        "type": "ITEM_PURCHASED",
        "timestamp": timestamp_ms,
        "participantId": participant_id,
        "itemId": item_id
    })
}

pub(crate) fn raw_event(value: Value) -> RawEvent {
    RawEvent {
        event_type: value["type"].as_str().unwrap_or_default().to_string(),
        timestamp_ms: value["timestamp"].as_u64().unwrap_or_default(),
        fields: value.as_object().cloned().unwrap_or_default(),
    }
}

/// 41 frames (minutes 0 through 40). Each frame holds one item purchase from the
/// minute before it; frame 16 additionally holds the events around 15:30-15:50.
pub(crate) fn forty_minute_timeline() -> Value {
    let frames = (0..=40_u64)
        .map(|minute| {
            let timestamp_ms = if minute == 0 { 0 } else { minute * 60_000 + 17 };
            let mut events = Vec::new();
            if minute > 0 {
                events.push(item_purchase((minute - 1) * 60_000 + 5_000, 1 + (minute % 10) as u32, 1001));
            }
            if minute == 16 {
                events.extend([
                    champion_kill(929_999, 1, 6, &[]),
                    champion_kill(930_000, 2, 7, &[1]),
                    json!({ "type": "TURRET_PLATE_DESTROYED", "timestamp": 940_000, "laneType": "MID_LANE", "teamId": 200 }),
                    champion_kill(950_000, 9, 4, &[10]),
                    champion_kill(950_001, 8, 3, &[]),
                ]);
            }
            frame(timestamp_ms, events)
        })
        .collect();

    timeline_payload(frames)
}

pub(crate) fn match_payload() -> Value {
    let participants = CHAMPIONS
        .iter()
        .map(|(participant_id, champion_name, team_id, position)| {
            json!({
                "participantId": participant_id,
                "puuid": format!("puuid-{participant_id}"),
                "riotIdGameName": format!("Player{participant_id}"),
                "riotIdTagLine": "KR1",
                "championName": champion_name,
                "teamId": team_id,
                "teamPosition": position,
                "kills": participant_id,
                "deaths": 2,
                "assists": 5,
                "goldEarned": 10_000 + participant_id * 100,
                "totalMinionsKilled": 150,
                "neutralMinionsKilled": 12,
                "champLevel": 16,
                "totalDamageDealtToChampions": 20_000,
                "damageSelfMitigated": 8_000,
                "totalDamageTaken": 18_000,
                "totalHeal": 3_000,
                "totalTimeCCDealt": 45,
                "totalTimeSpentDead": 60,
                "visionScore": 25,
                "wardsPlaced": 9,
                "detectorWardsPlaced": 2,
                "largestMultiKill": 1,
                "longestTimeSpentLiving": 600,
                "summoner1Id": 4,
                "summoner2Id": 14,
                "item0": 3031,
                "item1": 3006,
                "item6": 3340,
                "spell1Casts": 120,
                "spell4Casts": 9,
                "commandPings": 3,
                "dangerPings": 1,
                "enemyMissingPings": participant_id,
                "perks": { "styles": [{ "style": 8000 }] },
                "win": *team_id == 100
            })
        })
        .collect::<Vec<Value>>();

    json!({
        "metadata": { "matchId": "KR_7971051219" },
        "info": {
            "gameId": 7971051219_u64,
            "gameDuration": 2_400,
            "gameMode": "CLASSIC",
            "gameVersion": "14.23.636.5475",
            "participants": participants,
            "teams": [
                {
                    "teamId": 100,
                    "win": true,
                    "bans": [{ "championId": 157, "pickTurn": 1 }, { "championId": 238, "pickTurn": 2 }],
                    "objectives": { "champion": { "first": true, "kills": 31 }, "dragon": { "first": false, "kills": 2 } }
                },
                {
                    "teamId": 200,
                    "win": false,
                    "bans": [],
                    "objectives": { "champion": { "first": false, "kills": 22 } }
                }
            ]
        }
    })
}

/// A fresh, not yet created directory under the system temp dir.
pub(crate) fn unique_temp_directory(prefix: &str) -> PathBuf {
    let timestamp_nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_nanos())
        .unwrap_or(0);
    let process_id = std::process::id();
    std::env::temp_dir().join(format!("{prefix}_{process_id}_{timestamp_nanos}"))
}
