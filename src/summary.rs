use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AnalysisError, Result};
use crate::roles::role_for_champion;
use crate::timeline::model::ParticipantId;

pub const BLUE_TEAM_ID: u32 = 100;
pub const RED_TEAM_ID: u32 = 200;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawMatchInfo {
    game_id: Option<u64>,
    game_duration: Option<u64>,
    game_mode: Option<String>,
    game_version: Option<String>,
    participants: Vec<Value>,
    teams: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawParticipant {
    participant_id: ParticipantId,
    puuid: String,
    riot_id_game_name: String,
    riot_id_tag_line: String,
    champion_name: String,
    team_id: u32,
    team_position: Option<String>,
    kills: u32,
    deaths: u32,
    assists: u32,
    gold_earned: u64,
    total_minions_killed: u32,
    neutral_minions_killed: u32,
    champ_level: u32,
    total_damage_dealt_to_champions: u64,
    damage_self_mitigated: u64,
    total_damage_taken: u64,
    total_heal: u64,
    #[serde(rename = "totalTimeCCDealt")]
    total_time_cc_dealt: u64,
    total_time_spent_dead: u64,
    vision_score: u64,
    wards_placed: u32,
    detector_wards_placed: u32,
    largest_multi_kill: u32,
    longest_time_spent_living: u64,
    summoner1_id: Option<u32>,
    summoner2_id: Option<u32>,
    item0: Option<u32>,
    item1: Option<u32>,
    item2: Option<u32>,
    item3: Option<u32>,
    item4: Option<u32>,
    item5: Option<u32>,
    item6: Option<u32>,
    spell1_casts: Option<u32>,
    spell2_casts: Option<u32>,
    spell3_casts: Option<u32>,
    spell4_casts: Option<u32>,
    summoner1_casts: Option<u32>,
    summoner2_casts: Option<u32>,
    win: bool,
    perks: RawPerks,
    #[serde(flatten)]
    pings: PingBreakdown,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawPerks {
    styles: Vec<Value>,
}

/// Ping counts under canonical names. The provider spells each as `<name>Pings`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PingBreakdown {
    #[serde(rename(deserialize = "commandPings"))]
    pub command: u32,
    #[serde(rename(serialize = "allIn", deserialize = "allInPings"))]
    pub all_in: u32,
    #[serde(rename(deserialize = "pushPings"))]
    pub push: u32,
    #[serde(rename(deserialize = "dangerPings"))]
    pub danger: u32,
    #[serde(rename(serialize = "getBack", deserialize = "getBackPings"))]
    pub get_back: u32,
    #[serde(rename(serialize = "enemyMissing", deserialize = "enemyMissingPings"))]
    pub enemy_missing: u32,
    #[serde(rename(serialize = "assistMe", deserialize = "assistMePings"))]
    pub assist_me: u32,
    #[serde(rename(serialize = "onMyWay", deserialize = "onMyWayPings"))]
    pub on_my_way: u32,
    #[serde(rename(serialize = "needVision", deserialize = "needVisionPings"))]
    pub need_vision: u32,
    #[serde(rename(serialize = "visionCleared", deserialize = "visionClearedPings"))]
    pub vision_cleared: u32,
}

impl PingBreakdown {
    pub fn total(&self) -> u32 {
        [
            self.command,
            self.all_in,
            self.push,
            self.danger,
            self.get_back,
            self.enemy_missing,
            self.assist_me,
            self.on_my_way,
            self.need_vision,
            self.vision_cleared,
        ]
        .iter()
        .sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellCasts {
    #[serde(rename = "Q")]
    pub q: Option<u32>,
    #[serde(rename = "W")]
    pub w: Option<u32>,
    #[serde(rename = "E")]
    pub e: Option<u32>,
    #[serde(rename = "R")]
    pub r: Option<u32>,
    #[serde(rename = "Summoner1")]
    pub summoner1: Option<u32>,
    #[serde(rename = "Summoner2")]
    pub summoner2: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantRecord {
    pub participant_id: ParticipantId,
    pub puuid: String,
    pub riot_id: String,
    pub champion_name: String,
    pub role: String,
    pub team_id: u32,
    pub team_position: Option<String>,
    pub win: bool,
    pub kda: String,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    /// Lane plus neutral minions.
    pub total_minions_killed: u32,
    pub gold_earned: u64,
    pub champ_level: u32,
    pub total_damage_dealt_to_champions: u64,
    pub damage_self_mitigated: u64,
    pub total_damage_taken: u64,
    pub total_heal: u64,
    #[serde(rename = "totalTimeCCDealt")]
    pub total_time_cc_dealt: u64,
    pub total_time_spent_dead: u64,
    pub vision_score: u64,
    pub wards_placed: u32,
    pub detector_wards_placed: u32,
    pub largest_multi_kill: u32,
    pub longest_time_spent_living: u64,
    pub items: [Option<u32>; 7],
    pub summoner_spells: [Option<u32>; 2],
    pub spell_casts: SpellCasts,
    /// Rune style blocks as the provider lists them under `perks.styles`.
    pub runes: Vec<Value>,
    pub pings: PingBreakdown,
}

impl ParticipantRecord {
    fn from_raw(raw: RawParticipant) -> Self {
        let riot_id = format!("{}#{}", raw.riot_id_game_name, raw.riot_id_tag_line);
        let role = role_for_champion(&raw.champion_name).to_string();

        Self {
            participant_id: raw.participant_id,
            puuid: raw.puuid,
            riot_id,
            role,
            champion_name: raw.champion_name,
            team_id: raw.team_id,
            team_position: raw.team_position.filter(|position| !position.trim().is_empty()),
            win: raw.win,
            kda: format!("{}/{}/{}", raw.kills, raw.deaths, raw.assists),
            kills: raw.kills,
            deaths: raw.deaths,
            assists: raw.assists,
            total_minions_killed: raw
                .total_minions_killed
                .saturating_add(raw.neutral_minions_killed),
            gold_earned: raw.gold_earned,
            champ_level: raw.champ_level,
            total_damage_dealt_to_champions: raw.total_damage_dealt_to_champions,
            damage_self_mitigated: raw.damage_self_mitigated,
            total_damage_taken: raw.total_damage_taken,
            total_heal: raw.total_heal,
            total_time_cc_dealt: raw.total_time_cc_dealt,
            total_time_spent_dead: raw.total_time_spent_dead,
            vision_score: raw.vision_score,
            wards_placed: raw.wards_placed,
            detector_wards_placed: raw.detector_wards_placed,
            largest_multi_kill: raw.largest_multi_kill,
            longest_time_spent_living: raw.longest_time_spent_living,
            items: [
                raw.item0, raw.item1, raw.item2, raw.item3, raw.item4, raw.item5, raw.item6,
            ],
            summoner_spells: [raw.summoner1_id, raw.summoner2_id],
            spell_casts: SpellCasts {
                q: raw.spell1_casts,
                w: raw.spell2_casts,
                e: raw.spell3_casts,
                r: raw.spell4_casts,
                summoner1: raw.summoner1_casts,
                summoner2: raw.summoner2_casts,
            },
            runes: raw.perks.styles,
            pings: raw.pings,
        }
    }

    pub fn team_color(&self) -> &'static str {
        team_color(self.team_id)
    }
}

pub fn team_color(team_id: u32) -> &'static str {
    if team_id == BLUE_TEAM_ID {
        "Blue"
    } else {
        "Red"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSummary {
    pub team_id: u32,
    pub win: bool,
    pub bans: Vec<i64>,
    pub objectives: Value,
    pub total_kills: u64,
}

impl TeamSummary {
    fn from_value(team: &Value) -> Self {
        let objectives = team
            .get("objectives")
            .cloned()
            .unwrap_or_else(|| Value::Object(Default::default()));
        let total_kills = objectives
            .pointer("/champion/kills")
            .and_then(Value::as_u64)
            .unwrap_or(0);

        Self {
            team_id: team
                .get("teamId")
                .and_then(Value::as_u64)
                .and_then(|value| u32::try_from(value).ok())
                .unwrap_or(0),
            win: team.get("win").and_then(Value::as_bool).unwrap_or(false),
            bans: team
                .get("bans")
                .and_then(Value::as_array)
                .map(|bans| {
                    bans.iter()
                        .filter_map(|ban| ban.get("championId").and_then(Value::as_i64))
                        .collect()
                })
                .unwrap_or_default(),
            objectives,
            total_kills,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchOverview {
    pub game_id: Option<u64>,
    pub game_duration: Option<u64>,
    pub game_mode: Option<String>,
    pub game_version: Option<String>,
    pub teams: Vec<TeamSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchSummary {
    pub overview: MatchOverview,
    pub players: Vec<ParticipantRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterEntry {
    pub champion: String,
    pub role: String,
    pub riot_id: String,
    pub is_target: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamRoster {
    pub target_puuid: Option<String>,
    pub analysis_target: Option<RosterEntry>,
    pub blue_team: Vec<RosterEntry>,
    pub red_team: Vec<RosterEntry>,
}

impl MatchSummary {
    /// Flattens `info.participants` and `info.teams` of a match payload.
    ///
    /// Participant entries that cannot be decoded are skipped with a warning.
    pub fn from_payload(match_payload: &Value) -> Result<Self> {
        let info = match_payload
            .get("info")
            .filter(|info| info.is_object())
            .ok_or_else(|| AnalysisError::NotFound("match payload has no info object".to_string()))?;
        let raw_info = serde_json::from_value::<RawMatchInfo>(info.clone())?;

        let players = raw_info
            .participants
            .iter()
            .enumerate()
            .filter_map(|(index, participant)| {
                match serde_json::from_value::<RawParticipant>(participant.clone()) {
                    Ok(raw) => Some(ParticipantRecord::from_raw(raw)),
                    Err(error) => {
                        tracing::warn!(
                            participant_index = index,
                            decode_error = %error,
                            "Skipping malformed participant record"
                        );
                        None
                    }
                }
            })
            .collect();

        Ok(Self {
            overview: MatchOverview {
                game_id: raw_info.game_id,
                game_duration: raw_info.game_duration,
                game_mode: raw_info.game_mode,
                game_version: raw_info.game_version,
                teams: raw_info.teams.iter().map(TeamSummary::from_value).collect(),
            },
            players,
        })
    }

    pub fn player(&self, participant_id: ParticipantId) -> Option<&ParticipantRecord> {
        self.players
            .iter()
            .find(|player| player.participant_id == participant_id)
    }

    /// Splits players by side and marks the one whose PUUID matches `target_puuid`.
    pub fn roster(&self, target_puuid: Option<&str>) -> TeamRoster {
        let mut roster = TeamRoster {
            target_puuid: target_puuid.map(str::to_string),
            analysis_target: None,
            blue_team: Vec::new(),
            red_team: Vec::new(),
        };

        for player in &self.players {
            let is_target = target_puuid.is_some_and(|puuid| puuid == player.puuid);
            let entry = RosterEntry {
                champion: player.champion_name.clone(),
                role: player.role.clone(),
                riot_id: player.riot_id.clone(),
                is_target,
                team_color: None,
            };

            if is_target {
                roster.analysis_target = Some(RosterEntry {
                    team_color: Some(player.team_color().to_string()),
                    ..entry.clone()
                });
            }

            if player.team_id == BLUE_TEAM_ID {
                roster.blue_team.push(entry);
            } else {
                roster.red_team.push(entry);
            }
        }

        roster
    }
}

#[cfg(test)]
mod tests {
    use super::{MatchSummary, PingBreakdown};
    use crate::error::AnalysisError;
    use crate::roles::UNKNOWN_ROLE;
    use crate::test_support::match_payload;
    use serde_json::json;

    fn summary() -> MatchSummary {
        MatchSummary::from_payload(&match_payload()).expect("Expected match summary")
    }

    #[test]
    fn flattens_overview_and_teams() {
        let summary = summary();

        assert_eq!(summary.overview.game_id, Some(7_971_051_219));
        assert_eq!(summary.overview.game_duration, Some(2_400));
        assert_eq!(summary.overview.game_mode.as_deref(), Some("CLASSIC"));
        assert_eq!(summary.overview.teams.len(), 2);
        assert_eq!(summary.overview.teams[0].bans, vec![157, 238]);
        assert_eq!(summary.overview.teams[0].total_kills, 31);
        assert!(summary.overview.teams[0].win);
        assert_eq!(summary.overview.teams[1].total_kills, 22);
    }

    #[test]
    fn builds_participant_records_with_roles_and_derived_stats() {
        let summary = summary();
        assert_eq!(summary.players.len(), 10);

        let kaisa = summary.player(4).expect("Expected participant 4");
        assert_eq!(kaisa.champion_name, "Kaisa");
        assert_eq!(kaisa.role, "Main Dealer");
        assert_eq!(kaisa.kda, "4/2/5");
        assert_eq!((kaisa.kills, kaisa.deaths, kaisa.assists), (4, 2, 5));
        assert_eq!(kaisa.total_minions_killed, 162);
        assert_eq!(kaisa.riot_id, "Player4#KR1");
        assert_eq!(kaisa.items[0], Some(3031));
        assert_eq!(kaisa.items[2], None);
        assert_eq!(kaisa.spell_casts.q, Some(120));
        assert_eq!(kaisa.team_color(), "Blue");
        assert_eq!(kaisa.runes, vec![json!({ "style": 8000 })]);

        let mel = summary.player(8).expect("Expected participant 8");
        assert_eq!(mel.role, UNKNOWN_ROLE);
    }

    #[test]
    fn maps_ping_fields_to_canonical_names_with_zero_defaults() {
        let summary = summary();
        let pings = summary.player(3).expect("Expected participant 3").pings;

        assert_eq!(
            pings,
            PingBreakdown {
                command: 3,
                danger: 1,
                enemy_missing: 3,
                ..PingBreakdown::default()
            }
        );
        assert_eq!(pings.total(), 7);

        let value = serde_json::to_value(pings).expect("Expected pings to serialize");
        assert_eq!(value["enemyMissing"], 3);
        assert_eq!(value["getBack"], 0);
        assert_eq!(value["command"], 3);
    }

    #[test]
    fn sparse_participants_default_to_zero() {
        let summary = MatchSummary::from_payload(&json!({
            "info": { "participants": [{ "participantId": 1, "championName": "Zed" }] }
        }))
        .expect("Expected sparse summary");

        let zed = &summary.players[0];
        assert_eq!(zed.kda, "0/0/0");
        assert_eq!(zed.total_minions_killed, 0);
        assert_eq!(zed.role, "Assassin & Diver");
        assert_eq!(zed.pings.total(), 0);
        assert!(zed.runes.is_empty());
        assert!(summary.overview.teams.is_empty());
    }

    #[test]
    fn splits_roster_and_marks_the_target() {
        let roster = summary().roster(Some("puuid-9"));

        assert_eq!(roster.blue_team.len(), 5);
        assert_eq!(roster.red_team.len(), 5);
        let target = roster.analysis_target.expect("Expected a target");
        assert_eq!(target.champion, "Ezreal");
        assert_eq!(target.team_color.as_deref(), Some("Red"));
        assert!(roster.red_team.iter().any(|entry| entry.is_target));
        assert!(!roster.blue_team.iter().any(|entry| entry.is_target));

        assert!(summary().roster(None).analysis_target.is_none());
    }

    #[test]
    fn missing_info_is_not_found() {
        let error = MatchSummary::from_payload(&json!({ "metadata": {} })).unwrap_err();
        assert!(matches!(error, AnalysisError::NotFound(_)));
    }
}
