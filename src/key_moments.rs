use serde::Serialize;
use std::collections::HashSet;

use crate::events::{Event, EventCategory};
use crate::settings::AnalysisSettings;
use crate::timeline::slicer::WindowSlice;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum KeyMomentCategory {
    #[serde(rename = "team fight")]
    TeamFight,
    #[serde(rename = "laning-phase skirmish")]
    LaningPhaseSkirmish,
    #[serde(rename = "objective contest")]
    ObjectiveContest,
}

impl KeyMomentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TeamFight => "team fight",
            Self::LaningPhaseSkirmish => "laning-phase skirmish",
            Self::ObjectiveContest => "objective contest",
        }
    }
}

/// A minute bucket worth a closer look. Heuristic, not ground truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyMoment {
    pub minute_index: usize,
    pub category: KeyMomentCategory,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyMomentRules {
    pub team_fight_kill_threshold: usize,
    pub laning_phase_end_minute: usize,
}

impl Default for KeyMomentRules {
    fn default() -> Self {
        Self {
            team_fight_kill_threshold: 3,
            laning_phase_end_minute: 15,
        }
    }
}

impl From<&AnalysisSettings> for KeyMomentRules {
    fn from(settings: &AnalysisSettings) -> Self {
        Self {
            team_fight_kill_threshold: settings.team_fight_kill_threshold,
            laning_phase_end_minute: settings.laning_phase_end_minute,
        }
    }
}

/// Flags minute buckets by kill clusters and elite monster kills.
///
/// Moments come back in bucket order; a description seen twice is kept once,
/// at its first position.
pub fn detect_key_moments<'a, I>(buckets: I, rules: &KeyMomentRules) -> Vec<KeyMoment>
where
    I: IntoIterator<Item = (usize, &'a [Event])>,
{
    let mut seen_descriptions = HashSet::new();
    let mut moments = Vec::new();

    for (minute_index, events) in buckets {
        for moment in bucket_moments(minute_index, events, rules) {
            if seen_descriptions.insert(moment.description.clone()) {
                moments.push(moment);
            }
        }
    }

    moments
}

pub fn detect_in_slice(slice: &WindowSlice, rules: &KeyMomentRules) -> Vec<KeyMoment> {
    detect_key_moments(
        slice
            .frames
            .iter()
            .map(|frame| (frame.minute_index, frame.events.as_slice())),
        rules,
    )
}

fn bucket_moments(minute_index: usize, events: &[Event], rules: &KeyMomentRules) -> Vec<KeyMoment> {
    let mut moments = Vec::new();
    let kill_count = events
        .iter()
        .filter(|event| event.category() == EventCategory::ChampionKill)
        .count();

    if kill_count >= rules.team_fight_kill_threshold {
        moments.push(KeyMoment {
            minute_index,
            category: KeyMomentCategory::TeamFight,
            description: format!(
                "Minute {minute_index}: team fight ({kill_count} champion kills)"
            ),
        });
    } else if kill_count >= 1 && minute_index < rules.laning_phase_end_minute {
        let noun = if kill_count == 1 { "kill" } else { "kills" };
        moments.push(KeyMoment {
            minute_index,
            category: KeyMomentCategory::LaningPhaseSkirmish,
            description: format!(
                "Minute {minute_index}: laning-phase skirmish ({kill_count} champion {noun})"
            ),
        });
    }

    for event in events {
        let Event::EliteMonsterKill(objective) = event else {
            continue;
        };

        let monster = match (&objective.monster_type, &objective.monster_sub_type) {
            (Some(monster_type), Some(sub_type)) => format!("{monster_type} ({sub_type})"),
            (Some(monster_type), None) => monster_type.clone(),
            (None, _) => "UNKNOWN_MONSTER".to_string(),
        };
        moments.push(KeyMoment {
            minute_index,
            category: KeyMomentCategory::ObjectiveContest,
            description: format!("Minute {minute_index}: objective contest over {monster}"),
        });
    }

    moments
}
