use serde::Serialize;
use std::collections::BTreeMap;

use crate::events::{Event, EventNormalizer};
use crate::key_moments::KeyMoment;
use crate::summary::{MatchSummary, TeamRoster};
use crate::timeline::model::{ParticipantSnapshot, TimelineFrame};
use crate::timeline::store::MatchTimelineStore;

const MS_PER_MINUTE: u64 = 60_000;

/// What happened in one minute bucket of the whole match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineFlowEntry {
    pub minute: u64,
    pub events: Vec<Event>,
    /// Keyed by champion name.
    pub status_snapshot: BTreeMap<String, ParticipantSnapshot>,
}

/// Everything a downstream narrator needs about one clip, in one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportContext {
    pub match_summary: MatchSummary,
    pub roster: TeamRoster,
    pub timeline_flow: Vec<TimelineFlowEntry>,
    pub key_moments: Vec<String>,
}

impl ReportContext {
    pub fn build(
        match_summary: MatchSummary,
        roster: TeamRoster,
        store: &MatchTimelineStore,
        normalizer: &EventNormalizer,
        key_moments: &[KeyMoment],
    ) -> Self {
        let timeline_flow = store
            .all_frames()
            .iter()
            .map(|frame| flow_entry(frame, normalizer))
            .collect::<Vec<_>>();

        tracing::debug!(
            flow_entries = timeline_flow.len(),
            key_moments = key_moments.len(),
            "Built report context"
        );

        Self {
            match_summary,
            roster,
            timeline_flow,
            key_moments: key_moments
                .iter()
                .map(|moment| moment.description.clone())
                .collect(),
        }
    }
}

fn flow_entry(frame: &TimelineFrame, normalizer: &EventNormalizer) -> TimelineFlowEntry {
    let events = frame
        .events
        .iter()
        .map(|raw_event| normalizer.normalize(raw_event))
        .filter(Event::is_analysis_relevant)
        .collect();

    let status_snapshot = frame
        .participants
        .iter()
        .map(|(participant_id, snapshot)| {
            (normalizer.directory().name(*participant_id), snapshot.clone())
        })
        .collect();

    TimelineFlowEntry {
        minute: frame.timestamp_ms / MS_PER_MINUTE,
        events,
        status_snapshot,
    }
}
