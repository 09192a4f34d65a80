use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::model::{
    ParticipantId, ParticipantSnapshot, RawEvent, RawParticipantFrame, TimelineFrame,
};
use crate::error::{AnalysisError, Result};

/// Decoded per-minute timeline of one match. Read-only once built.
#[derive(Debug, Clone)]
pub struct MatchTimelineStore {
    frames: Vec<TimelineFrame>,
    diagnostics: Vec<String>,
}

impl MatchTimelineStore {
    pub fn from_json_str(raw_json: &str) -> Result<Self> {
        let payload = serde_json::from_str::<Value>(raw_json)?;
        Self::from_payload(&payload)
    }

    /// Decodes a timeline payload shaped like `{info: {frames: [...]}}`.
    ///
    /// Malformed frames, participants and events are skipped and recorded as
    /// diagnostics. Fails only when no frame survives.
    pub fn from_payload(payload: &Value) -> Result<Self> {
        if payload.is_null() {
            return Err(AnalysisError::NotFound(
                "timeline payload is absent".to_string(),
            ));
        }

        let raw_frames = payload
            .get("info")
            .and_then(|info| info.get("frames"))
            .and_then(Value::as_array)
            .ok_or_else(|| {
                AnalysisError::NotFound("timeline payload has no info.frames list".to_string())
            })?;

        if raw_frames.is_empty() {
            return Err(AnalysisError::NotFound(
                "timeline payload has zero frames".to_string(),
            ));
        }

        let mut frames = Vec::with_capacity(raw_frames.len());
        let mut diagnostics = Vec::new();

        for (frame_index, raw_frame) in raw_frames.iter().enumerate() {
            match decode_frame(frame_index, raw_frame, &mut diagnostics) {
                Ok(frame) => frames.push(frame),
                Err(error) => record_malformed(&mut diagnostics, error),
            }
        }

        if frames.is_empty() {
            return Err(AnalysisError::NotFound(format!(
                "none of the {} timeline frames could be decoded",
                raw_frames.len()
            )));
        }

        tracing::debug!(
            frame_count = frames.len(),
            diagnostic_count = diagnostics.len(),
            "Decoded match timeline"
        );

        Ok(Self {
            frames,
            diagnostics,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Index of the last minute bucket.
    pub fn max_minute(&self) -> usize {
        self.frames
            .last()
            .map(|frame| frame.minute_index)
            .unwrap_or(0)
    }

    /// `None` for minutes past the end and for minutes whose frame was dropped.
    pub fn frame_at(&self, minute_index: usize) -> Option<&TimelineFrame> {
        self.frames
            .binary_search_by_key(&minute_index, |frame| frame.minute_index)
            .ok()
            .map(|position| &self.frames[position])
    }

    /// Frames whose minute index lies in `first_minute..=last_minute`.
    pub fn frames_between(&self, first_minute: usize, last_minute: usize) -> &[TimelineFrame] {
        let start = self
            .frames
            .partition_point(|frame| frame.minute_index < first_minute);
        let end = self
            .frames
            .partition_point(|frame| frame.minute_index <= last_minute);
        &self.frames[start..end.max(start)]
    }

    pub fn all_frames(&self) -> &[TimelineFrame] {
        &self.frames
    }

    pub fn event_count(&self) -> usize {
        self.frames.iter().map(|frame| frame.events.len()).sum()
    }

    pub fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }
}

fn record_malformed(diagnostics: &mut Vec<String>, error: AnalysisError) {
    tracing::warn!(decode_error = %error, "Skipping malformed timeline data");
    diagnostics.push(error.to_string());
}

fn malformed(frame_index: usize, reason: impl Into<String>) -> AnalysisError {
    AnalysisError::MalformedFrame {
        frame_index,
        reason: reason.into(),
    }
}

/// The frame keeps its position in the raw list as its minute index, so a
/// dropped frame leaves a gap instead of renumbering later minutes.
fn decode_frame(
    frame_index: usize,
    raw_frame: &Value,
    diagnostics: &mut Vec<String>,
) -> Result<TimelineFrame> {
    let frame_object = raw_frame
        .as_object()
        .ok_or_else(|| malformed(frame_index, "frame is not an object"))?;

    let timestamp_ms = frame_object
        .get("timestamp")
        .and_then(Value::as_u64)
        .ok_or_else(|| malformed(frame_index, "missing or non-integer timestamp"))?;

    let participants = frame_object
        .get("participantFrames")
        .and_then(Value::as_object)
        .map(|raw_participants| decode_participants(frame_index, raw_participants, diagnostics))
        .unwrap_or_default();

    let events = frame_object
        .get("events")
        .and_then(Value::as_array)
        .map(|raw_events| decode_events(frame_index, raw_events, diagnostics))
        .unwrap_or_default();

    Ok(TimelineFrame {
        minute_index: frame_index,
        timestamp_ms,
        participants,
        events,
    })
}

fn decode_participants(
    frame_index: usize,
    raw_participants: &Map<String, Value>,
    diagnostics: &mut Vec<String>,
) -> BTreeMap<ParticipantId, ParticipantSnapshot> {
    let mut participants = BTreeMap::new();

    for (raw_id, raw_participant) in raw_participants {
        let Ok(participant_id) = raw_id.trim().parse::<ParticipantId>() else {
            record_malformed(
                diagnostics,
                malformed(frame_index, format!("participant key '{raw_id}' is not an id")),
            );
            continue;
        };

        match serde_json::from_value::<RawParticipantFrame>(raw_participant.clone()) {
            Ok(raw_frame) => {
                let raw = raw_participant.as_object().cloned().unwrap_or_default();
                participants.insert(participant_id, raw_frame.into_snapshot(participant_id, raw));
            }
            Err(error) => record_malformed(
                diagnostics,
                malformed(
                    frame_index,
                    format!("participant {participant_id} could not be decoded: {error}"),
                ),
            ),
        }
    }

    participants
}

fn decode_events(
    frame_index: usize,
    raw_events: &[Value],
    diagnostics: &mut Vec<String>,
) -> Vec<RawEvent> {
    raw_events
        .iter()
        .enumerate()
        .filter_map(|(event_index, raw_event)| {
            match decode_event(frame_index, event_index, raw_event) {
                Ok(event) => Some(event),
                Err(error) => {
                    record_malformed(diagnostics, error);
                    None
                }
            }
        })
        .collect()
}

fn decode_event(frame_index: usize, event_index: usize, raw_event: &Value) -> Result<RawEvent> {
    let fields = raw_event
        .as_object()
        .ok_or_else(|| malformed(frame_index, format!("event {event_index} is not an object")))?;

    let event_type = fields
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed(frame_index, format!("event {event_index} has no type")))?;

    let timestamp_ms = fields
        .get("timestamp")
        .and_then(Value::as_u64)
        .ok_or_else(|| {
            malformed(
                frame_index,
                format!("event {event_index} ({event_type}) has no integer timestamp"),
            )
        })?;

    Ok(RawEvent {
        event_type: event_type.to_string(),
        timestamp_ms,
        fields: fields.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::MatchTimelineStore;
    use crate::error::AnalysisError;
    use crate::test_support::{frame, item_purchase, timeline_payload};
    use serde_json::json;

    #[test]
    fn decodes_frames_in_minute_order() {
        let payload = timeline_payload(vec![
            frame(0, vec![]),
            frame(60_019, vec![item_purchase(30_000, 1, 1055)]),
            frame(120_033, vec![item_purchase(90_000, 2, 1056)]),
        ]);

        let store = MatchTimelineStore::from_payload(&payload).expect("Expected store to decode");

        assert_eq!(store.frame_count(), 3);
        assert_eq!(store.max_minute(), 2);
        assert_eq!(store.event_count(), 2);
        for (index, frame) in store.all_frames().iter().enumerate() {
            assert_eq!(frame.minute_index, index);
        }
        let minute_two = store.frame_at(2).expect("Expected minute 2");
        assert_eq!(minute_two.timestamp_ms, 120_033);
        assert_eq!(minute_two.participants.len(), 10);
        assert!(store.frame_at(3).is_none());
        assert!(store.diagnostics().is_empty());
    }

    #[test]
    fn defaults_missing_optional_participant_fields() {
        let payload = timeline_payload(vec![json!({
            "timestamp": 0,
            "participantFrames": {
                "1": { "participantId": 1, "totalGold": 500, "level": 1 }
            },
            "events": []
        })]);

        let store = MatchTimelineStore::from_payload(&payload).expect("Expected store to decode");
        let snapshot = &store.frame_at(0).expect("Expected minute 0").participants[&1];

        assert_eq!(snapshot.total_gold, 500);
        assert_eq!(snapshot.position.x, 0);
        assert_eq!(snapshot.position.y, 0);
        assert_eq!(snapshot.health, 0);
        assert_eq!(snapshot.power_max, 0);
    }

    #[test]
    fn dropped_frames_leave_a_gap_without_renumbering() {
        let payload = timeline_payload(vec![
            frame(0, vec![]),
            json!({ "timestamp": "soon", "participantFrames": {}, "events": [] }),
            frame(120_000, vec![]),
            frame(180_000, vec![]),
        ]);

        let store = MatchTimelineStore::from_payload(&payload).expect("Expected store to decode");

        assert_eq!(store.frame_count(), 3);
        assert_eq!(store.max_minute(), 3);
        assert!(store.frame_at(1).is_none());
        assert_eq!(store.frame_at(2).map(|frame| frame.timestamp_ms), Some(120_000));
        assert_eq!(store.frame_at(3).map(|frame| frame.timestamp_ms), Some(180_000));
        assert_eq!(store.diagnostics().len(), 1);
        assert!(store.diagnostics()[0].contains("malformed frame 1"));
    }

    #[test]
    fn decodes_from_raw_json_text() {
        let raw_json = timeline_payload(vec![frame(0, vec![]), frame(60_000, vec![])]).to_string();

        let store = MatchTimelineStore::from_json_str(&raw_json).expect("Expected store to decode");
        assert_eq!(store.frame_count(), 2);

        let error = MatchTimelineStore::from_json_str("{ not json").unwrap_err();
        assert!(matches!(error, AnalysisError::Json(_)));
    }

    #[test]
    fn skips_events_without_type_or_timestamp() {
        let payload = timeline_payload(vec![frame(
            60_000,
            vec![
                json!({ "timestamp": 1_000 }),
                json!({ "type": "WARD_PLACED" }),
                item_purchase(2_000, 3, 2003),
            ],
        )]);

        let store = MatchTimelineStore::from_payload(&payload).expect("Expected store to decode");

        assert_eq!(store.event_count(), 1);
        assert_eq!(store.diagnostics().len(), 2);
    }

    #[test]
    fn reports_missing_or_empty_payloads_as_not_found() {
        for payload in [
            serde_json::Value::Null,
            json!({ "info": {} }),
            json!({ "info": { "frames": [] } }),
            json!({ "info": { "frames": [{ "events": [] }] } }),
        ] {
            let error = MatchTimelineStore::from_payload(&payload).unwrap_err();
            assert!(
                matches!(error, AnalysisError::NotFound(_)),
                "Expected NotFound for {payload}, got {error}"
            );
        }
    }
}
