use std::collections::BTreeMap;

use super::model::{ParticipantId, ParticipantSnapshot};
use super::store::MatchTimelineStore;
use crate::clock::GameClockWindow;
use crate::events::{Event, EventNormalizer};

/// One minute bucket selected by a window.
#[derive(Debug, Clone, PartialEq)]
pub struct SlicedFrame {
    pub minute_index: usize,
    pub timestamp_ms: u64,
    pub participants: BTreeMap<ParticipantId, ParticipantSnapshot>,
    /// Only the events whose timestamps fall inside the window.
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowSlice {
    pub interval: GameClockWindow,
    pub frames: Vec<SlicedFrame>,
}

impl WindowSlice {
    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.frames.iter().flat_map(|frame| frame.events.iter())
    }

    pub fn event_count(&self) -> usize {
        self.frames.iter().map(|frame| frame.events.len()).sum()
    }

    pub fn minute_indices(&self) -> Vec<usize> {
        self.frames.iter().map(|frame| frame.minute_index).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Inclusive minute range a window selects: the nominal minutes plus one
/// trailing bucket, clamped to the last frame. `None` when nothing is selected.
pub fn selected_minutes(window: &GameClockWindow, max_minute: usize) -> Option<(usize, usize)> {
    let first_minute = window.start_minute();
    let last_minute = window.end_minute().saturating_add(1).min(max_minute);
    (first_minute <= last_minute).then_some((first_minute, last_minute))
}

/// Cuts a window out of a match timeline.
///
/// Every selected frame keeps its full participant snapshot; events are kept
/// only when `start_sec * 1000 <= timestamp <= end_sec * 1000`.
pub fn slice_window(
    store: &MatchTimelineStore,
    window: &GameClockWindow,
    normalizer: &EventNormalizer,
) -> WindowSlice {
    let Some((first_minute, last_minute)) = selected_minutes(window, store.max_minute()) else {
        tracing::debug!(
            start_sec = window.start_sec,
            end_sec = window.end_sec,
            frame_count = store.frame_count(),
            "Window selects no minute buckets"
        );
        return WindowSlice {
            interval: *window,
            frames: Vec::new(),
        };
    };

    let frames = store
        .frames_between(first_minute, last_minute)
        .iter()
        .map(|frame| SlicedFrame {
            minute_index: frame.minute_index,
            timestamp_ms: frame.timestamp_ms,
            participants: frame.participants.clone(),
            events: frame
                .events
                .iter()
                .filter(|raw_event| window.contains_ms(raw_event.timestamp_ms))
                .map(|raw_event| normalizer.normalize(raw_event))
                .collect(),
        })
        .collect::<Vec<_>>();

    let slice = WindowSlice {
        interval: *window,
        frames,
    };

    tracing::debug!(
        start_sec = window.start_sec,
        end_sec = window.end_sec,
        first_minute,
        last_minute,
        event_count = slice.event_count(),
        "Sliced match timeline"
    );

    slice
}
