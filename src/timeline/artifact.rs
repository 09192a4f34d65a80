use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::model::ParticipantId;
use super::slicer::WindowSlice;
use crate::error::{AnalysisError, Result};

const ARTIFACT_FILE_PREFIX: &str = "slice";
const REPORT_CONTEXT_EXTENSION: &str = "report.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantFrameRecord {
    pub timestamp: u64,
    pub timestamp_sec: f64,
    /// Provider participant frames, field for field.
    pub participants: BTreeMap<ParticipantId, Map<String, Value>>,
}

/// On-disk form of a [`WindowSlice`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliceArtifact {
    pub interval_seconds: [u64; 2],
    pub events: Vec<Value>,
    pub participant_frames: Vec<ParticipantFrameRecord>,
}

impl SliceArtifact {
    pub fn from_slice(slice: &WindowSlice) -> Result<Self> {
        let events = slice
            .events()
            .map(|event| event.to_artifact_value())
            .collect::<serde_json::Result<Vec<_>>>()?;

        let participant_frames = slice
            .frames
            .iter()
            .map(|frame| ParticipantFrameRecord {
                timestamp: frame.timestamp_ms,
                timestamp_sec: frame.timestamp_ms as f64 / 1000.0,
                participants: frame
                    .participants
                    .iter()
                    .map(|(participant_id, snapshot)| (*participant_id, snapshot.raw.clone()))
                    .collect(),
            })
            .collect();

        Ok(Self {
            interval_seconds: [slice.interval.start_sec, slice.interval.end_sec],
            events,
            participant_frames,
        })
    }
}

pub fn artifact_file_name(match_id: &str, slice: &WindowSlice) -> String {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    format!(
        "{ARTIFACT_FILE_PREFIX}_{}_{}_{}_{timestamp}.json",
        sanitize_file_component(match_id),
        slice.interval.start_sec,
        slice.interval.end_sec
    )
}

pub fn report_context_path(artifact_path: &Path) -> PathBuf {
    artifact_path.with_extension(REPORT_CONTEXT_EXTENSION)
}

fn sanitize_file_component(value: &str) -> String {
    let sanitized = value
        .trim()
        .chars()
        .map(|character| {
            if character.is_ascii_alphanumeric() || character == '-' {
                character
            } else {
                '_'
            }
        })
        .collect::<String>();

    if sanitized.is_empty() {
        "match".to_string()
    } else {
        sanitized
    }
}

pub fn write_slice_artifact(
    output_folder: &Path,
    match_id: &str,
    slice: &WindowSlice,
) -> Result<PathBuf> {
    let artifact = SliceArtifact::from_slice(slice)?;
    let artifact_path = output_folder.join(artifact_file_name(match_id, slice));
    write_json_file(&artifact_path, &artifact)?;

    tracing::info!(
        artifact_path = %artifact_path.display(),
        event_count = artifact.events.len(),
        frame_count = artifact.participant_frames.len(),
        "Wrote slice artifact"
    );

    Ok(artifact_path)
}

pub fn read_slice_artifact(artifact_path: &Path) -> Result<Option<SliceArtifact>> {
    let raw_json = match std::fs::read_to_string(artifact_path) {
        Ok(content) => content,
        Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
        Err(error) => return Err(AnalysisError::io(artifact_path, error)),
    };

    let artifact = serde_json::from_str::<SliceArtifact>(&raw_json)?;
    Ok(Some(artifact))
}

pub fn delete_slice_artifact(artifact_path: &Path) -> Result<()> {
    for path in [artifact_path.to_path_buf(), report_context_path(artifact_path)] {
        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(error) if error.kind() == ErrorKind::NotFound => {}
            Err(error) => return Err(AnalysisError::io(path, error)),
        }
    }

    Ok(())
}

/// Serializes `value` as pretty JSON into a temporary sibling, then renames it over `path`.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent_directory) = path.parent() {
        std::fs::create_dir_all(parent_directory)
            .map_err(|error| AnalysisError::io(parent_directory, error))?;
    }

    let temp_path = temporary_path(path);
    let serialized = serde_json::to_string_pretty(value)?;
    std::fs::write(&temp_path, serialized).map_err(|error| AnalysisError::io(&temp_path, error))?;

    if path.exists() {
        std::fs::remove_file(path).map_err(|error| AnalysisError::io(path, error))?;
    }

    if let Err(error) = std::fs::rename(&temp_path, path) {
        if let Err(cleanup_error) = std::fs::remove_file(&temp_path) {
            tracing::warn!(
                temp_path = %temp_path.display(),
                cleanup_error = %cleanup_error,
                "Failed to remove temporary file"
            );
        }
        return Err(AnalysisError::io(path, error));
    }

    Ok(())
}

fn temporary_path(path: &Path) -> PathBuf {
    let Some(file_name) = path.file_name().and_then(|value| value.to_str()) else {
        return path.with_extension("json.tmp");
    };

    path.with_file_name(format!("{file_name}.tmp"))
}
