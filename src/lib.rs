pub mod clock;
pub mod error;
pub mod events;
pub mod key_moments;
pub mod report;
pub mod roles;
pub mod settings;
pub mod summary;
pub mod timeline;

#[cfg(test)]
mod test_support;

use serde_json::Value;
use std::path::{Path, PathBuf};

use clock::{parse_clock_window, GameClockWindow};
use error::{AnalysisError, Result};
use events::{EventNormalizer, ParticipantDirectory};
use key_moments::{detect_in_slice, KeyMoment, KeyMomentRules};
use report::ReportContext;
use settings::AnalysisSettings;
use summary::MatchSummary;
use timeline::artifact::{report_context_path, write_json_file, write_slice_artifact};
use timeline::slicer::{slice_window, WindowSlice};
use timeline::store::MatchTimelineStore;

const FALLBACK_MATCH_ID: &str = "match";

/// Inputs for analysing one clip: the two telemetry payloads plus the clock
/// texts read off the clip's first and last frames.
#[derive(Debug, Clone)]
pub struct ClipAnalysisRequest {
    pub match_payload: Value,
    pub timeline_payload: Value,
    pub start_clock_text: String,
    pub end_clock_text: String,
    pub match_id: Option<String>,
    pub target_puuid: Option<String>,
}

impl ClipAnalysisRequest {
    /// Explicit id first, then `metadata.matchId` of either payload.
    pub fn resolved_match_id(&self) -> String {
        self.match_id
            .as_deref()
            .filter(|match_id| !match_id.trim().is_empty())
            .map(str::to_string)
            .or_else(|| payload_match_id(&self.match_payload))
            .or_else(|| payload_match_id(&self.timeline_payload))
            .unwrap_or_else(|| FALLBACK_MATCH_ID.to_string())
    }
}

fn payload_match_id(payload: &Value) -> Option<String> {
    payload
        .pointer("/metadata/matchId")
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[derive(Debug, Clone)]
pub struct ClipAnalysis {
    pub match_id: String,
    pub window: GameClockWindow,
    pub slice: WindowSlice,
    pub key_moments: Vec<KeyMoment>,
    pub report: ReportContext,
    /// Decode problems the timeline store recovered from.
    pub diagnostics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenOutputs {
    pub artifact_path: PathBuf,
    pub report_path: PathBuf,
}

impl ClipAnalysis {
    /// Writes the slice artifact and, beside it, the report context.
    pub fn write_outputs(&self, output_folder: &Path) -> Result<WrittenOutputs> {
        let artifact_path = write_slice_artifact(output_folder, &self.match_id, &self.slice)?;
        let report_path = report_context_path(&artifact_path);
        write_json_file(&report_path, &self.report)?;

        tracing::info!(
            report_path = %report_path.display(),
            key_moments = self.key_moments.len(),
            "Wrote report context"
        );

        Ok(WrittenOutputs {
            artifact_path,
            report_path,
        })
    }
}

/// Aligns a clip's clock readings with match telemetry.
///
/// Nothing is produced when the clock texts cannot be read or either payload
/// is missing; recoverable frame damage only shows up in `diagnostics`.
pub fn analyze_clip(
    request: &ClipAnalysisRequest,
    settings: &AnalysisSettings,
) -> Result<ClipAnalysis> {
    let window = parse_clock_window(&request.start_clock_text, &request.end_clock_text)?;

    if request.match_payload.is_null() {
        return Err(AnalysisError::NotFound("match payload is absent".to_string()));
    }
    let store = MatchTimelineStore::from_payload(&request.timeline_payload)?;
    let match_summary = MatchSummary::from_payload(&request.match_payload)?;
    let normalizer =
        EventNormalizer::new(ParticipantDirectory::from_match_payload(&request.match_payload));

    let slice = slice_window(&store, &window, &normalizer);
    let key_moments = detect_in_slice(&slice, &KeyMomentRules::from(settings));
    let roster = match_summary.roster(request.target_puuid.as_deref());
    let report = ReportContext::build(match_summary, roster, &store, &normalizer, &key_moments);

    let match_id = request.resolved_match_id();
    tracing::info!(
        match_id = %match_id,
        start_sec = window.start_sec,
        end_sec = window.end_sec,
        frame_count = slice.frames.len(),
        event_count = slice.event_count(),
        key_moments = key_moments.len(),
        "Analysed clip"
    );

    Ok(ClipAnalysis {
        match_id,
        window,
        slice,
        key_moments,
        report,
        diagnostics: store.diagnostics().to_vec(),
    })
}

/// Reads a JSON payload file. A missing file is reported as not found.
pub fn load_payload_file(path: &Path) -> Result<Value> {
    let raw_json = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            return Err(AnalysisError::NotFound(format!(
                "payload file '{}' does not exist",
                path.display()
            )));
        }
        Err(error) => return Err(AnalysisError::io(path, error)),
    };

    Ok(serde_json::from_str::<Value>(&raw_json)?)
}
