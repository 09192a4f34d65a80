use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{AnalysisError, Result};

pub const OUTPUT_DIR_ENV: &str = "RIFTSLICE_OUTPUT_DIR";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Champion kills in one minute bucket that make it a team fight.
    pub team_fight_kill_threshold: usize,
    /// First minute no longer counted as laning phase.
    pub laning_phase_end_minute: usize,
    pub output_folder: Option<String>,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            team_fight_kill_threshold: 3,
            laning_phase_end_minute: 15,
            output_folder: None,
        }
    }
}

impl AnalysisSettings {
    /// Reads settings from a JSON file. A missing file, or no path at all,
    /// yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(path) => match std::fs::read_to_string(path) {
                Ok(content) => serde_json::from_str::<Self>(&content)?,
                Err(error) if error.kind() == ErrorKind::NotFound => {
                    tracing::warn!(
                        settings_path = %path.display(),
                        "Settings file not found, using defaults"
                    );
                    Self::default()
                }
                Err(error) => return Err(AnalysisError::io(path, error)),
            },
            None => Self::default(),
        };

        settings.apply_env_overrides();
        settings.normalize();
        settings.validate()?;
        Ok(settings)
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(output_folder) = lookup(OUTPUT_DIR_ENV) {
            self.output_folder = Some(output_folder);
        }
    }

    pub fn normalize(&mut self) {
        if let Some(output_folder) = &self.output_folder {
            if output_folder.trim().is_empty() {
                self.output_folder = None;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.team_fight_kill_threshold == 0 {
            return Err(AnalysisError::InvalidSettings(
                "team_fight_kill_threshold must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn resolved_output_folder(&self) -> Result<PathBuf> {
        match &self.output_folder {
            Some(output_folder) => Ok(PathBuf::from(output_folder.trim())),
            None => default_output_folder(),
        }
    }
}

pub fn default_output_folder() -> Result<PathBuf> {
    default_output_folder_from(|key| std::env::var(key).ok())
}

fn default_output_folder_from(lookup: impl Fn(&str) -> Option<String>) -> Result<PathBuf> {
    let home_dir = lookup("USERPROFILE")
        .or_else(|| lookup("HOME"))
        .filter(|home_dir| !home_dir.trim().is_empty())
        .ok_or_else(|| {
            AnalysisError::InvalidSettings("unable to determine home directory".to_string())
        })?;

    Ok(Path::new(&home_dir).join("Documents").join("Riftslice"))
}
