use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use riftslice::error::Result;
use riftslice::settings::AnalysisSettings;
use riftslice::summary::MatchSummary;
use riftslice::{analyze_clip, load_payload_file, ClipAnalysisRequest};

/// Aligns recorded clips with match timeline telemetry.
#[derive(Parser, Debug)]
#[command(name = "riftslice", version, about = "Clip-to-timeline match analysis")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Slice the timeline to a clip window and write the artifact and report
    Analyze {
        /// Match detail JSON
        #[arg(long)]
        match_file: PathBuf,
        /// Match timeline JSON
        #[arg(long)]
        timeline_file: PathBuf,
        /// Text read off the clip's first frame, e.g. "15:30"
        #[arg(long)]
        start_clock: String,
        /// Text read off the clip's last frame
        #[arg(long)]
        end_clock: String,
        #[arg(long)]
        match_id: Option<String>,
        /// Overrides the configured output folder
        #[arg(long)]
        output_folder: Option<PathBuf>,
        /// Settings JSON file
        #[arg(long)]
        settings: Option<PathBuf>,
        /// PUUID of the player the clip is about
        #[arg(long)]
        target_puuid: Option<String>,
    },

    /// Print the flattened match summary and roster as JSON
    Summary {
        #[arg(long)]
        match_file: PathBuf,
        #[arg(long)]
        target_puuid: Option<String>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(
                error = %error,
                faulty_input = ?error.faulty_input(),
                "riftslice failed"
            );
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Analyze {
            match_file,
            timeline_file,
            start_clock,
            end_clock,
            match_id,
            output_folder,
            settings,
            target_puuid,
        } => {
            let settings = AnalysisSettings::load(settings.as_deref())?;
            let request = ClipAnalysisRequest {
                match_payload: load_payload_file(&match_file)?,
                timeline_payload: load_payload_file(&timeline_file)?,
                start_clock_text: start_clock,
                end_clock_text: end_clock,
                match_id,
                target_puuid,
            };

            let analysis = analyze_clip(&request, &settings)?;
            for diagnostic in &analysis.diagnostics {
                tracing::warn!(diagnostic = %diagnostic, "Timeline decode issue");
            }

            let output_folder = match output_folder {
                Some(output_folder) => output_folder,
                None => settings.resolved_output_folder()?,
            };
            let outputs = analysis.write_outputs(&output_folder)?;

            println!("{}", outputs.artifact_path.display());
            println!("{}", outputs.report_path.display());
            for moment in &analysis.key_moments {
                println!("{}", moment.description);
            }
            Ok(())
        }
        Commands::Summary {
            match_file,
            target_puuid,
        } => {
            let summary = MatchSummary::from_payload(&load_payload_file(&match_file)?)?;
            let roster = summary.roster(target_puuid.as_deref());
            let output = serde_json::json!({ "summary": summary, "roster": roster });
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
    }
}
