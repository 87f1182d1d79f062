use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use dotenvy::dotenv;
use log::*;
use service::{config::Config, logging::Logger};
use std::io::Read;
use std::path::PathBuf;

use domain::{analysis, SubmissionRequest};

mod output;

#[derive(Parser)]
#[command(name = "followthrough", author, version)]
#[command(about = "Submit meeting transcripts to FollowThrough AI and collect the analysis")]
struct Cli {
    #[command(flatten)]
    config: Config,

    /// Print machine-readable JSON instead of a formatted report
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Submit a transcript and print the job identifier without waiting
    Submit(TranscriptArgs),
    /// Look up the current status of a submitted job once
    Status {
        /// The `sessionId` returned on submission
        job_id: String,
    },
    /// Submit a transcript, wait for the analysis and print the result
    Analyze(TranscriptArgs),
}

#[derive(Args)]
struct TranscriptArgs {
    /// Transcript file to analyze, or `-` to read from stdin
    transcript: PathBuf,

    /// Meeting title
    #[arg(long)]
    title: Option<String>,

    /// Meeting participant; repeat for each participant
    #[arg(long = "participant")]
    participants: Vec<String>,

    /// Meeting date, e.g. 2024-03-15
    #[arg(long)]
    date: Option<String>,
}

impl TranscriptArgs {
    fn into_request(self) -> Result<SubmissionRequest> {
        let transcript = if self.transcript.as_os_str() == "-" {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read transcript from stdin")?;
            text
        } else {
            std::fs::read_to_string(&self.transcript).with_context(|| {
                format!("Failed to read transcript {}", self.transcript.display())
            })?
        };

        let mut request = SubmissionRequest::new(transcript);
        if let Some(title) = self.title {
            request = request.with_title(title);
        }
        request = request.with_participants(self.participants);
        if let Some(date) = self.date {
            request = request.with_date(date);
        }
        Ok(request)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file first
    dotenv().ok();
    let cli = Cli::parse();
    Logger::init_logger(&cli.config).context("Failed to start logger")?;

    info!("Using FollowThrough endpoint {}", cli.config.api_url());

    match cli.command {
        Command::Submit(args) => {
            let request = args.into_request()?;
            let job = analysis::submit_meeting(&cli.config, &request).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&job)?);
            } else {
                output::print_job(&job);
            }
        }
        Command::Status { job_id } => {
            let snapshot = analysis::check_status(&cli.config, &job_id).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                output::print_snapshot(&job_id, &snapshot);
            }
        }
        Command::Analyze(args) => {
            let request = args.into_request()?;
            eprintln!("{} Submitting transcript for analysis...", "→".blue());
            let result = analysis::analyze_meeting(&cli.config, &request).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                output::print_result(&result).context("Failed to render the analysis report")?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_parses_transcript_args_after_config() {
        let cli = Cli::try_parse_from([
            "followthrough",
            "--poll-max-attempts",
            "5",
            "analyze",
            "meeting.txt",
            "--title",
            "Weekly Status",
            "--participant",
            "John",
            "--participant",
            "Sarah",
            "--json",
        ])
        .unwrap();

        assert_eq!(cli.config.poll_max_attempts, 5);
        assert!(cli.json);
        match cli.command {
            Command::Analyze(args) => {
                assert_eq!(args.transcript, PathBuf::from("meeting.txt"));
                assert_eq!(args.title.as_deref(), Some("Weekly Status"));
                assert_eq!(args.participants, vec!["John", "Sarah"]);
                assert_eq!(args.date, None);
            }
            _ => panic!("expected the analyze command"),
        }
    }

    #[test]
    fn test_status_requires_job_id() {
        assert!(Cli::try_parse_from(["followthrough", "status"]).is_err());

        let cli = Cli::try_parse_from(["followthrough", "status", "abc123"]).unwrap();
        assert!(matches!(cli.command, Command::Status { job_id } if job_id == "abc123"));
    }

    #[test]
    fn test_into_request_reads_file_and_metadata() {
        let path = std::env::temp_dir().join(format!(
            "followthrough-transcript-{}.txt",
            std::process::id()
        ));
        std::fs::write(&path, "John: let's review the API issues").unwrap();

        let request = TranscriptArgs {
            transcript: path.clone(),
            title: Some("Weekly Status".to_string()),
            participants: vec!["John".to_string()],
            date: Some("2024-03-15".to_string()),
        }
        .into_request()
        .unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(request.transcript, "John: let's review the API issues");
        assert_eq!(request.title(), Some("Weekly Status"));
        assert_eq!(
            serde_json::to_value(&request.metadata).unwrap(),
            serde_json::json!({
                "title": "Weekly Status",
                "participants": ["John"],
                "date": "2024-03-15"
            })
        );
    }

    #[test]
    fn test_into_request_reports_missing_file() {
        let err = TranscriptArgs {
            transcript: PathBuf::from("/nonexistent/transcript.txt"),
            title: None,
            participants: vec![],
            date: None,
        }
        .into_request()
        .unwrap_err();

        assert!(err.to_string().contains("/nonexistent/transcript.txt"));
    }
}
