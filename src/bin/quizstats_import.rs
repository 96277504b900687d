use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{Parser, Subcommand};
use quizstats_server::{
    app_state::{llm_client, AppState, Repositories},
    config::Config,
    db::Database,
    ingest::{IngestError, IngestResult, QuizImporter},
};

/// Imports quiz results into the statistics database.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Skip automatic categorization of new questions.
    #[arg(long, global = true)]
    no_categorize: bool,

    /// Team whose players' answers are recorded.
    #[arg(long, env = "TRACKED_TEAM", global = true)]
    team: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download result pages and import them.
    Download {
        /// Results page URL; may be repeated.
        #[arg(long = "url", required_unless_present = "file")]
        urls: Vec<String>,

        /// File with one URL per line.
        #[arg(long, conflicts_with = "urls")]
        file: Option<PathBuf>,
    },
    /// Import a quiz previously extracted to JSON.
    Load { json_file: PathBuf },
}

async fn read_urls(path: &Path) -> IngestResult<Vec<String>> {
    let contents = tokio::fs::read_to_string(path).await?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

async fn build_importer(args: &Args) -> IngestResult<QuizImporter> {
    let mut config = Config::from_env();
    if let Some(team) = &args.team {
        config.tracked_team = team.clone();
    }
    let db = Database::connect(&config).await?;

    let repositories = Repositories::mongo(&db);
    repositories.ensure_indexes().await?;

    let llm = if args.no_categorize {
        log::info!("Automatic categorization disabled");
        None
    } else {
        llm_client(&config)
    };

    let state = AppState::from_parts(config, repositories, llm, Some(db));
    Ok(QuizImporter::from_state(&state))
}

async fn run(args: Args) -> IngestResult<bool> {
    let importer = build_importer(&args).await?;

    match args.command {
        Command::Download { urls, file } => {
            let urls = match file {
                Some(path) => read_urls(&path).await?,
                None => urls,
            };
            if urls.is_empty() {
                return Err(IngestError::Parse("No URLs to import".to_string()));
            }
            let batch = importer.import_urls(&urls).await;
            Ok(batch.failed == 0)
        }
        Command::Load { json_file } => {
            let summary = importer.import_file(&json_file).await?;
            log::info!(
                "Quiz import complete: {} questions in {} parts",
                summary.questions,
                summary.parts
            );
            Ok(true)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let args = Args::parse();
    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_repeated_urls() {
        let args = Args::parse_from([
            "quizstats-import",
            "download",
            "--url",
            "https://example.org/QNpt3_1.html",
            "--url",
            "https://example.org/QNpt3_2.html",
        ]);
        match args.command {
            Command::Download { urls, file } => {
                assert_eq!(urls.len(), 2);
                assert!(file.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert!(!args.no_categorize);
    }

    #[test]
    fn parses_load_with_flag() {
        let args = Args::parse_from([
            "quizstats-import",
            "load",
            "quiz.json",
            "--no-categorize",
            "--team",
            "Os Sabichões",
        ]);
        assert!(args.no_categorize);
        assert_eq!(args.team.as_deref(), Some("Os Sabichões"));
        assert!(matches!(args.command, Command::Load { .. }));
    }

    #[test]
    fn download_requires_a_source() {
        assert!(Args::try_parse_from(["quizstats-import", "download"]).is_err());
        assert!(Args::try_parse_from([
            "quizstats-import",
            "download",
            "--url",
            "a",
            "--file",
            "b"
        ])
        .is_err());
    }
}
