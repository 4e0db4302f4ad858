use std::process;
use std::time::Duration;

use clap::Parser;
use remote::ApiConfig;
use revise_core::model::{AnswerOption, StudentId};
use services::session::PhaseKind;
use services::{Clock, SessionController, SessionLoopService, SubmitOutcome};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

mod render;

#[derive(Parser, Debug)]
#[command(name = "revise", version, about = "Terminal revision sessions for QCM practice")]
struct Cli {
    /// Base url of the QCM API (overrides REVISE_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Bearer token (overrides REVISE_API_TOKEN)
    #[arg(long)]
    token: Option<String>,

    /// Student id (overrides REVISE_STUDENT_ID)
    #[arg(long)]
    student_id: Option<u64>,

    /// Request timeout in seconds (overrides REVISE_TIMEOUT_SECS)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// "revision" to review missed questions, anything else for chapter practice
    #[arg(long, env = "REVISE_MODE")]
    mode: Option<String>,

    /// Chapter to practice, or to narrow a review to
    #[arg(long, env = "REVISE_CHAPTER")]
    chapter: Option<String>,
}

impl Cli {
    fn api_config(&self) -> Result<ApiConfig, remote::ApiConfigError> {
        let mut config = ApiConfig::from_env()?;
        if let Some(url) = &self.api_url {
            config = ApiConfig::new(url)?
                .with_timeout(config.timeout)
                .with_token(config.token)
                .with_student_id(config.student_id);
        }
        if self.token.is_some() {
            config = config.with_token(self.token.clone());
        }
        if let Some(id) = self.student_id {
            config = config.with_student_id(Some(StudentId::new(id)));
        }
        if let Some(secs) = self.timeout_secs.filter(|secs| *secs > 0) {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }
}

/// One line of terminal input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Select(AnswerOption),
    /// Submit on a question, continue on a result.
    Confirm,
    Previous,
    Restart,
    Quit,
    Unknown,
}

impl Input {
    fn parse(line: &str) -> Self {
        match line.trim().to_ascii_lowercase().as_str() {
            "" | "s" => Self::Confirm,
            "p" => Self::Previous,
            "r" => Self::Restart,
            "q" => Self::Quit,
            other => other
                .parse::<u8>()
                .ok()
                .and_then(|n| AnswerOption::new(n).ok())
                .map_or(Self::Unknown, Self::Select),
        }
    }
}

const HELP: &str = "[1-4] select  [Enter] submit  [p] previous  [r] restart  [q] quit";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = cli.api_config()?;
    info!(?config, "starting revision session");

    let service = SessionLoopService::http(Clock::system(), &config)?;
    let mut session = service
        .start_from_params(cli.mode.as_deref(), cli.chapter.as_deref())
        .await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        if !show(&session) {
            break;
        }
        let Some(line) = lines.next_line().await? else {
            break;
        };
        match Input::parse(&line) {
            Input::Quit => break,
            Input::Restart => {
                service.reload(&mut session).await;
            }
            input => handle(&service, &mut session, input).await,
        }
    }

    session.teardown();
    Ok(())
}

/// Print the current screen. Returns false once there is nothing left to answer.
fn show(session: &SessionController) -> bool {
    let snapshot = session.snapshot();
    if let Some(reason) = snapshot.empty_reason() {
        println!("{}", reason.message());
        return false;
    }
    if let Some(summary) = snapshot.completion() {
        println!("{}", render::completion(&summary));
        return false;
    }
    if let Some(feedback) = session.presentation().feedback() {
        println!("{}", render::feedback(&feedback));
    } else {
        println!("\n{}{HELP}", render::question(&snapshot));
    }
    true
}

async fn handle(service: &SessionLoopService, session: &mut SessionController, input: Input) {
    match (session.phase(), input) {
        (PhaseKind::ShowingResult, Input::Confirm) => {
            session.acknowledge_result();
        }
        (_, Input::Select(option)) => {
            session.select_option(option);
        }
        (_, Input::Confirm) => match service.submit_current(session).await {
            SubmitOutcome::Skipped => println!("Already answered, moving on."),
            SubmitOutcome::Failed(err) => println!("Could not submit your answer ({err}). Try again."),
            SubmitOutcome::Ignored => println!("Pick an answer first."),
            SubmitOutcome::Graded(_) | SubmitOutcome::Stale => {}
        },
        (_, Input::Previous) => {
            session.go_to_previous();
        }
        (phase, other) => debug!(?phase, ?other, "input ignored"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_terminal_input() {
        assert_eq!(Input::parse("2"), Input::Select(AnswerOption::SECOND));
        assert_eq!(Input::parse(" \n"), Input::Confirm);
        assert_eq!(Input::parse("P"), Input::Previous);
        assert_eq!(Input::parse("5"), Input::Unknown);
        assert_eq!(Input::parse("q"), Input::Quit);
    }

    #[test]
    fn cli_accepts_session_flags() {
        let cli = Cli::parse_from([
            "revise",
            "--mode",
            "revision",
            "--chapter",
            "Fractions",
            "--student-id",
            "7",
        ]);
        assert_eq!(cli.mode.as_deref(), Some("revision"));
        assert_eq!(cli.chapter.as_deref(), Some("Fractions"));
        assert_eq!(cli.student_id, Some(7));
    }
}
