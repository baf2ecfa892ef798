use std::fmt;
use std::sync::Arc;

use quiz_core::QuizCatalog;
use quiz_core::model::QuizId;
use quiz_core::time::format_countdown;
use services::{
    AttemptEvent, Clock, QuizServices, QuizSessionController, SessionConfig, SessionError,
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::EnvFilter;

mod render;

const BUILTIN_CATALOG: &str = include_str!("../assets/catalog.json");

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingQuizId,
    UnknownArg(String),
    InvalidQuizId { raw: String },
    InvalidTimeLimit { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingQuizId => write!(f, "take requires a quiz id"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidQuizId { raw } => write!(f, "invalid quiz id: {raw:?}"),
            ArgsError::InvalidTimeLimit { raw } => write!(f, "invalid --time-limit value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- list   [options]");
    eprintln!("  cargo run -p app -- take <quiz-id> [options]");
    eprintln!("  cargo run -p app -- scores [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>      score store (default: sqlite://quiz.sqlite3)");
    eprintln!("  --catalog <path>       quiz catalog JSON (default: built-in)");
    eprintln!("  --time-limit <secs>    time limit per attempt (default: 600)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_CATALOG, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    List,
    Take(QuizId),
    Scores,
}

#[derive(Debug)]
struct Args {
    command: Command,
    db_url: String,
    catalog_path: Option<String>,
    time_limit_secs: u32,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Option<Self>, ArgsError> {
        let command = match args.next().as_deref() {
            None | Some("list") => Command::List,
            Some("--help" | "-h" | "help") => return Ok(None),
            Some("scores") => Command::Scores,
            Some("take") => {
                let raw = args.next().ok_or(ArgsError::MissingQuizId)?;
                let id = raw
                    .parse()
                    .map_err(|_| ArgsError::InvalidQuizId { raw: raw.clone() })?;
                Command::Take(id)
            }
            Some(other) => return Err(ArgsError::UnknownArg(other.to_owned())),
        };

        let mut db_url = std::env::var("QUIZ_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://quiz.sqlite3".into(), normalize_sqlite_url);
        let mut catalog_path = std::env::var("QUIZ_CATALOG")
            .ok()
            .filter(|p| !p.trim().is_empty());
        let mut time_limit_secs = SessionConfig::DEFAULT_TIME_LIMIT_SECS;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--catalog" => catalog_path = Some(require_value(&mut args, "--catalog")?),
                "--time-limit" => {
                    let value = require_value(&mut args, "--time-limit")?;
                    time_limit_secs = value
                        .parse::<u32>()
                        .ok()
                        .filter(|secs| *secs > 0)
                        .ok_or(ArgsError::InvalidTimeLimit { raw: value })?;
                }
                "--help" | "-h" => return Ok(None),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Some(Self {
            command,
            db_url,
            catalog_path,
            time_limit_secs,
        }))
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn load_catalog(path: Option<&str>) -> Result<QuizCatalog, Box<dyn std::error::Error>> {
    let catalog = match path {
        Some(path) => QuizCatalog::from_json(&std::fs::read_to_string(path)?)?,
        None => QuizCatalog::from_json(BUILTIN_CATALOG)?,
    };
    Ok(catalog)
}

type InputLines = Lines<BufReader<Stdin>>;

async fn read_line(input: &mut InputLines) -> Result<Option<String>, std::io::Error> {
    Ok(input.next_line().await?.map(|line| line.trim().to_owned()))
}

/// Maps a typed letter (`a`, `B`) or 1-based number to an option of the current question.
fn pick_option(session: &services::QuizSession, input: &str) -> Option<String> {
    let options = session.current_question().options();
    let index = match input.parse::<usize>() {
        Ok(n) => n.checked_sub(1)?,
        Err(_) => {
            let mut chars = input.chars();
            let c = chars.next()?.to_ascii_uppercase();
            if chars.next().is_some() || !c.is_ascii_uppercase() {
                return None;
            }
            usize::from(c as u8 - b'A')
        }
    };
    options.get(index).cloned()
}

async fn take_quiz(
    controller: &QuizSessionController,
    quiz_id: &QuizId,
    input: &mut InputLines,
) -> Result<(), Box<dyn std::error::Error>> {
    let start = match controller.start(quiz_id).await {
        Ok(start) => start,
        Err(SessionError::QuizNotFound(id)) => {
            println!("Quiz not found: {id}\n");
            println!("{}", render::quiz_list(&controller.list_quizzes()));
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!(
        "{}\n{}\nQuestions: {}  Time limit: {}",
        start.quiz().title(),
        start.quiz().description(),
        start.quiz().question_count(),
        format_countdown(start.time_limit_secs()),
    );
    if let Some(previous) = start.previous() {
        println!("{}", render::previous_attempt(start.quiz().title(), previous));
        loop {
            match read_line(input).await?.as_deref() {
                Some("r" | "R") => break,
                Some("b" | "B") | None => return Ok(()),
                Some(_) => println!("type r or b"),
            }
        }
    }

    let mut attempt = controller.begin_attempt(start);
    println!("{}", render::question(attempt.session()));

    let result = loop {
        tokio::select! {
            Some(()) = attempt.next_tick() => {
                let event = match attempt.on_tick(controller).await {
                    Ok(event) => event,
                    Err(SessionError::Storage(err)) => {
                        tracing::warn!(error = %err, "timeout submission failed; retrying");
                        println!("Time's up! Saving your score failed, retrying...");
                        continue;
                    }
                    Err(e) => return Err(e.into()),
                };
                match event {
                    AttemptEvent::Running { remaining } => {
                        if remaining % 60 == 0 || remaining <= 10 {
                            println!("time left: {}", format_countdown(remaining));
                        }
                    }
                    AttemptEvent::TimedOut(result) => {
                        println!("\nTime's up!");
                        break result;
                    }
                    AttemptEvent::Idle => {}
                }
            }
            line = read_line(input) => {
                let Some(line) = line? else {
                    attempt.abandon();
                    return Ok(());
                };
                match line.as_str() {
                    "q" | "Q" => {
                        attempt.abandon();
                        println!("Attempt abandoned.");
                        return Ok(());
                    }
                    "p" | "P" => {
                        attempt.session_mut().previous();
                    }
                    "n" | "N" => {
                        attempt.session_mut().next();
                    }
                    "t" | "T" => {
                        println!("time left: {}", attempt.session().progress().remaining_display);
                        continue;
                    }
                    "s" | "S" => match attempt.submit(controller).await {
                        Ok(result) => break result,
                        Err(SessionError::IncompleteAnswers { unanswered }) => {
                            println!("answer all questions first ({unanswered} left)");
                            continue;
                        }
                        Err(SessionError::TimeExpired) => {
                            println!("time is up; your answers are being submitted");
                            continue;
                        }
                        Err(e) => return Err(e.into()),
                    },
                    other => match pick_option(attempt.session(), other) {
                        Some(option) => match attempt.session_mut().record_answer(&option) {
                            Ok(()) => {}
                            Err(SessionError::TimeExpired) => {
                                println!("time is up; answers can no longer change");
                                continue;
                            }
                            Err(e) => return Err(e.into()),
                        },
                        None => {
                            println!("unrecognised input: {other}");
                            continue;
                        }
                    },
                }
                println!("{}", render::question(attempt.session()));
            }
        }
    };

    let session = attempt.into_session();
    println!("{}", render::score(&result));
    println!("{}", render::review(&controller.review(&session)));
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let Some(args) = Args::parse(std::env::args().skip(1)).inspect_err(|_| print_usage())?
    else {
        print_usage();
        return Ok(());
    };

    let catalog = load_catalog(args.catalog_path.as_deref())?;
    let config = SessionConfig::new().with_time_limit_secs(args.time_limit_secs);

    // Open + migrate SQLite at startup.
    prepare_sqlite_file(&args.db_url)?;
    let services =
        QuizServices::new_sqlite(&args.db_url, Clock::default_clock(), catalog, config).await?;
    let controller: Arc<QuizSessionController> = services.controller();
    tracing::debug!(db_url = %args.db_url, quizzes = controller.catalog().len(), "services ready");

    match args.command {
        Command::List => println!("{}", render::quiz_list(&controller.list_quizzes())),
        Command::Scores => println!("{}", render::history(&controller.history().await?)),
        Command::Take(quiz_id) => {
            let mut input = BufReader::new(tokio::io::stdin()).lines();
            take_quiz(&controller, &quiz_id, &mut input).await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Option<Args>, ArgsError> {
        Args::parse(args.iter().map(|s| (*s).to_owned()))
    }

    #[test]
    fn take_requires_quiz_id() {
        assert!(matches!(parse(&["take"]), Err(ArgsError::MissingQuizId)));
    }

    #[test]
    fn parses_take_with_options() {
        let args = parse(&["take", "rust-basics", "--db", "sqlite::memory:", "--time-limit", "30"])
            .unwrap()
            .unwrap();
        assert_eq!(args.command, Command::Take(QuizId::new("rust-basics").unwrap()));
        assert_eq!(args.db_url, "sqlite::memory:");
        assert_eq!(args.time_limit_secs, 30);
    }

    #[test]
    fn rejects_zero_time_limit() {
        assert!(matches!(
            parse(&["list", "--time-limit", "0"]),
            Err(ArgsError::InvalidTimeLimit { .. })
        ));
    }

    #[test]
    fn help_returns_none() {
        assert!(parse(&["--help"]).unwrap().is_none());
    }

    #[test]
    fn builtin_catalog_parses() {
        let catalog = load_catalog(None).unwrap();
        assert!(!catalog.is_empty());
        assert!(catalog.get(&QuizId::new("rust-basics").unwrap()).is_some());
    }
}
