use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pacs_core::{
    keys, network_check_commands, CaseLogSink, Catalog, CatalogSet, CoreConfig, DiagnosisState,
    FileCaseLog, GuidedDiagnosis, HelperError, IssueRecord, Language, MatchMode, MemoryCaseLog,
    Recommendation, TransitionError, DEFAULT_RECENT_CASES,
};

#[derive(Parser)]
#[command(name = "pacs")]
#[command(about = "PACS helper troubleshooting CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Match a problem description against the known issues
    Match {
        /// What is wrong, in your own words
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
        /// Show every matching issue instead of the first one
        #[arg(long)]
        all: bool,
        /// Catalog language (en, fr, ar)
        #[arg(long)]
        lang: Option<Language>,
        /// Do not write the case log
        #[arg(long)]
        no_log: bool,
    },
    /// Step-by-step guided diagnosis
    Diagnose {
        /// Catalog language (en, fr, ar)
        #[arg(long)]
        lang: Option<Language>,
    },
    /// Show the most recent logged cases
    Cases {
        /// Number of cases to show
        #[arg(long, default_value_t = DEFAULT_RECENT_CASES)]
        limit: usize,
    },
    /// List known issues
    Issues {
        /// Catalog language (en, fr, ar)
        #[arg(long)]
        lang: Option<Language>,
    },
    /// Print network and port check commands
    NetworkCheck {
        /// PACS server IP or hostname
        #[arg(long)]
        ip: Option<String>,
    },
    /// Check that a catalog file parses and is valid
    ValidateCatalog {
        /// Path to a catalog YAML file
        path: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pacs_cli=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("Use 'pacs --help' for commands");
        return Ok(());
    };

    match command {
        Commands::Match {
            text,
            all,
            lang,
            no_log,
        } => {
            let (cfg, catalogs) = load()?;
            let mode = if all {
                MatchMode::AllMatches
            } else {
                cfg.match_mode()
            };
            let sink: Box<dyn CaseLogSink> = if no_log {
                Box::new(MemoryCaseLog::new())
            } else {
                Box::new(FileCaseLog::new(cfg.case_log_path()))
            };
            let language = lang.unwrap_or(cfg.default_language());
            let mut out = io::stdout().lock();
            match_text(&catalogs, language, &text.join(" "), mode, sink.as_ref(), &mut out)?;
        }
        Commands::Diagnose { lang } => {
            let (cfg, catalogs) = load()?;
            let language = lang.unwrap_or(cfg.default_language());
            run_diagnosis(&catalogs, language, &mut io::stdin().lock(), &mut io::stdout().lock())?;
        }
        Commands::Cases { limit } => {
            let cfg = CoreConfig::from_lookup(|key| std::env::var(key).ok())?;
            show_cases(&FileCaseLog::new(cfg.case_log_path()), limit, &mut io::stdout().lock())?;
        }
        Commands::Issues { lang } => {
            let (cfg, catalogs) = load()?;
            let language = lang.unwrap_or(cfg.default_language());
            list_issues(catalogs.get(language), &mut io::stdout().lock())?;
        }
        Commands::NetworkCheck { ip } => {
            let (cfg, catalogs) = load()?;
            let language = cfg.default_language();
            let host = ip.as_deref().or(cfg.pacs_host());
            let mut out = io::stdout().lock();
            writeln!(out, "{}", catalogs.t(language, keys::NETWORK_CHECK))?;
            writeln!(out, "{}", catalogs.t(language, keys::NETWORK_HINT))?;
            writeln!(out)?;
            writeln!(out, "{}", network_check_commands(host)?)?;
        }
        Commands::ValidateCatalog { path } => {
            validate_catalog(&path, &mut io::stdout().lock())?;
        }
    }

    Ok(())
}

/// Resolve configuration from the environment and load the catalogs it points at.
fn load() -> anyhow::Result<(CoreConfig, CatalogSet)> {
    let cfg = CoreConfig::from_lookup(|key| std::env::var(key).ok())?;
    let catalogs = cfg.load_catalogs()?;
    Ok((cfg, catalogs))
}

fn print_issue(issue: &IssueRecord, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "→ {} [{}]", issue.display_name, issue.severity.as_str())?;
    if !issue.estimated_time.is_empty() {
        writeln!(out, "  ~ {}", issue.estimated_time)?;
    }
    for (i, step) in issue.solution_steps.iter().enumerate() {
        writeln!(out, "  {}. {}", i + 1, step)?;
    }
    Ok(())
}

/// Match `text`, print the quick fixes and record the case.
fn match_text(
    catalogs: &CatalogSet,
    language: Language,
    text: &str,
    mode: MatchMode,
    sink: &dyn CaseLogSink,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let result = catalogs.get(language).match_input(text, mode);

    if result.found() {
        writeln!(out, "{}", catalogs.t(language, keys::SHOW_QUICKFIX))?;
        for issue in result.issues() {
            print_issue(issue, out)?;
        }
    } else {
        writeln!(out, "{}", catalogs.t(language, keys::NO_MATCH))?;
    }

    let entry = result.to_case_log_entry(text, Utc::now());
    sink.record(&entry).context("could not write the case log")?;
    tracing::debug!("case recorded (detected: {:?})", entry.matched_issue_id);

    Ok(())
}

enum Reply {
    Choice(String),
    StartOver,
    Invalid,
}

/// Accepts an option number (1-based), the exact option text, or `r` to start over.
fn parse_reply(line: &str, options: &[String]) -> Reply {
    let line = line.trim();
    if line.eq_ignore_ascii_case("r") {
        return Reply::StartOver;
    }
    if let Ok(n) = line.parse::<usize>() {
        return match n.checked_sub(1).and_then(|i| options.get(i)) {
            Some(option) => Reply::Choice(option.clone()),
            None => Reply::Invalid,
        };
    }
    match options.iter().find(|option| option.as_str() == line) {
        Some(option) => Reply::Choice(option.clone()),
        None => Reply::Invalid,
    }
}

/// Drive the questionnaire over `input`/`out`.
///
/// Returns `Ok(false)` if input ends before the questionnaire is complete.
fn run_diagnosis(
    catalogs: &CatalogSet,
    language: Language,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> anyhow::Result<bool> {
    let catalog = catalogs.get(language);
    let machine = GuidedDiagnosis::new(catalog);
    let mut session = machine.new_session();

    writeln!(out, "{}", catalogs.t(language, keys::STEP_HELP))?;

    while let DiagnosisState::AwaitingAnswer(step) = machine.state(&session) {
        let Some(question) = machine.current_question(&session) else {
            break;
        };
        let options: Vec<String> = question.options.iter().map(ToString::to_string).collect();

        writeln!(out)?;
        writeln!(
            out,
            "Step {}/{} ({:.0}%): {}",
            step + 1,
            machine.question_count(),
            machine.progress(&session) * 100.0,
            question.prompt
        )?;
        for (i, option) in options.iter().enumerate() {
            writeln!(out, "  {}) {}", i + 1, option)?;
        }
        write!(out, "> ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            return Ok(false);
        }

        match parse_reply(&line, &options) {
            Reply::StartOver => {
                machine.reset(&mut session);
                writeln!(out, "{}", catalogs.t(language, keys::START_OVER))?;
            }
            Reply::Invalid => {
                writeln!(out, "{}", catalogs.t(language, keys::PICK_OPTION))?;
            }
            Reply::Choice(choice) => match machine.submit_answer(&mut session, &choice) {
                Ok(_) => {}
                Err(HelperError::InvalidTransition(TransitionError::ChoiceNotOffered { .. })) => {
                    writeln!(out, "{}", catalogs.t(language, keys::PICK_OPTION))?;
                }
                Err(e) => return Err(e.into()),
            },
        }
    }

    let recommendation = machine.resolve(&session)?;
    writeln!(out)?;
    writeln!(out, "{}", catalogs.t(language, keys::DIAGNOSIS_COMPLETE))?;
    match recommendation {
        Recommendation::Issue(issue) => print_issue(issue, out)?,
        Recommendation::Default(default) => {
            writeln!(out, "→ {}", default.title)?;
            for (i, step) in default.steps.iter().enumerate() {
                writeln!(out, "  {}. {}", i + 1, step)?;
            }
        }
    }

    Ok(true)
}

fn show_cases(log: &dyn CaseLogSink, limit: usize, out: &mut impl Write) -> anyhow::Result<()> {
    let entries = log.recent(limit)?;
    if entries.is_empty() {
        writeln!(out, "No cases yet — interactions will be logged here.")?;
        return Ok(());
    }
    for entry in entries {
        writeln!(
            out,
            "{} — {} — Detected: {}",
            entry.timestamp.to_rfc3339(),
            entry.raw_input,
            entry.matched_issue_id.as_deref().unwrap_or("none")
        )?;
    }
    Ok(())
}

fn list_issues(catalog: &Catalog, out: &mut impl Write) -> io::Result<()> {
    for issue in catalog.issues() {
        let triggers: Vec<&str> = issue.triggers.iter().map(|t| t.as_str()).collect();
        writeln!(
            out,
            "{:<12} {:<9} {} ({})",
            issue.id.as_str(),
            issue.severity.as_str(),
            issue.display_name,
            triggers.join(", ")
        )?;
    }
    Ok(())
}

fn validate_catalog(path: &Path, out: &mut impl Write) -> anyhow::Result<()> {
    let catalog = Catalog::load(path)
        .with_context(|| format!("invalid catalog {}", path.display()))?;
    let questionnaire = catalog.questionnaire();
    writeln!(
        out,
        "OK: {} catalog with {} issues, {} questions, {} rules",
        catalog.language(),
        catalog.issues().len(),
        questionnaire.questions.len(),
        questionnaire.rules.len()
    )?;
    Ok(())
}
