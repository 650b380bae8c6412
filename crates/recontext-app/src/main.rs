//! Recontext console - composition root.
//!
//! 1. Load configuration from TOML
//! 2. Build the topic classifier (degrading if the artifact is unusable)
//! 3. Build the session manager
//! 4. Read utterances from stdin, one per line, and print each turn

mod cli;

use std::io::{self, BufRead, Write};

use clap::Parser;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use recontext_classifier::build_classifier;
use recontext_core::RecontextConfig;
use recontext_dialogue::{SessionManager, TurnReport};

use crate::cli::CliArgs;

const HELP: &str = ":state  show the current frame\n:history  show this session's transcript\n:reset  forget the current frame\n:help  show this list\n:quit  exit";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = RecontextConfig::load_or_default(&config_file);
    if let Some(artifact) = args.resolve_artifact() {
        config.classifier.artifact_path = Some(artifact);
    }

    // Tracing. Priority: --log-level > RUST_LOG > config file.
    let filter = match args.log_level.as_deref() {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level)),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    tracing::info!("Starting Recontext v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    // Pipeline.
    let classifier = build_classifier(&config.classifier);
    tracing::info!(
        backend = classifier.name(),
        available = classifier.is_available(),
        "Topic classifier selected"
    );
    let manager = SessionManager::from_config(&config, classifier)?;

    run_console(&manager, args.json)
}

/// Read-eval-print loop over stdin. One session per console run, recreated
/// on demand when it expires.
fn run_console(manager: &SessionManager, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut session: Option<Uuid> = None;

    if !json {
        writeln!(stdout, "Ask a question. Type :help for commands.")?;
    }
    prompt(&mut stdout, json)?;

    for line in stdin.lock().lines() {
        let line = line?;
        let input = line.trim();

        match input {
            "" => {}
            ":quit" | ":q" | ":exit" => break,
            ":help" => writeln!(stdout, "{}", HELP)?,
            ":reset" => {
                if let Some(sid) = session {
                    manager.reset_session(sid)?;
                }
                writeln!(stdout, "Context cleared.")?;
            }
            ":state" => match session {
                Some(sid) => {
                    let snapshot = manager.snapshot(sid)?;
                    writeln!(stdout, "{}", serde_json::to_string_pretty(&snapshot)?)?;
                }
                None => writeln!(stdout, "No conversation yet.")?,
            },
            ":history" => match session {
                Some(sid) => {
                    for entry in manager.transcript(sid)? {
                        writeln!(
                            stdout,
                            "{} [{}] {}",
                            entry.utterance,
                            entry.report.act,
                            entry.report.outcome.prompt()
                        )?;
                    }
                }
                None => writeln!(stdout, "No conversation yet.")?,
            },
            _ => match manager.handle_message(input, session) {
                Ok((report, sid)) => {
                    session = Some(sid);
                    print_report(&mut stdout, &report, json)?;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Utterance rejected");
                    writeln!(stdout, "error: {}", e)?;
                }
            },
        }

        prompt(&mut stdout, json)?;
    }

    tracing::info!("Recontext stopped");
    Ok(())
}

fn prompt(out: &mut impl Write, json: bool) -> io::Result<()> {
    if !json {
        write!(out, "> ")?;
    }
    out.flush()
}

fn print_report(
    out: &mut impl Write,
    report: &TurnReport,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        writeln!(out, "{}", serde_json::to_string(report)?)?;
        return Ok(());
    }

    writeln!(out, "[{}] {}", report.act, report.outcome.prompt())?;
    let frame = &report.frame;
    writeln!(
        out,
        "  frame: domain={} subject={} role={} intent={}",
        frame.topic_assignment.domain,
        frame.topic_assignment.subject,
        frame.role.as_deref().unwrap_or("-"),
        frame.intent.map(|i| i.as_str()).unwrap_or("-"),
    )?;
    if !report.diagnostics.is_empty() {
        writeln!(out, "  diagnostics: {:?}", report.diagnostics)?;
    }
    Ok(())
}
