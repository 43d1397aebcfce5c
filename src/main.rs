//! CLI entry point: a `repl`/`learn`/`query`/`prove` front end over
//! `nesy_session::Session`, with a `reedline`-driven REPL loop
//! (`reedline::{DefaultPrompt, Reedline, Signal}`) and `tracing` for
//! diagnostics.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nesy_session::{Session, SessionConfig};
use reedline::{DefaultPrompt, Reedline, Signal};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "nesy", about = "Interactive neuro-symbolic reasoning engine")]
struct Cli {
    /// Path to a TOML session config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the interactive REPL (default when no subcommand is given).
    Repl,
    /// Learn every statement in a DSL file, then exit.
    Learn { file: PathBuf },
    /// Run a single query and print the bindings.
    Query { dsl: String },
    /// Run a single proof and print the result.
    Prove { dsl: String },
}

fn load_config(path: Option<&PathBuf>) -> Result<SessionConfig> {
    match path {
        Some(p) => {
            let src = std::fs::read_to_string(p).with_context(|| format!("reading config {}", p.display()))?;
            SessionConfig::from_toml_str(&src).with_context(|| format!("parsing config {}", p.display()))
        }
        None => Ok(SessionConfig::default()),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    let mut session = Session::new(config).context("initializing session")?;

    match cli.command.unwrap_or(Command::Repl) {
        Command::Repl => run_repl(&mut session),
        Command::Learn { file } => run_learn_file(&mut session, &file),
        Command::Query { dsl } => {
            run_query(&mut session, &dsl);
            Ok(())
        }
        Command::Prove { dsl } => {
            run_prove(&mut session, &dsl);
            Ok(())
        }
    }
}

fn run_learn_file(session: &mut Session, file: &PathBuf) -> Result<()> {
    let src = std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let span = tracing::info_span!("learn", file = %file.display());
    let _enter = span.enter();
    let result = session.learn(&src);
    if result.success {
        tracing::info!(facts = result.facts, "learned");
    } else {
        for err in &result.errors {
            tracing::error!(%err, "learn failed");
        }
        anyhow::bail!("learn failed: {}", result.errors.join("; "));
    }
    for warning in &result.warnings {
        tracing::warn!(%warning);
    }
    Ok(())
}

fn run_query(session: &mut Session, dsl: &str) {
    let span = tracing::info_span!("query");
    let _enter = span.enter();
    let result = session.query(dsl);
    if result.bindings.is_empty() {
        println!("success={} confidence={:.3}", result.success, result.confidence);
        for r in &result.all_results {
            println!("  method={} score={:.3}", r.method, r.score);
        }
        return;
    }
    for (hole, binding) in &result.bindings {
        println!("?{} = {} (similarity={:.3}, via {})", hole, binding.answer, binding.similarity, binding.method);
    }
}

fn run_prove(session: &mut Session, dsl: &str) {
    let span = tracing::info_span!("prove");
    let _enter = span.enter();
    let result = session.prove(dsl);
    println!("valid={} method={} confidence={:.3}", result.valid, result.method, result.confidence);
    if let Some(reason) = &result.reason {
        println!("reason: {reason}");
    }
}

fn run_repl(session: &mut Session) -> Result<()> {
    println!("nesy — interactive neuro-symbolic reasoning engine");
    println!("Statements are learned directly; prefix with ':query', ':prove', or ':quit'.");

    let mut line_editor = Reedline::create();
    let prompt = DefaultPrompt::default();

    loop {
        let sig = line_editor.read_line(&prompt);
        match sig {
            Ok(Signal::Success(buffer)) => {
                let input = buffer.trim();
                if input.is_empty() {
                    continue;
                }
                if input == ":quit" || input == ":q" {
                    break;
                }
                if let Some(rest) = input.strip_prefix(":query ") {
                    run_query(session, rest);
                } else if let Some(rest) = input.strip_prefix(":prove ") {
                    run_prove(session, rest);
                } else if input == ":close" {
                    session.close();
                    println!("session closed");
                } else {
                    let result = session.learn(&format!("{input}\n"));
                    if result.success {
                        println!("ok ({} fact(s))", result.facts);
                        for w in &result.warnings {
                            println!("warning: {w}");
                        }
                    } else {
                        for err in &result.errors {
                            println!("error: {err}");
                        }
                    }
                }
            }
            Ok(Signal::CtrlD) | Ok(Signal::CtrlC) => {
                println!("Aborting.");
                break;
            }
            Err(err) => {
                tracing::error!(?err, "reedline read error");
                break;
            }
        }
    }
    Ok(())
}
