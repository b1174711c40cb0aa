//! Scan Pilot - Entry Point
//!
//! Reads user turns from stdin, runs each through a session on its own
//! thread, and prints whatever the pipeline posts back.

use clap::Parser;
use scan_pilot::command::HttpCommandExecutor;
use scan_pilot::core::error::{PilotError, Result};
use scan_pilot::core::{Language, PilotConfig};
use scan_pilot::llm::{CompletionService, LlmClient, LlmService, OfflineCompletion, PromptTable};
use scan_pilot::session::{self, spawn_turn, Collaborators, Session, UiEvent};

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::{mpsc::Receiver, Arc, Mutex};
use std::thread::{self, JoinHandle};
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

/// Natural language assistant for a phased array inspection application
#[derive(Parser, Debug)]
#[command(name = "scan-pilot")]
#[command(about = "Talk to your inspection application in plain language")]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base URL of the application's command API
    #[arg(long)]
    executor_url: Option<String>,

    /// Default language for turns without a script hint (en, ko, ru)
    #[arg(long)]
    language: Option<String>,

    /// Log at debug level
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "scan_pilot=debug"
    } else {
        "scan_pilot=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(io::stderr)
        .init();

    let mut config = PilotConfig::load_or_default(args.config.as_deref())?;
    if let Some(url) = args.executor_url {
        config.executor.base_url = url;
    }
    if let Some(code) = args.language {
        config.default_language = Language::from_code(&code)
            .ok_or_else(|| PilotError::Config(format!("unsupported language: {}", code)))?;
    }

    // Async runtime for HTTP; pipeline threads drive it with block_on
    let rt = Runtime::new()?;

    let llm: Arc<dyn CompletionService> = match LlmClient::from_env(&config.llm) {
        Ok(client) => Arc::new(LlmService::new(client, rt.handle().clone())),
        Err(e) => {
            tracing::warn!("{} - answers and extraction fall back to keywords", e);
            Arc::new(OfflineCompletion)
        }
    };

    let mut prompts = PromptTable::builtin();
    if let Some(dir) = &config.prompts_dir {
        let loaded = prompts.load_overrides(dir)?;
        tracing::info!("Loaded {} prompt override(s) from {}", loaded, dir.display());
    }

    let app = Arc::new(HttpCommandExecutor::new(
        config.executor.base_url.clone(),
        rt.handle().clone(),
    ));
    tracing::info!("Sending commands to {}", config.executor.base_url);

    let services = Collaborators {
        llm,
        executor: app.clone(),
        directories: app,
    };
    let (events, rx) = session::channel();
    let session = Arc::new(Mutex::new(Session::start(config, prompts, services, events)?));
    let printer = spawn_printer(rx)?;

    println!("\n=== SCAN PILOT ===");
    println!("Ask a question or tell me what to do with your scan data.");
    println!("  /stop  - stop running queued commands");
    println!("  /quit  - exit");
    println!();

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let input = line.trim();
        match input {
            "" => continue,
            "/quit" => break,
            "/stop" => {
                lock(&session).stop();
                println!("Command dispatch stopped.");
                continue;
            }
            _ => {}
        }

        // This line-oriented front end reads nothing while a turn runs, so it
        // waits for the turn and its reply prints before the next input.
        // Command execution still happens on the dispatcher, off this loop.
        if spawn_turn(&session, input).join().is_err() {
            tracing::error!("Turn processing panicked");
        }
        io::stdout().flush()?;
    }

    {
        let mut session = lock(&session);
        session.wait_idle();
        session.stop();
    }
    // Dropping the session closes the last event sink, which ends the printer
    drop(session);
    if printer.join().is_err() {
        tracing::error!("Printer thread panicked");
    }

    println!("\nGoodbye!");
    Ok(())
}

fn lock(session: &Mutex<Session>) -> std::sync::MutexGuard<'_, Session> {
    session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Print UI events until every sink is gone
fn spawn_printer(rx: Receiver<UiEvent>) -> io::Result<JoinHandle<()>> {
    thread::Builder::new().name("printer".into()).spawn(move || {
        for event in rx {
            match event {
                UiEvent::Status(text) | UiEvent::Reply(text) => println!("{}\n", text),
                UiEvent::Executed(result) => {
                    println!("{}", result.status_message);
                    if !result.response_text.is_empty() {
                        println!("{}", result.response_text);
                    }
                    println!();
                }
            }
        }
    })
}
