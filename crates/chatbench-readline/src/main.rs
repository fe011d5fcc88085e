use std::borrow::Cow::{self, Borrowed, Owned};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

use chatbench_core::{AppConfig, ChatSession, ConversationClient, MessageRole, Prompt};
use chatbench_execution::{BatchRunner, CancellationToken, SweepEvent};
use chatbench_infrastructure::{CsvPromptLoader, init_tracing, load_config};
use chatbench_interaction::GeminiApiBackend;

mod command;
mod render;

use command::{COMMANDS, ReplCommand, help_text};

type SharedSession = Arc<Mutex<ChatSession<GeminiApiBackend>>>;

/// CLI helper for rustyline that provides completion, highlighting, and hints.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

/// A sweep running in the background.
struct RunningSweep {
    handle: JoinHandle<()>,
    cancel: CancellationToken,
}

impl RunningSweep {
    fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }
}

/// The interactive chat front-end.
///
/// Startup failures (configuration, prompt source) end the process before
/// the prompt appears. Afterwards:
/// 1. Free text is sent to the shared session in a background task
/// 2. `/run` launches the sweep as a cancellable background task
/// 3. Sweep progress arrives over a channel and is rendered as it happens
/// 4. Service errors are printed inline and the REPL keeps going
#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("warn");

    // ===== Backend Initialization =====
    let config = Arc::new(load_config(None).context("failed to load configuration")?);
    let prompts: Arc<Vec<Prompt>> = Arc::new(
        CsvPromptLoader::from_settings(&config.prompts)
            .load(&config.prompts.path)
            .context("failed to load prompts")?,
    );
    let backend = GeminiApiBackend::from_config(&config)?;
    let session: SharedSession = Arc::new(Mutex::new(ChatSession::new(backend)));

    // Sweep progress from background sweeps
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<SweepEvent>();
    let renderer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            render::print_sweep_event(&event);
        }
    });

    // ===== REPL Setup =====
    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    println!("{}", "=== ChatBot ===".bright_magenta().bold());
    render::print_notice(&format!(
        "{} prompts x {} contexts loaded. Type /help for commands or 'quit' to exit.",
        prompts.len(),
        config.contexts.len()
    ));
    println!();

    let mut sweep: Option<RunningSweep> = None;

    // ===== Main REPL Loop =====
    loop {
        let readline = rl.readline(">> ");

        match readline {
            Ok(line) => {
                let command = ReplCommand::parse(&line);
                if !matches!(command, ReplCommand::Empty) {
                    let _ = rl.add_history_entry(line.as_str());
                }

                match command {
                    ReplCommand::Empty => continue,
                    ReplCommand::Quit => {
                        println!("{}", "Goodbye!".bright_green());
                        break;
                    }
                    ReplCommand::Run => {
                        if sweep.as_ref().is_some_and(RunningSweep::is_active) {
                            render::print_notice("A sweep is already running; /cancel stops it.");
                            continue;
                        }
                        sweep = Some(start_sweep(
                            Arc::clone(&config),
                            Arc::clone(&prompts),
                            Arc::clone(&session),
                            event_tx.clone(),
                        ));
                    }
                    ReplCommand::Cancel => match sweep.as_ref().filter(|s| s.is_active()) {
                        Some(running) => {
                            running.cancel.cancel();
                            render::print_notice("Cancelling after the current call...");
                        }
                        None => render::print_notice("No sweep is running."),
                    },
                    ReplCommand::History => {
                        let session = session.lock().await;
                        let header = render::session_header(session.id(), session.created_at());
                        render::print_history(&header, session.history());
                    }
                    ReplCommand::Prompts => {
                        for (i, prompt) in prompts.iter().enumerate() {
                            println!("{:>3}. {}", i + 1, prompt);
                        }
                    }
                    ReplCommand::Contexts => {
                        for (i, context) in config.contexts.iter().enumerate() {
                            println!("{:>3}. {}", i + 1, render::context_label(context));
                        }
                    }
                    ReplCommand::Help => println!("{}", help_text()),
                    ReplCommand::Unknown(name) => {
                        render::print_notice(&format!("Unknown command {name}; try /help."));
                    }
                    ReplCommand::Message(text) => {
                        render::print_message(MessageRole::User, &text);
                        spawn_chat_turn(Arc::clone(&session), text);
                    }
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                render::print_error(&format!("Error: {err:?}"));
                break;
            }
        }
    }

    // The session ends with the REPL; a running sweep stops after its current call.
    if let Some(running) = sweep.take() {
        running.cancel.cancel();
        let _ = running.handle.await;
    }
    drop(event_tx);
    let _ = renderer.await;

    Ok(())
}

fn start_sweep(
    config: Arc<AppConfig>,
    prompts: Arc<Vec<Prompt>>,
    session: SharedSession,
    events: mpsc::UnboundedSender<SweepEvent>,
) -> RunningSweep {
    let cancel = CancellationToken::new();
    let runner = BatchRunner::new(config.contexts.clone())
        .with_events(events)
        .with_cancellation(cancel.clone());

    let handle = tokio::spawn(async move {
        let result = runner
            .run_to_file(&prompts, session.as_ref(), &config.output_path)
            .await;
        match result {
            Ok(summary) => tracing::info!(
                "Sweep wrote {} rows to {}",
                summary.completed(),
                config.output_path.display()
            ),
            // Already reported through the event channel.
            Err(e) => tracing::debug!("Sweep ended with error: {}", e),
        }
    });

    RunningSweep { handle, cancel }
}

fn spawn_chat_turn(session: SharedSession, text: String) {
    tokio::spawn(async move {
        let reply = session.lock().await.send(&text).await;
        match reply {
            Ok(reply) => render::print_message(MessageRole::Model, &reply),
            Err(e) => render::print_error(&format!("Error: {e}")),
        }
    });
}
