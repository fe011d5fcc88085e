use anyhow::{Context, Result};
use chatbench_core::ChatSession;
use chatbench_execution::{BatchRunner, CancellationToken, SweepEvent};
use chatbench_infrastructure::{CsvPromptLoader, load_config};
use chatbench_interaction::GeminiApiBackend;
use std::path::PathBuf;
use tokio::sync::{Mutex, mpsc};

use crate::SourceArgs;

pub async fn run(source: &SourceArgs, output: Option<PathBuf>) -> Result<()> {
    let mut config = load_config(source.config.as_deref()).context("Failed to load configuration")?;
    if let Some(path) = &source.prompts {
        config.prompts.path = path.clone();
    }
    if let Some(path) = output {
        config.output_path = path;
    }

    let prompts = CsvPromptLoader::from_settings(&config.prompts)
        .load(&config.prompts.path)
        .with_context(|| {
            format!("Failed to load prompts from {}", config.prompts.path.display())
        })?;
    if prompts.is_empty() {
        println!(
            "⚠️  No prompts in {}; the results file will only hold the header",
            config.prompts.path.display()
        );
    }

    let backend = GeminiApiBackend::from_config(&config)?;
    tracing::info!("Using model {}", backend.model());
    let session = Mutex::new(ChatSession::new(backend));

    let cancel = CancellationToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                match on_interrupt(&cancel) {
                    Interrupt::Graceful => eprintln!(
                        "Interrupted; stopping after the current call (Ctrl-C again to quit now)..."
                    ),
                    Interrupt::Exit => {
                        eprintln!("Interrupted again; exiting");
                        std::process::exit(INTERRUPTED_EXIT_CODE);
                    }
                }
            }
        })
    };

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            print_event(&event);
        }
    });

    let runner = BatchRunner::new(config.contexts.clone())
        .with_events(event_tx)
        .with_cancellation(cancel);

    println!(
        "🚀 Running {} prompts x {} contexts against {}",
        prompts.len(),
        runner.contexts().len(),
        config.model
    );

    let result = runner
        .run_to_file(&prompts, &session, &config.output_path)
        .await;

    // Closing the channel lets the printer drain and stop.
    drop(runner);
    let _ = printer.await;
    ctrl_c.abort();

    let summary = result.with_context(|| {
        format!("Sweep aborted; partial results are in {}", config.output_path.display())
    })?;

    if summary.cancelled {
        println!(
            "⏹  Cancelled after {} of {} calls",
            summary.completed(),
            summary.total
        );
    } else {
        println!("✅ Sweep finished");
    }
    println!(
        "   {} succeeded, {} failed, results in {}",
        summary.succeeded,
        summary.failed,
        config.output_path.display()
    );

    Ok(())
}

/// Exit status after a forced stop (128 + SIGINT).
const INTERRUPTED_EXIT_CODE: i32 = 130;

#[derive(Debug, PartialEq, Eq)]
enum Interrupt {
    /// Stop between calls and keep the rows written so far.
    Graceful,
    /// The sweep was already cancelling; leave without waiting for the call.
    Exit,
}

fn on_interrupt(cancel: &CancellationToken) -> Interrupt {
    if cancel.is_cancelled() {
        Interrupt::Exit
    } else {
        cancel.cancel();
        Interrupt::Graceful
    }
}

fn print_event(event: &SweepEvent) {
    match event {
        SweepEvent::Started { total } => println!("   {total} calls queued"),
        SweepEvent::Completed {
            index,
            total,
            record,
        } => println!(
            "  ✓ [{}/{}] {}",
            index + 1,
            total,
            label(&record.context, &record.prompt)
        ),
        SweepEvent::Failed {
            index,
            total,
            record,
            error,
        } => eprintln!(
            "  ✗ [{}/{}] {}: {}",
            index + 1,
            total,
            label(&record.context, &record.prompt),
            error
        ),
        SweepEvent::Finished(_) => {}
        SweepEvent::Aborted { error } => eprintln!("  ✗ aborted: {error}"),
    }
}

fn label(context: &str, prompt: &str) -> String {
    let prompt = prompt.lines().next().unwrap_or_default();
    if context.is_empty() {
        format!("(no context) | {prompt}")
    } else {
        format!("{context} | {prompt}")
    }
}
