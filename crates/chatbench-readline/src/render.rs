//! Terminal rendering for the conversation and sweep progress.

use chatbench_core::{ConversationMessage, MessageRole};
use chatbench_execution::SweepEvent;
use colored::Colorize;

/// Longest response excerpt shown in a sweep progress line.
const PREVIEW_CHARS: usize = 80;

/// Prints one conversation turn under its display role.
pub fn print_message(role: MessageRole, content: &str) {
    let header = format!("[{}]", role.display_name());
    match role {
        MessageRole::User => {
            println!("{}", header.bright_green());
            for line in content.lines() {
                println!("{}", line.green());
            }
        }
        MessageRole::Model => {
            println!("{}", header.bright_magenta());
            for line in content.lines() {
                println!("{}", line.bright_blue());
            }
        }
    }
    println!();
}

/// Header shown above a history replay.
pub fn session_header(id: &str, created_at: &str) -> String {
    format!("Session {id} (started {created_at})")
}

pub fn print_history(header: &str, history: &[ConversationMessage]) {
    println!("{}", header.bright_black());
    if history.is_empty() {
        println!("{}", "No messages yet.".bright_black());
        return;
    }
    for message in history {
        print_message(message.role, &message.content);
    }
}

pub fn print_error(message: &str) {
    eprintln!("{}", message.red());
}

pub fn print_notice(message: &str) {
    println!("{}", message.bright_black());
}

/// Prints a sweep update. Completed calls also render the reply as an
/// assistant turn, the way the conversation shows it.
pub fn print_sweep_event(event: &SweepEvent) {
    let line = describe_sweep_event(event);
    match event {
        SweepEvent::Started { .. } | SweepEvent::Finished(_) => {
            println!("{}", line.bright_yellow())
        }
        SweepEvent::Completed { record, .. } => {
            println!("{}", line.yellow());
            print_message(MessageRole::Model, &record.response);
        }
        SweepEvent::Failed { .. } | SweepEvent::Aborted { .. } => eprintln!("{}", line.red()),
    }
}

/// One-line plain-text summary of a sweep event.
pub fn describe_sweep_event(event: &SweepEvent) -> String {
    match event {
        SweepEvent::Started { total } => format!("Sweep started: {total} calls"),
        SweepEvent::Completed {
            index,
            total,
            record,
        } => format!(
            "[{}/{}] {} | {}",
            index + 1,
            total,
            context_label(&record.context),
            preview(&record.prompt)
        ),
        SweepEvent::Failed {
            index,
            total,
            record,
            error,
        } => format!(
            "[{}/{}] {} | {} failed: {}",
            index + 1,
            total,
            context_label(&record.context),
            preview(&record.prompt),
            error
        ),
        SweepEvent::Finished(summary) if summary.cancelled => format!(
            "Sweep cancelled after {} of {} calls ({} failed)",
            summary.completed(),
            summary.total,
            summary.failed
        ),
        SweepEvent::Finished(summary) => format!(
            "Sweep finished: {} succeeded, {} failed",
            summary.succeeded, summary.failed
        ),
        SweepEvent::Aborted { error } => format!("Sweep aborted: {error}"),
    }
}

pub fn context_label(context: &str) -> &str {
    if context.is_empty() { "(no context)" } else { context }
}

fn preview(text: &str) -> String {
    let first_line = text.lines().next().unwrap_or_default();
    if first_line.chars().count() > PREVIEW_CHARS {
        let cut: String = first_line.chars().take(PREVIEW_CHARS).collect();
        format!("{cut}...")
    } else {
        first_line.to_string()
    }
}
