/// Slash commands offered for completion, in help order.
pub const COMMANDS: [&str; 6] = ["/run", "/cancel", "/history", "/prompts", "/contexts", "/help"];

/// One line of REPL input, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Launch the full sweep in the background.
    Run,
    /// Stop a running sweep after its current call.
    Cancel,
    /// Replay the shared conversation.
    History,
    Prompts,
    Contexts,
    Help,
    Quit,
    /// A slash command we don't know.
    Unknown(String),
    /// Free text for the model.
    Message(String),
    Empty,
}

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        match trimmed {
            "" => ReplCommand::Empty,
            "quit" | "exit" | "/quit" | "/exit" => ReplCommand::Quit,
            "/run" => ReplCommand::Run,
            "/cancel" => ReplCommand::Cancel,
            "/history" => ReplCommand::History,
            "/prompts" => ReplCommand::Prompts,
            "/contexts" => ReplCommand::Contexts,
            "/help" => ReplCommand::Help,
            other if other.starts_with('/') => ReplCommand::Unknown(other.to_string()),
            other => ReplCommand::Message(other.to_string()),
        }
    }
}

pub fn help_text() -> &'static str {
    "/run       run every prompt under every context and write the results file\n\
     /cancel    stop a running sweep after the current call\n\
     /history   show the conversation so far\n\
     /prompts   list the loaded prompts\n\
     /contexts  list the context prefixes\n\
     /help      show this help\n\
     quit       leave (also: exit, Ctrl-D)\n\
     Anything else is sent to the model."
}
