//! Parsing of REPL input lines.

/// Slash commands offered for completion and hints.
pub const COMMANDS: &[&str] = &[
    "/new",
    "/sessions",
    "/open",
    "/close",
    "/rename",
    "/delete",
    "/delete-all",
    "/attach",
    "/detach",
    "/status",
    "/history",
    "/help",
];

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Help,
    /// Create a session, optionally titled.
    New(Option<String>),
    ListSessions,
    /// Open a session by id or by its 1-based position in the list.
    Open(String),
    Close,
    Rename { target: String, title: String },
    Delete(String),
    DeleteAll,
    Attach(String),
    Detach,
    Status,
    History,
    /// Plain text: a question to send.
    Ask(String),
    /// A slash command that is unknown or missing arguments.
    Invalid(String),
}

impl Command {
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        if line == "quit" || line == "exit" {
            return Some(Self::Quit);
        }
        if !line.starts_with('/') {
            return Some(Self::Ask(line.to_string()));
        }

        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };
        let arg = (!rest.is_empty()).then(|| rest.to_string());

        let command = match (name, arg) {
            ("/help", _) => Self::Help,
            ("/new", title) => Self::New(title),
            ("/sessions", _) => Self::ListSessions,
            ("/open", Some(target)) => Self::Open(target),
            ("/close", _) => Self::Close,
            ("/rename", Some(arg)) => match arg.split_once(char::is_whitespace) {
                Some((target, title)) => Self::Rename {
                    target: target.to_string(),
                    title: title.trim().to_string(),
                },
                None => Self::Invalid("usage: /rename <id|#> <title>".to_string()),
            },
            ("/delete", Some(target)) => Self::Delete(target),
            ("/delete-all", _) => Self::DeleteAll,
            ("/attach", Some(path)) => Self::Attach(path),
            ("/detach", _) => Self::Detach,
            ("/status", _) => Self::Status,
            ("/history", _) => Self::History,
            ("/open" | "/delete", None) => Self::Invalid(format!("usage: {name} <id|#>")),
            ("/attach", None) => Self::Invalid("usage: /attach <path>".to_string()),
            ("/rename", None) => Self::Invalid("usage: /rename <id|#> <title>".to_string()),
            (other, _) => Self::Invalid(format!("unknown command: {other}")),
        };
        Some(command)
    }
}
