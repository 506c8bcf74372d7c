use std::borrow::Cow::{self, Borrowed, Owned};
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tracing_subscriber::EnvFilter;

use parley_application::{
    ChatOrchestrator, ChatState, NoticeReceiver, OrchestratorSettings, SendOutcome, SendRejection,
    SwitchOutcome, SwitchRejection, UpdateOutcome,
};
use parley_core::credential::CredentialStore;
use parley_core::notice::Notice;
use parley_core::session::Message;
use parley_infrastructure::{
    ConfigStorage, FileCredentialStore, HttpChatApi, ParleyPaths, load_file_upload,
};

mod commands;

use commands::{COMMANDS, Command};

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

        if line.starts_with('/') && !line.contains(' ') {
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

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Prints notices as they arrive, until the orchestrator is dropped.
async fn print_notices(mut notices: NoticeReceiver) {
    while let Some(notice) = notices.recv().await {
        match notice {
            Notice::SignedOut => println!("{}", notice.to_string().red().bold()),
            Notice::ProcessingFailed { .. } | Notice::ProcessingTimeout { .. } => {
                println!("{}", notice.to_string().red())
            }
            _ => println!("{}", notice.to_string().yellow()),
        }
    }
}

fn print_message(message: &Message) {
    println!("{}", format!("> {}", message.question).green());
    if let Some(steps) = &message.reasoning_steps {
        for step in steps {
            let line = match &step.detail {
                Some(detail) => format!("  · {}: {} ({})", step.agent, step.action, detail),
                None => format!("  · {}: {}", step.agent, step.action),
            };
            println!("{}", line.bright_black());
        }
    }
    for line in message.answer.lines() {
        println!("{}", line.bright_blue());
    }
    println!();
}

fn print_sessions(state: &ChatState, untitled: &str) {
    if state.sessions().is_empty() {
        println!("{}", "No sessions yet. Ask something or use /new.".bright_black());
        return;
    }
    for (index, session) in state.sessions().iter().enumerate() {
        let marker = if state.active_session() == Some(session.id.as_str()) {
            "*"
        } else {
            " "
        };
        println!(
            "{} {:>3}. {} {}",
            marker.bright_green(),
            index + 1,
            session.display_title(untitled),
            format!("[{}, {} messages]", session.id, session.message_count).bright_black()
        );
    }
}

fn print_status(state: &ChatState, untitled: &str) {
    let session = state
        .active_session()
        .map(|id| {
            state
                .sessions()
                .iter()
                .find(|s| s.id == id)
                .map(|s| s.display_title(untitled))
                .unwrap_or_else(|| id.to_string())
        })
        .unwrap_or_else(|| "(none)".to_string());
    println!("{} {}", "Session:".bright_black(), session);

    match state.attachment() {
        Some(attachment) => println!(
            "{} {} ({})",
            "Attachment:".bright_black(),
            attachment.short_name(),
            attachment.status_label()
        ),
        None => println!("{} (none)", "Attachment:".bright_black()),
    }
}

/// Resolves a 1-based list position to a session id; anything else is taken as an id.
fn resolve_session(state: &ChatState, target: &str) -> String {
    target
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|index| state.sessions().get(index))
        .map(|session| session.id.clone())
        .unwrap_or_else(|| target.to_string())
}

fn describe_send_rejection(rejection: SendRejection) -> &'static str {
    match rejection {
        SendRejection::BlankQuestion => "Nothing to send.",
        SendRejection::SendInFlight => "Still waiting for the previous answer.",
        SendRejection::SessionLoading => "The session is still loading.",
        SendRejection::AttachmentNotReady => {
            "The attached document is not ready yet. Check /status or /detach it."
        }
    }
}

fn describe_switch_rejection(rejection: SwitchRejection) -> &'static str {
    match rejection {
        SwitchRejection::SendInFlight => "Wait for the current answer before switching.",
        SwitchRejection::SessionLoading => "A session is already loading.",
        SwitchRejection::UploadInFlight => "Wait for the upload to finish before switching.",
    }
}

fn report_switch(outcome: SwitchOutcome, state: &ChatState) {
    match outcome {
        SwitchOutcome::Activated => {
            for message in state.transcript().messages() {
                print_message(message);
            }
            if let Some(id) = state.active_session() {
                println!("{}", format!("Session {id} is active.").bright_green());
            }
        }
        SwitchOutcome::Deactivated => println!("{}", "No session is active.".bright_green()),
        SwitchOutcome::Rejected(rejection) => {
            println!("{}", describe_switch_rejection(rejection).yellow())
        }
        // Failures are reported through notices.
        SwitchOutcome::Failed | SwitchOutcome::Superseded => {}
    }
}

async fn ask(chat: &ChatOrchestrator, question: &str) {
    println!(
        "{}",
        chat.settings().text.processing_placeholder.bright_black()
    );
    match chat.send(question).await {
        SendOutcome::Answered => {
            let state = chat.snapshot().await;
            if let Some(message) = state.transcript().messages().last() {
                print_message(message);
            }
        }
        SendOutcome::Failed => println!("{}", chat.settings().text.send_failure.red()),
        SendOutcome::Rejected(rejection) => {
            println!("{}", describe_send_rejection(rejection).yellow())
        }
        SendOutcome::Discarded => {}
    }
}

/// Runs one command. Returns `false` when the REPL should stop.
async fn run_command(chat: &ChatOrchestrator, command: Command) -> bool {
    let untitled = chat.settings().text.untitled_session.clone();
    match command {
        Command::Quit => return false,
        Command::Help => {
            println!("{}", "Type a question to ask it. Commands:".bright_black());
            println!("{}", COMMANDS.join("  ").bright_black());
        }
        Command::Ask(question) => ask(chat, &question).await,
        Command::New(title) => {
            let outcome = chat.create_session(title.as_deref()).await;
            report_switch(outcome, &chat.snapshot().await);
        }
        Command::ListSessions => {
            chat.refresh_sessions().await;
            print_sessions(&chat.snapshot().await, &untitled);
        }
        Command::Open(target) => {
            let id = resolve_session(&chat.snapshot().await, &target);
            let outcome = chat.activate(Some(&id)).await;
            report_switch(outcome, &chat.snapshot().await);
        }
        Command::Close => {
            let outcome = chat.activate(None).await;
            report_switch(outcome, &chat.snapshot().await);
        }
        Command::Rename { target, title } => {
            let id = resolve_session(&chat.snapshot().await, &target);
            match chat.rename_session(&id, &title).await {
                UpdateOutcome::Applied => println!("{}", "Renamed.".bright_green()),
                UpdateOutcome::Ignored => println!("{}", "Title is empty.".yellow()),
                UpdateOutcome::Failed => {}
            }
        }
        Command::Delete(target) => {
            let id = resolve_session(&chat.snapshot().await, &target);
            if chat.delete_session(&id).await == UpdateOutcome::Applied {
                println!("{}", format!("Deleted {id}.").bright_green());
            }
        }
        Command::DeleteAll => {
            if chat.delete_all_sessions().await == UpdateOutcome::Applied {
                println!("{}", "Deleted all sessions.".bright_green());
            }
        }
        Command::Attach(path) => match load_file_upload(Path::new(&path)).await {
            Ok(file) => {
                if let Ok(staged) = chat.stage_file(file).await {
                    println!(
                        "{}",
                        format!("Attached {} ({})", staged.short_name(), staged.status_label())
                            .bright_green()
                    );
                }
            }
            Err(e) => println!("{}", format!("Cannot read {path}: {e}").red()),
        },
        Command::Detach => match chat.clear_attachment().await {
            Some(attachment) => println!(
                "{}",
                format!("Removed {}.", attachment.short_name()).bright_green()
            ),
            None => println!("{}", "Nothing attached.".bright_black()),
        },
        Command::Status => print_status(&chat.snapshot().await, &untitled),
        Command::History => {
            for message in chat.snapshot().await.transcript().messages() {
                print_message(message);
            }
        }
        Command::Invalid(reason) => println!("{}", reason.yellow()),
    }
    true
}

/// The Parley readline client.
///
/// Loads configuration and the stored credential, wires the HTTP client into
/// the orchestrator, prints notices from a background task and runs the
/// REPL until the user quits or the credential is rejected.
#[tokio::main]
async fn main() -> Result<()> {
    let config = ConfigStorage::new()?.load()?;
    init_tracing(&config.log.filter);

    let credentials: Arc<dyn CredentialStore> = Arc::new(FileCredentialStore::open_default()?);
    if credentials.token().is_none() {
        eprintln!(
            "{}",
            "No credential found. Set PARLEY_TOKEN to sign in.".red()
        );
        return Ok(());
    }

    let api = Arc::new(HttpChatApi::new(&config.api.base_url, credentials.clone()));
    tracing::debug!("[Readline] Using API at {}", api.base_url());
    let (chat, notices) = ChatOrchestrator::new(
        api.clone(),
        api,
        credentials,
        OrchestratorSettings::from(&config),
    );
    let notice_printer = tokio::spawn(print_notices(notices));

    chat.refresh_sessions().await;

    // ===== REPL Setup =====
    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));
    let history_file = ParleyPaths::history_file().ok();
    if let Some(path) = &history_file {
        let _ = rl.load_history(path);
    }

    println!("{}", "=== Parley ===".bright_magenta().bold());
    println!(
        "{}",
        "Type a question, '/help' for commands, or 'quit' to exit.".bright_black()
    );
    println!();

    // ===== Main REPL Loop =====
    loop {
        match rl.readline(">> ") {
            Ok(line) => {
                let Some(command) = Command::parse(&line) else {
                    continue;
                };
                let _ = rl.add_history_entry(line.trim());

                if !run_command(&chat, command).await {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }
                if chat.is_signed_out().await {
                    break;
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
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    if let Some(path) = &history_file {
        if let Some(dir) = path.parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        let _ = rl.save_history(path);
    }

    // Background pollers may still hold the notice sender.
    drop(chat);
    notice_printer.abort();

    Ok(())
}
