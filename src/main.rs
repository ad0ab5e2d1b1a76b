//! roomchat - terminal client for a room-scoped chat service
//!
//! Architecture:
//! - One current-thread Tokio runtime; file reads use its blocking pool
//! - Stdin lines and a short inbound tick are multiplexed with `select!`
//! - The transport pushes inbound records into the session's queue, drained on each tick

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use roomchat::commands::{parse_input, InputCommand, HELP_TEXT};
use roomchat::composer::MessageComposer;
use roomchat::config::load_settings;
use roomchat::encoder::{FileEncoder, SelectedFile};
use roomchat::error::ChatError;
use roomchat::logging;
use roomchat::session::ChatSession;
use roomchat::transport::SocketTransport;

const INBOUND_TICK: Duration = Duration::from_millis(100);

fn main() -> ExitCode {
    let log_path = logging::init();

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("roomchat: failed to create Tokio runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Some(path) = log_path {
        println!("Logging to {}", path.display());
    }

    match rt.block_on(run()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("roomchat: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), ChatError> {
    let settings = load_settings()?;
    let endpoint = settings.validate()?;

    println!(
        "Connecting to {}:{}{}...",
        endpoint.host,
        endpoint.port,
        if endpoint.use_tls { " (TLS)" } else { "" }
    );
    let transport = Arc::new(SocketTransport::connect(endpoint).await?);

    let composer = MessageComposer::new(FileEncoder::with_limit(settings.max_attachment_bytes));
    let mut session = ChatSession::with_composer(
        transport.clone(),
        settings.room.clone(),
        settings.username.clone(),
        composer,
    );
    println!(
        "Chatting in '{}' as {}. Type /help for commands.",
        session.room(),
        session.author()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut tick = tokio::time::interval(INBOUND_TICK);
    let mut printed = 0;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        warn!("stdin read failed: {}", e);
                        break;
                    }
                };
                if !handle_line(&mut session, &line).await {
                    break;
                }
            }
            _ = tick.tick() => {
                session.process_inbound();
            }
        }
        printed = print_new_entries(&session, printed);
    }

    session.end();
    transport.disconnect().await;
    Ok(())
}

/// Apply one line of input. Returns false when the user asked to quit.
async fn handle_line(session: &mut ChatSession, line: &str) -> bool {
    match parse_input(line) {
        InputCommand::SelectFile(path) => {
            let file = SelectedFile::from_path(&path);
            let mime = if file.mime().is_empty() {
                "unknown type"
            } else {
                file.mime()
            };
            println!("Selected {} ({}). Press Enter to send.", file.name(), mime);
            session.select_file(file);
        }
        InputCommand::DropFile => {
            session.clear_file();
            println!("File selection cleared.");
        }
        InputCommand::Help => println!("{}", HELP_TEXT),
        InputCommand::Quit => return false,
        InputCommand::Submit(text) => {
            // An empty line keeps any text left over from a file send.
            if !text.is_empty() {
                session.set_text(text);
            }
            if let Err(e) = session.submit().await {
                eprintln!("Message not sent: {}", e);
            }
        }
        InputCommand::Invalid(hint) => println!("{}", hint),
    }
    true
}

fn print_new_entries(session: &ChatSession, printed: usize) -> usize {
    for entry in session.rendered().skip(printed) {
        println!("{}", entry);
    }
    session.history().len()
}
