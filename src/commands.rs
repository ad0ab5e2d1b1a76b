//! Terminal command parsing (/file, /drop, /help, /quit).

use std::path::PathBuf;

/// What one line of terminal input asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCommand {
    /// Select a file for the next submit
    SelectFile(PathBuf),
    /// Discard the pending file selection
    DropFile,
    Help,
    Quit,
    /// Set the message text to this line and submit; an empty line only
    /// submits whatever file is pending
    Submit(String),
    /// A `/` command that is malformed or unknown, with a hint for the user
    Invalid(String),
}

pub const HELP_TEXT: &str = "\
Commands:
  /file <path>   select a file to send (replaces any earlier selection)
  /drop          forget the selected file
  /help          show this help
  /quit          leave the room
Anything else is sent as a message. An empty line sends the selected file.";

/// Parse one line from the terminal. Lines not starting with '/' are messages.
pub fn parse_input(line: &str) -> InputCommand {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some(cmdline) = line.strip_prefix('/') else {
        return InputCommand::Submit(line.to_string());
    };

    let (cmd, rest) = match cmdline.split_once(char::is_whitespace) {
        Some((cmd, rest)) => (cmd, rest.trim()),
        None => (cmdline, ""),
    };

    match cmd.to_lowercase().as_str() {
        "file" | "f" => {
            if rest.is_empty() {
                InputCommand::Invalid("Usage: /file <path>".into())
            } else {
                InputCommand::SelectFile(PathBuf::from(rest))
            }
        }
        "drop" => InputCommand::DropFile,
        "help" | "h" | "?" => InputCommand::Help,
        "quit" | "exit" | "q" => InputCommand::Quit,
        // "//text" sends "/text" literally
        _ if cmdline.starts_with('/') => InputCommand::Submit(cmdline.to_string()),
        other => InputCommand::Invalid(format!("Unknown command: /{} (try /help)", other)),
    }
}
