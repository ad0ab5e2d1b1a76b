//! Diagnostic logging setup
//!
//! Logs go to a file under the platform data directory so they never mix with
//! the chat view on the terminal:
//! XDG_DATA_HOME/roomchat/logs/roomchat.log on Linux.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "roomchat=info";

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides the default filter. If the log file cannot be opened
/// output falls back to stderr. Returns the log file path when one is used.
pub fn init() -> Option<PathBuf> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    match open_log_file() {
        Ok((path, file)) => {
            let _ = registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(Mutex::new(file))
                        .with_ansi(false),
                )
                .try_init();
            Some(path)
        }
        Err(e) => {
            let _ = registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .try_init();
            tracing::warn!("logging to stderr: {}", e);
            None
        }
    }
}

fn open_log_file() -> Result<(PathBuf, fs::File), String> {
    let log_dir = get_log_directory()?;
    fs::create_dir_all(&log_dir).map_err(|e| format!("Failed to create log directory: {}", e))?;

    let path = log_dir.join("roomchat.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| format!("Failed to open log file: {}", e))?;
    Ok((path, file))
}

/// Get the platform-specific log directory using XDG conventions
fn get_log_directory() -> Result<PathBuf, String> {
    let base = directories::BaseDirs::new().ok_or("Failed to determine home directory")?;
    Ok(base.data_dir().join("roomchat").join("logs"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_directory_is_namespaced() {
        if let Ok(path) = get_log_directory() {
            assert!(path.ends_with("roomchat/logs"));
        }
    }
}
