use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::transport::Endpoint;
use crate::validation::{validate_room_name, validate_server_address, validate_username};

// Default configuration
pub const DEFAULT_SERVER: &str = "localhost:3001";
pub const DEFAULT_ROOM: &str = "lobby";

/// Settings for the terminal client.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// `host[:port]` of the room broadcast service
    pub server: String,
    pub use_tls: bool,
    pub username: String,
    pub room: String,
    /// Largest attachment accepted for sending; `None` means no limit
    pub max_attachment_bytes: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            use_tls: false,
            username: "guest".to_string(),
            room: DEFAULT_ROOM.to_string(),
            max_attachment_bytes: None,
        }
    }
}

impl Settings {
    /// Check every field and resolve the server address into an [`Endpoint`].
    pub fn validate(&self) -> Result<Endpoint, ConfigError> {
        let (host, port) = validate_server_address(&self.server).map_err(ConfigError::Invalid)?;
        validate_username(&self.username).map_err(ConfigError::Invalid)?;
        validate_room_name(&self.room).map_err(ConfigError::Invalid)?;
        Ok(Endpoint::new(host, port, self.use_tls))
    }
}

pub fn settings_path() -> Result<PathBuf, ConfigError> {
    let proj = ProjectDirs::from("com", "roomchat", "roomchat").ok_or(ConfigError::NoConfigDir)?;
    let dir = proj.config_dir();
    fs::create_dir_all(dir)?;
    Ok(dir.join("settings.json"))
}

/// Load settings from the default location, falling back to defaults when
/// no file exists yet.
pub fn load_settings() -> Result<Settings, ConfigError> {
    load_settings_from(&settings_path()?)
}

pub fn load_settings_from(path: &Path) -> Result<Settings, ConfigError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(serde_json::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Settings::default()),
        Err(e) => Err(e.into()),
    }
}

pub fn save_settings(settings: &Settings) -> Result<(), ConfigError> {
    save_settings_to(settings, &settings_path()?)
}

pub fn save_settings_to(settings: &Settings, path: &Path) -> Result<(), ConfigError> {
    let data = serde_json::to_string_pretty(settings)?;
    let mut file = fs::File::create(path)?;
    file.write_all(data.as_bytes())?;
    Ok(())
}
