//! Input validation for connection settings and identities

/// Port used when a server address omits one.
pub const DEFAULT_PORT: u16 = 3001;

const MAX_ROOM_LEN: usize = 64;
const MAX_USERNAME_LEN: usize = 32;

/// Validates a room name
pub fn validate_room_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Room name cannot be empty".to_string());
    }

    if name.chars().count() > MAX_ROOM_LEN {
        return Err(format!("Room name too long (max {} characters)", MAX_ROOM_LEN));
    }

    if name.contains(|c: char| c.is_control()) {
        return Err("Room name contains invalid characters".to_string());
    }

    Ok(())
}

/// Validates the display name used as message author
pub fn validate_username(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Username cannot be empty".to_string());
    }

    if name.chars().count() > MAX_USERNAME_LEN {
        return Err(format!("Username too long (max {} characters)", MAX_USERNAME_LEN));
    }

    if let Some(c) = name.chars().find(|c| c.is_control() || c.is_whitespace()) {
        return Err(format!("Invalid character {:?} in username", c));
    }

    Ok(())
}

/// Validates a server address (host:port format)
pub fn validate_server_address(addr: &str) -> Result<(String, u16), String> {
    if addr.is_empty() {
        return Err("Server address cannot be empty".to_string());
    }

    let parts: Vec<&str> = addr.split(':').collect();

    match parts.as_slice() {
        [host] => {
            if host.is_empty() {
                return Err("Hostname cannot be empty".to_string());
            }
            Ok((host.to_string(), DEFAULT_PORT))
        }
        [host, port] => {
            if host.is_empty() {
                return Err("Hostname cannot be empty".to_string());
            }

            let port_num = port
                .parse::<u16>()
                .map_err(|_| format!("Invalid port number: {}", port))?;

            if port_num == 0 {
                return Err("Port number must be greater than 0".to_string());
            }

            Ok((host.to_string(), port_num))
        }
        _ => Err("Invalid server format. Use 'host:port' or 'host'".to_string()),
    }
}
