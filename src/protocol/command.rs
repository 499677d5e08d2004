//! Command definitions
//!
//! Represents commands from clients.

use crate::store::UserId;

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    List = 0x01,
    Get = 0x02,
    Create = 0x03,
    Update = 0x04,
    Delete = 0x05,
    Ping = 0x06,
}

impl CommandType {
    /// Parse a command byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(CommandType::List),
            0x02 => Some(CommandType::Get),
            0x03 => Some(CommandType::Create),
            0x04 => Some(CommandType::Update),
            0x05 => Some(CommandType::Delete),
            0x06 => Some(CommandType::Ping),
            _ => None,
        }
    }
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List all users
    List,

    /// Get a user by id
    Get { id: UserId },

    /// Create a user; the server assigns the id
    Create { name: String, email: String },

    /// Replace name and email of an existing user
    Update {
        id: UserId,
        name: String,
        email: String,
    },

    /// Delete a user by id
    Delete { id: UserId },

    /// Ping (health check)
    Ping,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::List => CommandType::List,
            Command::Get { .. } => CommandType::Get,
            Command::Create { .. } => CommandType::Create,
            Command::Update { .. } => CommandType::Update,
            Command::Delete { .. } => CommandType::Delete,
            Command::Ping => CommandType::Ping,
        }
    }
}
