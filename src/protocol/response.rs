//! Response definitions
//!
//! Represents responses to clients.

use serde::{Deserialize, Serialize};

use super::MAX_PAYLOAD_SIZE;
use crate::error::{Result, StoreError};
use crate::store::{User, UserId};

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0x00,
    Created = 0x01,
    NotFound = 0x02,
    BadRequest = 0x03,
    Error = 0x04,
}

impl Status {
    /// Parse a status byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Status::Ok),
            0x01 => Some(Status::Created),
            0x02 => Some(Status::NotFound),
            0x03 => Some(Status::BadRequest),
            0x04 => Some(Status::Error),
            _ => None,
        }
    }
}

/// Successful result of a command, carried in OK/CREATED payloads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reply {
    Users(Vec<User>),
    User(User),
    Created(User),
    Updated(User),
    Deleted { id: UserId },
    Pong,
}

/// A response to send to client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code
    pub status: Status,

    /// Optional payload (encoded reply on success, message otherwise)
    pub payload: Option<Vec<u8>>,
}

impl Response {
    /// Build an OK or CREATED response carrying the encoded reply
    ///
    /// A reply that would not fit in one frame is an error, so the caller can
    /// answer with an ERROR frame instead of one the peer must reject.
    pub fn from_reply(reply: &Reply) -> Result<Self> {
        let status = match reply {
            Reply::Created(_) => Status::Created,
            _ => Status::Ok,
        };

        let payload = bincode::serialize(reply)?;
        if payload.len() > MAX_PAYLOAD_SIZE as usize {
            return Err(StoreError::Protocol(format!(
                "reply too large: {} bytes (max {})",
                payload.len(),
                MAX_PAYLOAD_SIZE
            )));
        }

        Ok(Self {
            status,
            payload: Some(payload),
        })
    }

    /// Create a NOT_FOUND response
    pub fn not_found() -> Self {
        Self::with_message(Status::NotFound, "user not found")
    }

    /// Create a BAD_REQUEST response
    pub fn bad_request(message: &str) -> Self {
        Self::with_message(Status::BadRequest, message)
    }

    /// Create an ERROR response
    pub fn error(message: &str) -> Self {
        Self::with_message(Status::Error, message)
    }

    fn with_message(status: Status, message: &str) -> Self {
        Self {
            status,
            payload: Some(message.as_bytes().to_vec()),
        }
    }

    /// Check for OK or CREATED
    pub fn is_success(&self) -> bool {
        matches!(self.status, Status::Ok | Status::Created)
    }

    /// Decode the reply of a successful response
    pub fn reply(&self) -> Result<Reply> {
        if !self.is_success() {
            return Err(StoreError::Protocol(format!(
                "{:?} response carries no reply",
                self.status
            )));
        }

        let payload = self
            .payload
            .as_deref()
            .ok_or_else(|| StoreError::Protocol("missing reply payload".to_string()))?;

        Ok(bincode::deserialize(payload)?)
    }

    /// Message text of a failed response
    pub fn message(&self) -> String {
        self.payload
            .as_deref()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .unwrap_or_default()
    }
}
