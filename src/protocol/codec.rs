//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Request (Command) Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Payload by Command Type
//! - LIST:   empty
//! - GET:    id (8 bytes)
//! - CREATE: name_len (4 bytes) + name + email_len (4 bytes) + email
//! - UPDATE: id (8 bytes) + name_len (4 bytes) + name + email_len (4 bytes) + email
//! - DELETE: id (8 bytes)
//! - PING:   empty
//!
//! All integers are big-endian. Strings must be valid UTF-8.
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```

use std::io::{Read, Write};

use bytes::{Buf, BufMut, BytesMut};

use super::{Command, CommandType, Response, Status};
use crate::error::{Result, StoreError};
use crate::store::UserId;

/// Header size: 1 byte command/status + 4 bytes length
pub const HEADER_SIZE: usize = 5;

/// Maximum payload size (16 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

// =============================================================================
// Command Encoding/Decoding
// =============================================================================

/// Encode a command to bytes
///
/// Format: cmd_type (1) + payload_len (4) + payload
///
/// Fails if the payload exceeds `MAX_PAYLOAD_SIZE`
pub fn encode_command(command: &Command) -> Result<Vec<u8>> {
    let mut payload = BytesMut::new();

    match command {
        Command::List | Command::Ping => {}
        Command::Get { id } | Command::Delete { id } => payload.put_u64(*id),
        Command::Create { name, email } => {
            put_string(&mut payload, name);
            put_string(&mut payload, email);
        }
        Command::Update { id, name, email } => {
            payload.put_u64(*id);
            put_string(&mut payload, name);
            put_string(&mut payload, email);
        }
    }

    frame(command.command_type() as u8, &payload)
}

/// Decode a command from bytes
pub fn decode_command(bytes: &[u8]) -> Result<Command> {
    let (cmd_byte, mut payload) = split_frame(bytes, "command")?;

    let cmd_type = CommandType::from_byte(cmd_byte).ok_or_else(|| {
        StoreError::Protocol(format!("Unknown command type: 0x{:02x}", cmd_byte))
    })?;

    let command = match cmd_type {
        CommandType::List => Command::List,
        CommandType::Get => Command::Get {
            id: take_id(&mut payload, "GET")?,
        },
        CommandType::Create => Command::Create {
            name: take_string(&mut payload, "CREATE", "name")?,
            email: take_string(&mut payload, "CREATE", "email")?,
        },
        CommandType::Update => Command::Update {
            id: take_id(&mut payload, "UPDATE")?,
            name: take_string(&mut payload, "UPDATE", "name")?,
            email: take_string(&mut payload, "UPDATE", "email")?,
        },
        CommandType::Delete => Command::Delete {
            id: take_id(&mut payload, "DELETE")?,
        },
        CommandType::Ping => Command::Ping,
    };

    if !payload.is_empty() {
        return Err(StoreError::Protocol(format!(
            "{:?} command: unexpected {} trailing bytes",
            cmd_type,
            payload.len()
        )));
    }

    Ok(command)
}

fn put_string(buf: &mut BytesMut, value: &str) {
    buf.put_u32(value.len() as u32);
    buf.put_slice(value.as_bytes());
}

fn take_id(payload: &mut &[u8], command: &str) -> Result<UserId> {
    if payload.remaining() < 8 {
        return Err(StoreError::Protocol(format!(
            "{} command: missing id (expected 8 bytes, got {})",
            command,
            payload.remaining()
        )));
    }
    Ok(payload.get_u64())
}

fn take_string(payload: &mut &[u8], command: &str, field: &str) -> Result<String> {
    if payload.remaining() < 4 {
        return Err(StoreError::Protocol(format!(
            "{} command: missing {} length",
            command, field
        )));
    }

    let len = payload.get_u32() as usize;
    if payload.remaining() < len {
        return Err(StoreError::Protocol(format!(
            "{} command: incomplete {} (expected {}, got {})",
            command,
            field,
            len,
            payload.remaining()
        )));
    }

    let bytes = payload.copy_to_bytes(len);
    String::from_utf8(bytes.to_vec()).map_err(|_| {
        StoreError::Protocol(format!("{} command: {} is not valid UTF-8", command, field))
    })
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
///
/// Format: status (1) + payload_len (4) + payload
///
/// Fails if the payload exceeds `MAX_PAYLOAD_SIZE`
pub fn encode_response(response: &Response) -> Result<Vec<u8>> {
    let payload = response.payload.as_deref().unwrap_or(&[]);
    frame(response.status as u8, payload)
}

/// Decode a response from bytes
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    let (status_byte, payload) = split_frame(bytes, "response")?;

    let status = Status::from_byte(status_byte).ok_or_else(|| {
        StoreError::Protocol(format!("Unknown response status: 0x{:02x}", status_byte))
    })?;

    let payload = if payload.is_empty() {
        None
    } else {
        Some(payload.to_vec())
    };

    Ok(Response { status, payload })
}

// =============================================================================
// Framing
// =============================================================================

/// Peers reject frames above `MAX_PAYLOAD_SIZE`, so never produce one
fn frame(tag: u8, payload: &[u8]) -> Result<Vec<u8>> {
    if payload.len() > MAX_PAYLOAD_SIZE as usize {
        return Err(StoreError::Protocol(format!(
            "refusing to send {} byte payload (max {})",
            payload.len(),
            MAX_PAYLOAD_SIZE
        )));
    }

    let mut message = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    message.put_u8(tag);
    message.put_u32(payload.len() as u32);
    message.put_slice(payload);
    Ok(message.to_vec())
}

/// Split a complete frame into its tag byte and payload
fn split_frame<'a>(bytes: &'a [u8], what: &str) -> Result<(u8, &'a [u8])> {
    if bytes.len() < HEADER_SIZE {
        return Err(StoreError::Protocol(format!(
            "Incomplete {} header: expected {} bytes, got {}",
            what,
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let mut header = &bytes[..HEADER_SIZE];
    let tag = header.get_u8();
    let payload_len = check_payload_len(header.get_u32(), what)?;

    let total_len = HEADER_SIZE + payload_len;
    if bytes.len() < total_len {
        return Err(StoreError::Protocol(format!(
            "Incomplete {} payload: expected {} bytes, got {}",
            what,
            total_len,
            bytes.len()
        )));
    }

    Ok((tag, &bytes[HEADER_SIZE..total_len]))
}

fn check_payload_len(payload_len: u32, what: &str) -> Result<usize> {
    if payload_len > MAX_PAYLOAD_SIZE {
        return Err(StoreError::Protocol(format!(
            "{} payload too large: {} bytes (max {})",
            what, payload_len, MAX_PAYLOAD_SIZE
        )));
    }
    Ok(payload_len as usize)
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read one complete frame (header + payload) from a stream
///
/// Blocks until the frame is received or an error occurs
fn read_frame<R: Read>(reader: &mut R, what: &str) -> Result<Vec<u8>> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let payload_len = check_payload_len(
        u32::from_be_bytes([header[1], header[2], header[3], header[4]]),
        what,
    )?;

    let mut message = vec![0u8; HEADER_SIZE + payload_len];
    message[..HEADER_SIZE].copy_from_slice(&header);
    if payload_len > 0 {
        reader.read_exact(&mut message[HEADER_SIZE..])?;
    }

    Ok(message)
}

/// Read a complete command from a stream
pub fn read_command<R: Read>(reader: &mut R) -> Result<Command> {
    let message = read_frame(reader, "command")?;
    decode_command(&message)
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    writer.write_all(&encode_command(command)?)?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response from a stream
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    let message = read_frame(reader, "response")?;
    decode_response(&message)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    writer.write_all(&encode_response(response)?)?;
    writer.flush()?;
    Ok(())
}
