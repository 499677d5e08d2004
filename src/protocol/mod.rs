//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Protocol Format (V1 - Simple Binary)
//!
//! ### Request Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Commands
//! - 0x01: LIST   - Payload: empty
//! - 0x02: GET    - Payload: id (8)
//! - 0x03: CREATE - Payload: name_len (4) + name + email_len (4) + email
//! - 0x04: UPDATE - Payload: id (8) + name_len (4) + name + email_len (4) + email
//! - 0x05: DELETE - Payload: id (8)
//! - 0x06: PING   - Payload: empty
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Status Codes
//! - 0x00: OK          - Payload: bincode `Reply`
//! - 0x01: CREATED     - Payload: bincode `Reply::Created`
//! - 0x02: NOT_FOUND   - Payload: message
//! - 0x03: BAD_REQUEST - Payload: message
//! - 0x04: ERROR       - Payload: message

mod command;
mod response;
mod codec;

pub use command::{Command, CommandType};
pub use response::{Reply, Response, Status};
pub use codec::{
    decode_command, decode_response, encode_command, encode_response, read_command,
    read_response, write_command, write_response, HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
