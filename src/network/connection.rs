//! Connection Handler
//!
//! Handles individual client connections.

use std::io::{BufReader, BufWriter, ErrorKind};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Result, StoreError};
use crate::protocol::{read_command, write_response, Command, Response};
use crate::router::Router;

/// Handles a single client connection
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Router shared by every connection
    router: Arc<Router>,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    ///
    /// Sets up buffered I/O
    pub fn new(stream: TcpStream, router: Arc<Router>) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            router,
            peer_addr,
        })
    }

    /// Configure connection timeouts (0 leaves a timeout disabled)
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        if read_ms > 0 {
            self.reader
                .get_ref()
                .set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            self.writer
                .get_ref()
                .set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }

        Ok(())
    }

    /// Serve commands until the session ends (blocking)
    ///
    /// A hangup or an idle read timeout ends the session cleanly. A malformed
    /// frame is answered with ERROR and ends it with that error.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        loop {
            let command = match read_command(&mut self.reader) {
                Ok(command) => command,
                Err(e) => return self.close_after_read(e),
            };

            tracing::trace!("Received command from {}: {:?}", self.peer_addr, command);

            let response = self.execute_command(command);

            if let Err(e) = self.send_response(response) {
                if hangup(&e).is_some() {
                    tracing::debug!("Client {} left before its response was sent", self.peer_addr);
                    return Ok(());
                }
                tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                return Err(e);
            }
        }
    }

    fn close_after_read(&mut self, err: StoreError) -> Result<()> {
        match hangup(&err) {
            Some(Hangup::Disconnected) => {
                tracing::debug!("Client {} disconnected", self.peer_addr);
                Ok(())
            }
            Some(Hangup::Idle) => {
                tracing::debug!("Client {} idle past read timeout", self.peer_addr);
                Ok(())
            }
            None => {
                tracing::warn!("Bad request frame from {}: {}", self.peer_addr, err);
                let _ = self.send_response(Response::error(&err.to_string()));
                Err(err)
            }
        }
    }

    /// Execute a command and return a response
    fn execute_command(&self, command: Command) -> Response {
        let result = self
            .router
            .execute(command)
            .and_then(|reply| Response::from_reply(&reply));

        match result {
            Ok(response) => response,
            Err(StoreError::NotFound(_)) => Response::not_found(),
            Err(StoreError::InvalidInput(message)) => Response::bad_request(&message),
            Err(e) => {
                tracing::error!("Command from {} failed: {}", self.peer_addr, e);
                Response::error(&e.to_string())
            }
        }
    }

    /// Send a response to the client
    fn send_response(&mut self, response: Response) -> Result<()> {
        write_response(&mut self.writer, &response)
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

/// Ways a session ends without anything being wrong with the request
enum Hangup {
    Disconnected,
    Idle,
}

fn hangup(err: &StoreError) -> Option<Hangup> {
    let StoreError::Io(io_err) = err else {
        return None;
    };

    match io_err.kind() {
        ErrorKind::UnexpectedEof
        | ErrorKind::ConnectionReset
        | ErrorKind::ConnectionAborted
        | ErrorKind::BrokenPipe
        | ErrorKind::NotConnected => Some(Hangup::Disconnected),
        ErrorKind::WouldBlock | ErrorKind::TimedOut => Some(Hangup::Idle),
        _ => None,
    }
}
