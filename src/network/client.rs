//! Blocking client
//!
//! Speaks the wire protocol over a single TCP connection.

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};

use crate::error::{Result, StoreError};
use crate::protocol::{read_response, write_command, Command, Reply, Response, Status};
use crate::store::{User, UserId};

/// Client for a userstore server
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl Client {
    /// Connect to a server
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .map_err(|e| StoreError::Network(format!("failed to connect: {}", e)))?;
        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
        })
    }

    /// Send a raw command and wait for its response
    pub fn call(&mut self, command: &Command) -> Result<Response> {
        write_command(&mut self.writer, command)?;
        read_response(&mut self.reader)
    }

    /// List all users
    pub fn list(&mut self) -> Result<Vec<User>> {
        match self.request(&Command::List, None)? {
            Reply::Users(users) => Ok(users),
            other => Err(unexpected(other)),
        }
    }

    /// Get a user by id
    pub fn get(&mut self, id: UserId) -> Result<User> {
        match self.request(&Command::Get { id }, Some(id))? {
            Reply::User(user) => Ok(user),
            other => Err(unexpected(other)),
        }
    }

    /// Create a user
    pub fn create(&mut self, name: &str, email: &str) -> Result<User> {
        let command = Command::Create {
            name: name.to_string(),
            email: email.to_string(),
        };
        match self.request(&command, None)? {
            Reply::Created(user) => Ok(user),
            other => Err(unexpected(other)),
        }
    }

    /// Replace name and email of a user
    pub fn update(&mut self, id: UserId, name: &str, email: &str) -> Result<User> {
        let command = Command::Update {
            id,
            name: name.to_string(),
            email: email.to_string(),
        };
        match self.request(&command, Some(id))? {
            Reply::Updated(user) => Ok(user),
            other => Err(unexpected(other)),
        }
    }

    /// Delete a user
    pub fn delete(&mut self, id: UserId) -> Result<()> {
        match self.request(&Command::Delete { id }, Some(id))? {
            Reply::Deleted { .. } => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    /// Ping the server
    pub fn ping(&mut self) -> Result<()> {
        match self.request(&Command::Ping, None)? {
            Reply::Pong => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    /// Send a command and turn the response status into a typed result
    fn request(&mut self, command: &Command, id: Option<UserId>) -> Result<Reply> {
        let response = self.call(command)?;

        match response.status {
            Status::Ok | Status::Created => response.reply(),
            Status::NotFound => match id {
                Some(id) => Err(StoreError::NotFound(id)),
                None => Err(StoreError::Protocol(format!(
                    "NOT_FOUND for {:?}",
                    command.command_type()
                ))),
            },
            Status::BadRequest => Err(StoreError::InvalidInput(response.message())),
            Status::Error => Err(StoreError::Remote(response.message())),
        }
    }
}

fn unexpected(reply: Reply) -> StoreError {
    StoreError::Protocol(format!("unexpected reply: {:?}", reply))
}
