//! userstore CLI Client
//!
//! Command-line interface for interacting with a userstore server.
//! Results are printed as JSON.

use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use userstore::network::Client;
use userstore::{Result, StoreError, UserId};

/// userstore CLI
#[derive(Parser, Debug)]
#[command(name = "userstore-cli")]
#[command(about = "CLI for the userstore server")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:8000")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List all users
    List,

    /// Get a user by id
    Get {
        /// The user id
        id: UserId,
    },

    /// Create a user
    Create {
        name: String,
        email: String,
    },

    /// Replace a user's name and email
    Update {
        /// The user id
        id: UserId,
        name: String,
        email: String,
    },

    /// Delete a user
    Delete {
        /// The user id
        id: UserId,
    },

    /// Ping the server
    Ping,
}

fn main() {
    let args = Args::parse();

    match run(&args) {
        Ok(value) => println!("{}", render(&value)),
        Err(e) => {
            eprintln!("{}", render(&json!({ "error": error_message(&e) })));
            std::process::exit(1);
        }
    }
}

fn run(args: &Args) -> Result<Value> {
    let mut client = Client::connect(args.server.as_str())?;

    let value = match &args.command {
        Commands::List => serde_json::to_value(client.list()?),
        Commands::Get { id } => serde_json::to_value(client.get(*id)?),
        Commands::Create { name, email } => serde_json::to_value(client.create(name, email)?),
        Commands::Update { id, name, email } => {
            serde_json::to_value(client.update(*id, name, email)?)
        }
        Commands::Delete { id } => {
            client.delete(*id)?;
            Ok(json!({ "message": "user deleted" }))
        }
        Commands::Ping => {
            client.ping()?;
            Ok(json!({ "message": "PONG" }))
        }
    };

    value.map_err(|e| StoreError::Serialization(e.to_string()))
}

fn error_message(err: &StoreError) -> String {
    match err {
        StoreError::NotFound(_) => "user not found".to_string(),
        StoreError::InvalidInput(message) | StoreError::Remote(message) => message.clone(),
        other => other.to_string(),
    }
}

fn render(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
