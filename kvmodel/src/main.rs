// Forbid unwrap() in production code to prevent panics from corrupt data.
// Test code is allowed to use unwrap() for convenience.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::panic))]
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use kvmodel::config::Config;
use kvmodel::model::TableOptions;
use kvmodel::repository::{Message, MessageRepository, RepositoryError};
use kvmodel::storage::{FileStore, FileStoreOptions};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Store and query chat messages in a local log file.
///
/// The store location and table namespace come from `KVMODEL_*` environment
/// variables.
#[derive(Parser, Debug)]
#[command(name = "kvmodel", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Store a new message and print it.
    Create {
        chat_id: String,
        client_id: String,
        user_id: String,
        /// Message text; multiple words are joined with spaces.
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Print the message with the given id.
    Read { id: String },
    /// Print the messages of a chat in creation order.
    History {
        chat_id: String,
        /// Messages to skip.
        #[arg(default_value_t = 0)]
        offset: usize,
        /// Maximum number of messages to print.
        limit: Option<usize>,
    },
    /// Delete the message with the given id.
    Delete { id: String },
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kvmodel=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Load configuration from environment variables
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    tracing::debug!(
        "Loaded configuration: data_file={}, namespace={}",
        config.data_file.display(),
        config.namespace
    );

    if let Some(parent) = config.data_file.parent()
        && let Err(e) = std::fs::create_dir_all(parent)
    {
        tracing::error!("Failed to create data directory: {e}");
        return ExitCode::FAILURE;
    }

    let store = match FileStore::open(
        &config.data_file,
        FileStoreOptions {
            sync_writes: config.sync_writes,
        },
    ) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to open store: {e}");
            return ExitCode::FAILURE;
        }
    };

    let repository = MessageRepository::new(
        store,
        config.namespace,
        TableOptions {
            debug: config.debug,
            id_index: None,
        },
    );

    match run(&repository, cli.command) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(
    repository: &MessageRepository<FileStore>,
    command: Command,
) -> Result<String, RepositoryError> {
    let output = match command {
        Command::Create {
            chat_id,
            client_id,
            user_id,
            text,
        } => {
            let message = Message {
                chat_id,
                client_id,
                user_id,
                text: text.join(" "),
                ..Message::default()
            };
            to_json(&repository.create(message)?)
        }
        Command::Read { id } => to_json(&repository.read(&id)?),
        Command::History {
            chat_id,
            offset,
            limit,
        } => to_json(&repository.history(&chat_id, offset, limit)?),
        Command::Delete { id } => {
            repository.delete(&id)?;
            to_json(&serde_json::json!({ "deleted": id }))
        }
    };
    output.map_err(|e| RepositoryError::Model(e.into()))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(value)
}
