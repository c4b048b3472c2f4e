//! postkv CLI Client
//!
//! Command-line interface for interacting with postkv-server.

use std::io::{BufReader, BufWriter};
use std::net::TcpStream;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use postkv::protocol::{read_response, write_command, Command, Status};

/// postkv CLI
#[derive(Parser, Debug)]
#[command(name = "postkv-cli")]
#[command(about = "CLI for the postkv blog post store")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:7070")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a post
    Create {
        title: String,
        content: String,
    },

    /// Get a post by id
    Get {
        id: String,
    },

    /// Replace a post's title and content
    Update {
        id: String,
        title: String,
        content: String,
    },

    /// Delete a post
    Del {
        id: String,
    },

    /// List posts, newest first
    List {
        /// Cursor from a previous page
        #[arg(short, long)]
        cursor: Option<String>,

        /// Page size (0 = server default)
        #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
        limit: i64,
    },

    /// Ping the server
    Ping,
}

impl From<Commands> for Command {
    fn from(cmd: Commands) -> Self {
        match cmd {
            Commands::Create { title, content } => Command::CreatePost { title, content },
            Commands::Get { id } => Command::GetPost { id },
            Commands::Update { id, title, content } => Command::UpdatePost { id, title, content },
            Commands::Del { id } => Command::DeletePost { id },
            Commands::List { cursor, limit } => Command::ListPosts { cursor, limit },
            Commands::Ping => Command::Ping,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(&args.server, args.command.into()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(server: &str, command: Command) -> postkv::Result<ExitCode> {
    let stream = TcpStream::connect(server)?;
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut writer = BufWriter::new(stream);

    write_command(&mut writer, &command)?;
    let response = read_response(&mut reader)?;

    let body = response
        .payload
        .as_deref()
        .map(|p| match serde_json::from_slice::<serde_json::Value>(p) {
            Ok(v) => serde_json::to_string_pretty(&v).unwrap_or_default(),
            Err(_) => String::from_utf8_lossy(p).into_owned(),
        })
        .unwrap_or_default();

    if response.status == Status::Ok {
        if !body.is_empty() {
            println!("{}", body);
        }
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!("{:?}: {}", response.status, body);
        Ok(ExitCode::FAILURE)
    }
}
