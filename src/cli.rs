use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{ClientConfig, ServerConfig, ShutdownConfig, TransformConfig};

// ============================================================================
// Command Line
// ============================================================================

/// A name lookup service over HTTP and gRPC.
#[derive(Parser, Debug)]
#[command(name = "names-service", author, version, about, long_about = None)]
pub struct Cli {
    /// Log level: 0 (debug), 1 (info), 2 (warn), 3 (error)
    #[arg(
        short = 'l',
        long,
        global = true,
        default_value_t = 1,
        value_parser = clap::value_parser!(u8).range(0..=3),
        env = "LOG_LEVEL"
    )]
    pub log_level: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the app server.
    Server(ServerArgs),
    /// Start the app client.
    Client(ClientArgs),
    /// Transform a raw name list into the dataset layout.
    Transform(TransformArgs),
}

#[derive(Args, Debug)]
pub struct ServerArgs {
    /// Address the HTTP server listens on
    #[arg(long, default_value = "0.0.0.0:8080", env = "HTTP_ADDR")]
    pub http_addr: String,

    /// Include internal error detail in HTTP error responses
    #[arg(long, env = "HTTP_DEBUG")]
    pub http_debug: bool,

    /// Address the gRPC server listens on
    #[arg(long, default_value = "0.0.0.0:8081", env = "GRPC_ADDR")]
    pub grpc_addr: String,

    /// CSV file (`year,id,name`) to serve instead of the embedded dataset
    #[arg(long, env = "NAMES_DATASET")]
    pub dataset: Option<PathBuf>,

    /// HTTP worker threads
    #[arg(long, default_value_t = 2)]
    pub http_workers: usize,

    /// Milliseconds a listener may drain before connections are dropped
    #[arg(long, default_value_t = 2000)]
    pub shutdown_deadline_ms: u64,
}

impl From<ServerArgs> for ServerConfig {
    fn from(args: ServerArgs) -> Self {
        Self {
            http_addr: args.http_addr,
            http_debug: args.http_debug,
            http_workers: args.http_workers,
            grpc_addr: args.grpc_addr,
            dataset: args.dataset,
            shutdown: ShutdownConfig {
                deadline: Duration::from_millis(args.shutdown_deadline_ms),
            },
        }
    }
}

#[derive(Args, Debug)]
pub struct ClientArgs {
    /// Address of the gRPC server to send messages to
    #[arg(long, default_value = "127.0.0.1:8081", env = "GRPC_ADDR")]
    pub grpc_addr: String,

    /// Milliseconds to wait for each message to be acknowledged
    #[arg(long, default_value_t = 1000)]
    pub timeout_ms: u64,
}

impl From<ClientArgs> for ClientConfig {
    fn from(args: ClientArgs) -> Self {
        Self {
            grpc_addr: args.grpc_addr,
            request_timeout: Duration::from_millis(args.timeout_ms),
            ..Self::default()
        }
    }
}

#[derive(Args, Debug)]
pub struct TransformArgs {
    /// Raw CSV with a header and one name per row in the first column
    #[arg(short, long)]
    pub input: PathBuf,

    /// Where to write the `year,id,name` dataset
    #[arg(short, long)]
    pub output: PathBuf,

    /// Year stamped on every row (defaults to the current year)
    #[arg(short, long)]
    pub year: Option<i64>,
}

impl From<TransformArgs> for TransformConfig {
    fn from(args: TransformArgs) -> Self {
        Self {
            input: args.input,
            output: args.output,
            year: args.year,
        }
    }
}
