use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// Runtime Configuration
// ============================================================================
//
// Plain settings structs for each command. Defaults match the CLI defaults,
// so tests and embedders can build them without going through clap.
//
// ============================================================================

#[derive(Clone, Debug)]
pub struct ShutdownConfig {
    /// How long a listener may drain before its connections are force-closed
    pub deadline: Duration,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            deadline: Duration::from_secs(2),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub http_addr: String,
    /// Include internal error detail in 5xx responses
    pub http_debug: bool,
    pub http_workers: usize,
    pub grpc_addr: String,
    /// Dataset to load instead of the embedded one
    pub dataset: Option<PathBuf>,
    pub shutdown: ShutdownConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: "0.0.0.0:8080".to_string(),
            http_debug: false,
            http_workers: 2,
            grpc_addr: "0.0.0.0:8081".to_string(),
            dataset: None,
            shutdown: ShutdownConfig::default(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub grpc_addr: String,
    /// Per-message deadline for `Send`
    pub request_timeout: Duration,
    /// Send failures buffered for the error sink before senders wait
    pub error_buffer: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            grpc_addr: "127.0.0.1:8081".to_string(),
            request_timeout: Duration::from_secs(1),
            error_buffer: 16,
        }
    }
}

#[derive(Clone, Debug)]
pub struct TransformConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Year stamped on every row; `None` means the current year
    pub year: Option<i64>,
}
