use std::path::PathBuf;
use thiserror::Error;

use crate::gateway::Operation;

/// Failures that keep a remote call from producing a gateway answer.
///
/// Business failures reported by the gateway (wrong api key, unknown
/// transaction, bank side errors) are not errors: they come back as a
/// [`Reply`](crate::gateway::Reply) with `success == false`.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Gateway could not be reached: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Gateway answered {operation} with HTTP {status}")]
    Status {
        operation: Operation,
        status: u16,
        body: String,
    },
    #[error("Gateway response to {operation} is not valid JSON: {source}")]
    Decode {
        operation: Operation,
        #[source]
        source: serde_json::Error,
    },
    #[error("Request fields could not be encoded: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("Transaction has no gateway transaction id, call init first")]
    MissingTransactionId,
}

impl GatewayError {
    /// True when the gateway was never reached or its answer was unusable.
    /// Local failures (encoding the request, calling without an id) are not.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            GatewayError::Transport(_) | GatewayError::Status { .. } | GatewayError::Decode { .. }
        )
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file {path} couldn't be read: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Configuration file {path} contains invalid syntax: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("Configuration file {path} is not a key/value mapping")]
    NotAMapping { path: PathBuf },
}
