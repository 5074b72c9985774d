//! JSON response envelope and error-to-code mapping.
//!
//! Every invocation prints exactly one document to stdout:
//!
//! ```json
//! {"code": 200, "message": "ok", "data": { ... }}
//! ```
//!
//! `data` is omitted on failure.

use std::io::Write;

use serde::Serialize;
use storegraph_query::GraphError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that end a CLI invocation.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Pool creation failed.
    #[error("database connection error: {0}")]
    Connect(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl CliError {
    /// Response code for this error.
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::Graph(GraphError::NotFound { .. }) => 404,
            Self::Graph(GraphError::InvalidTraversal { .. }) => 400,
            Self::Graph(GraphError::StorageUnavailable(_)) | Self::Connect(_) => 503,
            Self::Graph(GraphError::NotLoaded { .. }) | Self::Config(_) | Self::Serialize(_) => 500,
        }
    }
}

/// The response document.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    /// A 200 response carrying `data`.
    #[must_use]
    pub fn ok(data: T) -> Self {
        Self {
            code: 200,
            message: "ok".to_owned(),
            data: Some(data),
        }
    }
}

impl Envelope<()> {
    /// An error response with no data.
    #[must_use]
    pub fn error(err: &CliError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
            data: None,
        }
    }
}

/// Write an envelope as pretty JSON followed by a newline.
///
/// # Errors
///
/// Returns an I/O error if the writer fails.
pub fn write_envelope<T: Serialize>(
    out: &mut impl Write,
    envelope: &Envelope<T>,
) -> std::io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, envelope)?;
    writeln!(out)
}
