// Error taxonomy for a replication run.
//
// Reporting-channel failures are deliberately absent here: a failed progress
// send is logged locally and never surfaces as an error (see progress.rs).

#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum CloneError {
    /// Source or target community could not be resolved. Raised before any
    /// mutation happens; the run never starts.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A remote operation failed in a way that ends the whole run (per-item
    /// failures are counted in ReplicationStats instead and never use this).
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type CloneResult<T> = Result<T, CloneError>;
