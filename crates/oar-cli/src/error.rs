use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] oar_core::Error),
    #[error(transparent)]
    Remote(#[from] oar_core::remote::RemoteError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Payload must be a JSON object")]
    PayloadNotObject,
    #[error("Payload is not valid JSON: {0}")]
    InvalidPayload(String),
    #[error("Could not write the sync queue; the mutation was not saved")]
    QueueWriteFailed,
    #[error(
        "No reachability URL. Set OAR_REACHABILITY_URL or OAR_SUPABASE_URL to use `oar watch`."
    )]
    ReachabilityNotConfigured,
}
