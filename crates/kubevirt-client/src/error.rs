//! KubeVirt client errors

use thiserror::Error;

/// Errors that can occur when talking to the Kubernetes/KubeVirt API
#[derive(Debug, Error)]
pub enum KubeVirtError {
    /// Kubernetes API or transport error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// A JSON patch `test` operation did not hold, the patch was not applied
    #[error("Patch test failed: {0}")]
    PatchTest(String),

    /// Invalid request (e.g., request could not be built)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Failure injected by the mock client
    #[error("Injected failure: {0}")]
    Injected(String),
}

impl KubeVirtError {
    /// Maps a kube error to `NotFound` when the API server answered 404.
    pub fn from_kube(err: kube::Error, what: impl Into<String>) -> Self {
        match err {
            kube::Error::Api(ref response) if response.code == 404 => Self::NotFound(what.into()),
            other => Self::Kube(other),
        }
    }
}
