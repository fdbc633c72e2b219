//! Updater error types.
//!
//! Configuration, listing and match-invariant errors end the process.
//! Patch and restart errors belong to a single VirtualMachine and never
//! stop the pass.

use kubevirt_client::KubeVirtError;
use thiserror::Error;

/// Errors that can occur in the machine-type-updater.
#[derive(Debug, Error)]
pub enum UpdaterError {
    /// Invalid configuration, detected before any VM is touched
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Kubernetes client could not be created
    #[error("Error retrieving virt client: {0}")]
    Client(#[source] KubeVirtError),

    /// Listing VirtualMachines failed
    #[error("Error getting vm list: {0}")]
    Listing(#[source] KubeVirtError),

    /// The already validated glob failed to match a machine type
    #[error("Machine type glob \"{pattern}\" failed after validation: {reason}")]
    MatchInvariantViolation { pattern: String, reason: String },

    /// Patching a single VirtualMachine failed
    #[error("Error patching vm {namespace}/{name}: {source}")]
    Patch {
        namespace: String,
        name: String,
        #[source]
        source: KubeVirtError,
    },

    /// Restarting a single VirtualMachine failed
    #[error("Error restarting vm {namespace}/{name}: {source}")]
    Restart {
        namespace: String,
        name: String,
        #[source]
        source: KubeVirtError,
    },
}

impl UpdaterError {
    /// Whether the error ends the whole pass rather than a single record.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Patch { .. } | Self::Restart { .. })
    }
}
