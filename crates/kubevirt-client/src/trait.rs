//! KubeVirtClient trait for mocking
//!
//! This trait abstracts the KubeVirtClient to enable mocking in unit tests.
//! The concrete KubeVirtClient implements this trait, and tests use
//! `MockKubeVirtClient`.

use crate::error::KubeVirtError;
use crate::selector::LabelSelector;
use crds::{RestartOptions, VirtualMachine};
use k8s_openapi::api::batch::v1::Job;

/// Trait for the Kubernetes/KubeVirt operations used by the updater and the API
///
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait KubeVirtClientTrait: Send + Sync {
    /// Lists VirtualMachines in `namespace` whose labels satisfy `selector`
    async fn list_virtual_machines(&self, namespace: &str, selector: &LabelSelector) -> Result<Vec<VirtualMachine>, KubeVirtError>;

    /// Applies a JSON patch to a VirtualMachine; a failing `test` rejects the whole patch
    async fn patch_virtual_machine(&self, namespace: &str, name: &str, patch: &json_patch::Patch) -> Result<VirtualMachine, KubeVirtError>;

    /// Calls the `restart` subresource of a VirtualMachine
    async fn restart_virtual_machine(&self, namespace: &str, name: &str, options: &RestartOptions) -> Result<(), KubeVirtError>;

    /// Creates a Job, returning it as stored by the API server
    async fn create_job(&self, namespace: &str, job: &Job) -> Result<Job, KubeVirtError>;
}
