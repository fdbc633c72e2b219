//! VirtualMachine (kubevirt.io/v1)
//!
//! Partial model of the KubeVirt `VirtualMachine` resource. Unknown fields
//! are ignored on read; writes only ever go through JSON patches, so nothing
//! is lost by not modelling them.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "kubevirt.io",
    version = "v1",
    kind = "VirtualMachine",
    namespaced,
    status = "VirtualMachineStatus",
    shortname = "vm"
)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachineSpec {
    /// Deprecated run switch, superseded by `runStrategy`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub running: Option<bool>,

    /// Run strategy (Always, RerunOnFailure, Manual, Halted, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_strategy: Option<String>,

    /// Template for the VirtualMachineInstance
    #[serde(default)]
    pub template: VirtualMachineInstanceTemplateSpec,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachineInstanceTemplateSpec {
    #[serde(default)]
    pub spec: VirtualMachineInstanceSpec,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachineInstanceSpec {
    #[serde(default)]
    pub domain: DomainSpec,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DomainSpec {
    /// Emulated machine; absent means the architecture default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine: Option<Machine>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Machine {
    /// Machine type, e.g. `pc-q35-rhel8.6.0`
    #[serde(rename = "type", default)]
    pub machine_type: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachineStatus {
    /// Human readable state of the VM
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub printable_status: Option<PrintableStatus>,

    #[serde(default)]
    pub ready: bool,
}

/// KubeVirt's printable VM status.
///
/// Values not known to this crate deserialize as `Unknown`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub enum PrintableStatus {
    Stopped,
    Provisioning,
    Starting,
    Running,
    Paused,
    Stopping,
    Terminating,
    CrashLoopBackOff,
    Migrating,
    ErrorUnschedulable,
    ErrImagePull,
    ImagePullBackOff,
    ErrorPvcNotFound,
    DataVolumeError,
    WaitingForVolumeBinding,
    WaitingForReceiver,
    #[serde(other)]
    Unknown,
}

impl VirtualMachine {
    /// Machine type, if a `machine` is set. An empty `type` is still
    /// reported as `Some("")`.
    pub fn machine_type(&self) -> Option<&str> {
        self.spec
            .template
            .spec
            .domain
            .machine
            .as_ref()
            .map(|m| m.machine_type.as_str())
    }

    pub fn printable_status(&self) -> Option<PrintableStatus> {
        self.status.as_ref().and_then(|s| s.printable_status)
    }

    /// Whether the last observed printable status is `Running`.
    pub fn is_running(&self) -> bool {
        self.printable_status() == Some(PrintableStatus::Running)
    }
}

/// Options for the `restart` subresource.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RestartOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grace_period_seconds: Option<i64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dry_run: Vec<String>,
}
