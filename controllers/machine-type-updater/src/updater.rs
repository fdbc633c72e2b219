//! Machine type update logic.
//!
//! A single pass lists the VirtualMachines in the configured namespace,
//! clears the machine type of every VM whose type matches the glob and,
//! when asked to, restarts the running ones so the new type takes effect.

use crate::config::UpdaterConfig;
use crate::error::UpdaterError;
use crate::pattern::{match_pattern, PatternError};
use crds::{RestartOptions, VirtualMachine};
use kube::ResourceExt;
use kubevirt_client::{machine_type_removal_patch, KubeVirtClientTrait, KubeVirtError};
use tracing::{error, info, warn};

/// Matches a machine type against a glob.
///
/// The pattern is parsed on every call. An error means the pattern is
/// malformed, never that the value did not match.
pub fn match_machine_type(glob: &str, machine_type: &str) -> Result<bool, PatternError> {
    match_pattern(glob, machine_type)
}

/// Whether the VM carries a machine type matching `glob`.
///
/// VMs without a machine type run on the architecture default and are
/// never candidates.
pub fn should_update_machine_type(vm: &VirtualMachine, glob: &str) -> Result<bool, PatternError> {
    match vm.machine_type() {
        Some(machine_type) => match_machine_type(glob, machine_type),
        None => Ok(false),
    }
}

/// What happened to a single VirtualMachine during a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// No machine type, or it did not match
    Skipped,
    /// Machine type cleared
    Patched,
    /// Machine type cleared and restart requested
    PatchedAndRestarted,
    /// The patch was rejected or could not be sent
    PatchFailed,
    /// Machine type cleared but the restart request failed
    RestartFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordReport {
    pub namespace: String,
    pub name: String,
    pub outcome: UpdateOutcome,
}

/// Per-record outcomes of one pass, in listing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub records: Vec<RecordReport>,
}

impl ReconcileSummary {
    pub fn count(&self, outcome: UpdateOutcome) -> usize {
        self.records.iter().filter(|r| r.outcome == outcome).count()
    }

    pub fn outcome_of(&self, namespace: &str, name: &str) -> Option<UpdateOutcome> {
        self.records
            .iter()
            .find(|r| r.namespace == namespace && r.name == name)
            .map(|r| r.outcome)
    }

    fn push(&mut self, vm: &VirtualMachine, namespace: &str, outcome: UpdateOutcome) {
        self.records.push(RecordReport {
            namespace: namespace.to_string(),
            name: vm.name_any(),
            outcome,
        });
    }
}

/// Clears matching machine types from the VirtualMachines of one namespace.
pub struct MachineTypeUpdater<C: KubeVirtClientTrait> {
    client: C,
    config: UpdaterConfig,
}

impl<C: KubeVirtClientTrait> MachineTypeUpdater<C> {
    pub fn new(client: C, config: UpdaterConfig) -> Self {
        Self { client, config }
    }

    /// Runs one pass over the namespace.
    ///
    /// Listing failures and glob failures abort the pass. Patch and restart
    /// failures are logged, recorded and the pass moves on to the next VM.
    pub async fn run(&self) -> Result<ReconcileSummary, UpdaterError> {
        info!("Starting machine-type-updater");

        let vms = self
            .client
            .list_virtual_machines(&self.config.namespace, &self.config.label_selector)
            .await
            .map_err(|e| {
                error!("Error getting vm list: {}", e);
                UpdaterError::Listing(e)
            })?;
        info!(
            "Found {} VirtualMachines in {} (selector: \"{}\")",
            vms.len(),
            self.config.namespace,
            self.config.label_selector
        );

        let mut summary = ReconcileSummary::default();
        for vm in &vms {
            let namespace = self.namespace_of(vm);
            match self.execute(vm).await {
                Ok(outcome) => summary.push(vm, &namespace, outcome),
                Err(e) if !e.is_fatal() => {
                    error!("{}", e);
                    summary.push(vm, &namespace, UpdateOutcome::RestartFailed);
                }
                Err(e) => {
                    error!("{}", e);
                    return Err(e);
                }
            }
        }

        info!(
            "Processed {} VirtualMachines: {} patched, {} restarted, {} patch failures, {} restart failures",
            summary.records.len(),
            summary.count(UpdateOutcome::Patched),
            summary.count(UpdateOutcome::PatchedAndRestarted),
            summary.count(UpdateOutcome::PatchFailed),
            summary.count(UpdateOutcome::RestartFailed)
        );
        info!("Shutting down machine-type-updater");
        Ok(summary)
    }

    /// Processes a single VirtualMachine.
    ///
    /// Patch failures are absorbed into `UpdateOutcome::PatchFailed`. A
    /// restart failure is returned as `UpdaterError::Restart`; the patch has
    /// already been applied at that point.
    pub async fn execute(&self, vm: &VirtualMachine) -> Result<UpdateOutcome, UpdaterError> {
        let update = should_update_machine_type(vm, &self.config.machine_type_glob).map_err(|e| {
            UpdaterError::MatchInvariantViolation {
                pattern: self.config.machine_type_glob.clone(),
                reason: e.to_string(),
            }
        })?;
        if !update {
            return Ok(UpdateOutcome::Skipped);
        }

        if let Err(e) = self.patch_machine_type(vm).await {
            error!("{}", e);
            return Ok(UpdateOutcome::PatchFailed);
        }

        if !self.config.restart_required || !vm.is_running() {
            return Ok(UpdateOutcome::Patched);
        }

        let namespace = self.namespace_of(vm);
        let name = vm.name_any();
        self.client
            .restart_virtual_machine(&namespace, &name, &RestartOptions::default())
            .await
            .map_err(|source| UpdaterError::Restart {
                namespace: namespace.clone(),
                name: name.clone(),
                source,
            })?;
        info!("Restarted VirtualMachine {}/{}", namespace, name);
        Ok(UpdateOutcome::PatchedAndRestarted)
    }

    /// Removes the machine type, provided it still holds the value observed
    /// when the VM was listed.
    pub async fn patch_machine_type(&self, vm: &VirtualMachine) -> Result<(), UpdaterError> {
        let namespace = self.namespace_of(vm);
        let name = vm.name_any();
        let observed = vm.machine_type().unwrap_or_default();

        let patch = machine_type_removal_patch(observed);

        match self.client.patch_virtual_machine(&namespace, &name, &patch).await {
            Ok(_) => {
                info!(
                    "Cleared machine type \"{}\" from VirtualMachine {}/{}",
                    observed, namespace, name
                );
                Ok(())
            }
            Err(source) => {
                if let KubeVirtError::PatchTest(_) = source {
                    warn!(
                        "Machine type of VirtualMachine {}/{} changed since it was listed",
                        namespace, name
                    );
                }
                Err(UpdaterError::Patch {
                    namespace,
                    name,
                    source,
                })
            }
        }
    }

    fn namespace_of(&self, vm: &VirtualMachine) -> String {
        vm.namespace().unwrap_or_else(|| self.config.namespace.clone())
    }
}
