//! Test utilities for the updater
//!
//! Builders for VirtualMachines and configurations.

use crate::config::UpdaterConfig;
use crds::{Machine, PrintableStatus, VirtualMachine, VirtualMachineSpec, VirtualMachineStatus};
use kubevirt_client::LabelSelector;

pub const TEST_NAMESPACE: &str = "default";

/// Helper to create a test VirtualMachine
pub fn create_test_vm(
    name: &str,
    machine_type: Option<&str>,
    status: Option<PrintableStatus>,
    labels: &[(&str, &str)],
) -> VirtualMachine {
    let mut vm = VirtualMachine::new(name, VirtualMachineSpec::default());
    vm.metadata.namespace = Some(TEST_NAMESPACE.to_string());
    if !labels.is_empty() {
        vm.metadata.labels = Some(
            labels
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
    }
    vm.spec.template.spec.domain.machine = machine_type.map(|t| Machine {
        machine_type: t.to_string(),
    });
    vm.status = status.map(|s| VirtualMachineStatus {
        printable_status: Some(s),
        ready: s == PrintableStatus::Running,
    });
    vm
}

/// Helper to create a test configuration
pub fn create_test_config(glob: &str, restart_required: bool, selector: &str) -> UpdaterConfig {
    UpdaterConfig {
        machine_type_glob: glob.to_string(),
        namespace: TEST_NAMESPACE.to_string(),
        restart_required,
        label_selector: LabelSelector::parse(selector).unwrap(),
    }
}
