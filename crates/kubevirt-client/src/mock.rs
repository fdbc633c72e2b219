//! Mock KubeVirtClient for unit testing
//!
//! This module provides a mock implementation of KubeVirtClientTrait that can
//! be used in unit tests without a cluster. VirtualMachines are kept in
//! memory, JSON patches are applied with real RFC 6902 semantics, and every
//! call is recorded so tests can assert on what was (or was not) sent.

use crate::error::KubeVirtError;
use crate::kubevirt_trait::KubeVirtClientTrait;
use crate::selector::LabelSelector;
use crds::{RestartOptions, VirtualMachine};
use k8s_openapi::api::batch::v1::Job;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

type ObjectKey = (String, String);

fn key(namespace: &str, name: &str) -> ObjectKey {
    (namespace.to_string(), name.to_string())
}

/// A recorded list call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListCall {
    pub namespace: String,
    pub selector: String,
}

/// A recorded patch call
#[derive(Debug, Clone, PartialEq)]
pub struct PatchCall {
    pub namespace: String,
    pub name: String,
    pub patch: serde_json::Value,
}

/// A recorded restart call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartCall {
    pub namespace: String,
    pub name: String,
    pub options: RestartOptions,
}

/// Mock KubeVirtClient for testing
#[derive(Clone, Default)]
pub struct MockKubeVirtClient {
    virtual_machines: Arc<Mutex<BTreeMap<ObjectKey, VirtualMachine>>>,
    jobs: Arc<Mutex<Vec<Job>>>,
    // Recorded calls
    list_calls: Arc<Mutex<Vec<ListCall>>>,
    patch_calls: Arc<Mutex<Vec<PatchCall>>>,
    restart_calls: Arc<Mutex<Vec<RestartCall>>>,
    // Failure injection
    list_failure: Arc<Mutex<Option<String>>>,
    create_job_failure: Arc<Mutex<Option<String>>>,
    patch_failures: Arc<Mutex<HashSet<ObjectKey>>>,
    restart_failures: Arc<Mutex<HashSet<ObjectKey>>>,
    // Counter for generated job names
    next_id: Arc<Mutex<u64>>,
}

impl MockKubeVirtClient {
    /// Create a new, empty mock client
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a VirtualMachine to the mock store (for test setup)
    ///
    /// VMs without a namespace are stored in `default`.
    pub fn add_virtual_machine(&self, mut vm: VirtualMachine) {
        let namespace = vm
            .metadata
            .namespace
            .get_or_insert_with(|| "default".to_string())
            .clone();
        let name = vm.metadata.name.clone().unwrap_or_default();
        self.virtual_machines
            .lock()
            .unwrap()
            .insert((namespace, name), vm);
    }

    /// Get the stored state of a VirtualMachine
    pub fn get_virtual_machine(&self, namespace: &str, name: &str) -> Option<VirtualMachine> {
        self.virtual_machines
            .lock()
            .unwrap()
            .get(&key(namespace, name))
            .cloned()
    }

    /// Remove a VirtualMachine, e.g. to simulate deletion between list and patch
    pub fn remove_virtual_machine(&self, namespace: &str, name: &str) {
        self.virtual_machines
            .lock()
            .unwrap()
            .remove(&key(namespace, name));
    }

    /// Make every list call fail
    pub fn fail_list(&self, message: impl Into<String>) {
        *self.list_failure.lock().unwrap() = Some(message.into());
    }

    /// Make every job creation fail
    pub fn fail_create_job(&self, message: impl Into<String>) {
        *self.create_job_failure.lock().unwrap() = Some(message.into());
    }

    /// Make patches of one VirtualMachine fail with a transport-style error
    pub fn fail_patch_for(&self, namespace: &str, name: &str) {
        self.patch_failures.lock().unwrap().insert(key(namespace, name));
    }

    /// Make restarts of one VirtualMachine fail
    pub fn fail_restart_for(&self, namespace: &str, name: &str) {
        self.restart_failures.lock().unwrap().insert(key(namespace, name));
    }

    pub fn list_calls(&self) -> Vec<ListCall> {
        self.list_calls.lock().unwrap().clone()
    }

    pub fn patch_calls(&self) -> Vec<PatchCall> {
        self.patch_calls.lock().unwrap().clone()
    }

    pub fn restart_calls(&self) -> Vec<RestartCall> {
        self.restart_calls.lock().unwrap().clone()
    }

    /// Jobs created so far
    pub fn jobs(&self) -> Vec<Job> {
        self.jobs.lock().unwrap().clone()
    }

    fn next_id(&self) -> u64 {
        let mut id = self.next_id.lock().unwrap();
        *id += 1;
        *id
    }
}

#[async_trait::async_trait]
impl KubeVirtClientTrait for MockKubeVirtClient {
    async fn list_virtual_machines(&self, namespace: &str, selector: &LabelSelector) -> Result<Vec<VirtualMachine>, KubeVirtError> {
        self.list_calls.lock().unwrap().push(ListCall {
            namespace: namespace.to_string(),
            selector: selector.to_string(),
        });

        if let Some(message) = self.list_failure.lock().unwrap().clone() {
            return Err(KubeVirtError::Injected(message));
        }

        let empty = BTreeMap::new();
        Ok(self
            .virtual_machines
            .lock()
            .unwrap()
            .iter()
            .filter(|((ns, _), _)| ns == namespace)
            .filter(|(_, vm)| selector.matches(vm.metadata.labels.as_ref().unwrap_or(&empty)))
            .map(|(_, vm)| vm.clone())
            .collect())
    }

    async fn patch_virtual_machine(&self, namespace: &str, name: &str, patch: &json_patch::Patch) -> Result<VirtualMachine, KubeVirtError> {
        self.patch_calls.lock().unwrap().push(PatchCall {
            namespace: namespace.to_string(),
            name: name.to_string(),
            patch: serde_json::to_value(patch)?,
        });

        if self.patch_failures.lock().unwrap().contains(&key(namespace, name)) {
            return Err(KubeVirtError::Injected(format!(
                "patch of VirtualMachine {}/{} failed",
                namespace, name
            )));
        }

        let mut store = self.virtual_machines.lock().unwrap();
        let vm = store
            .get_mut(&key(namespace, name))
            .ok_or_else(|| KubeVirtError::NotFound(format!("VirtualMachine {}/{}", namespace, name)))?;

        let mut document = serde_json::to_value(&*vm)?;
        json_patch::patch(&mut document, patch)
            .map_err(|e| KubeVirtError::PatchTest(e.to_string()))?;
        *vm = serde_json::from_value(document)?;
        Ok(vm.clone())
    }

    async fn restart_virtual_machine(&self, namespace: &str, name: &str, options: &RestartOptions) -> Result<(), KubeVirtError> {
        self.restart_calls.lock().unwrap().push(RestartCall {
            namespace: namespace.to_string(),
            name: name.to_string(),
            options: options.clone(),
        });

        if self.restart_failures.lock().unwrap().contains(&key(namespace, name)) {
            return Err(KubeVirtError::Injected(format!(
                "restart of VirtualMachine {}/{} failed",
                namespace, name
            )));
        }

        if !self.virtual_machines.lock().unwrap().contains_key(&key(namespace, name)) {
            return Err(KubeVirtError::NotFound(format!("VirtualMachine {}/{}", namespace, name)));
        }
        Ok(())
    }

    async fn create_job(&self, namespace: &str, job: &Job) -> Result<Job, KubeVirtError> {
        if let Some(message) = self.create_job_failure.lock().unwrap().clone() {
            return Err(KubeVirtError::Injected(message));
        }

        let mut created = job.clone();
        if created.metadata.name.is_none() {
            let prefix = created.metadata.generate_name.clone().unwrap_or_default();
            created.metadata.name = Some(format!("{}{:05}", prefix, self.next_id()));
        }
        created.metadata.namespace = Some(namespace.to_string());

        self.jobs.lock().unwrap().push(created.clone());
        Ok(created)
    }
}
