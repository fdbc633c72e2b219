//! KubeVirt API client
//!
//! Implements `KubeVirtClientTrait` on top of `kube::Client`.
//! VirtualMachines live under `kubevirt.io/v1`; lifecycle actions such as
//! restart live under the aggregated `subresources.kubevirt.io/v1` API.

use crate::error::KubeVirtError;
use crate::kubevirt_trait::KubeVirtClientTrait;
use crate::selector::LabelSelector;
use crds::{RestartOptions, VirtualMachine};
use k8s_openapi::api::batch::v1::Job;
use kube::api::{ListParams, Patch, PatchParams, PostParams};
use kube::{Api, Client};
use tracing::debug;

const SUBRESOURCES_API: &str = "/apis/subresources.kubevirt.io/v1";

/// KubeVirt API client
#[derive(Clone)]
pub struct KubeVirtClient {
    client: Client,
}

impl KubeVirtClient {
    /// Wraps an existing Kubernetes client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Creates a client from the in-cluster config or the local kubeconfig
    pub async fn try_default() -> Result<Self, KubeVirtError> {
        let client = Client::try_default().await?;
        Ok(Self::new(client))
    }

    fn virtual_machines(&self, namespace: &str) -> Api<VirtualMachine> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait::async_trait]
impl KubeVirtClientTrait for KubeVirtClient {
    async fn list_virtual_machines(&self, namespace: &str, selector: &LabelSelector) -> Result<Vec<VirtualMachine>, KubeVirtError> {
        let mut lp = ListParams::default();
        if !selector.is_everything() {
            lp = lp.labels(&selector.to_string());
        }
        debug!("Listing VirtualMachines in {} (selector: {:?})", namespace, lp.label_selector);

        let list = self.virtual_machines(namespace).list(&lp).await?;
        Ok(list.items)
    }

    async fn patch_virtual_machine(&self, namespace: &str, name: &str, patch: &json_patch::Patch) -> Result<VirtualMachine, KubeVirtError> {
        debug!("Patching VirtualMachine {}/{}", namespace, name);

        self.virtual_machines(namespace)
            .patch(name, &PatchParams::default(), &Patch::Json::<()>(patch.clone()))
            .await
            .map_err(|e| KubeVirtError::from_kube(e, format!("VirtualMachine {}/{}", namespace, name)))
    }

    async fn restart_virtual_machine(&self, namespace: &str, name: &str, options: &RestartOptions) -> Result<(), KubeVirtError> {
        let url = format!(
            "{}/namespaces/{}/virtualmachines/{}/restart",
            SUBRESOURCES_API, namespace, name
        );
        debug!("Restarting VirtualMachine {}/{}", namespace, name);

        let body = serde_json::to_vec(options)?;
        let request = http::Request::put(url)
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(body)
            .map_err(|e| KubeVirtError::InvalidRequest(format!("failed to build restart request: {}", e)))?;

        self.client
            .request_text(request)
            .await
            .map_err(|e| KubeVirtError::from_kube(e, format!("VirtualMachine {}/{}", namespace, name)))?;
        Ok(())
    }

    async fn create_job(&self, namespace: &str, job: &Job) -> Result<Job, KubeVirtError> {
        let jobs: Api<Job> = Api::namespaced(self.client.clone(), namespace);
        let created = jobs.create(&PostParams::default(), job).await?;
        debug!(
            "Created Job {}/{}",
            namespace,
            created.metadata.name.as_deref().unwrap_or("<unknown>")
        );
        Ok(created)
    }
}
