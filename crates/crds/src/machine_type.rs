//! Update machine type API types
//!
//! Request and response bodies of the `update-machine-type` subresource that
//! launches the machine-type-updater job.

use serde::{Deserialize, Serialize};

/// Request to bulk-update machine types in a namespace.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMachineTypeRequest {
    /// Glob matched against each VM's machine type
    #[serde(default)]
    pub machine_type_glob: String,

    /// Restart running VMs once their machine type is cleared
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub restart_required: bool,

    /// Label selector limiting which VMs are considered
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label_selector: String,

    /// Updater image override; the server's configured image is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Identifies the job created for an `UpdateMachineTypeRequest`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMachineTypeInfo {
    pub job_name: String,
    pub job_namespace: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_defaults_for_missing_fields() {
        let request: UpdateMachineTypeRequest =
            serde_json::from_value(json!({ "machineTypeGlob": "*rhel8.*" })).unwrap();
        assert_eq!(request.machine_type_glob, "*rhel8.*");
        assert!(!request.restart_required);
        assert!(request.label_selector.is_empty());
        assert!(request.image.is_none());
    }

    #[test]
    fn test_info_wire_names() {
        let info = UpdateMachineTypeInfo {
            job_name: "machine-type-updater-abcde".to_string(),
            job_namespace: "default".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&info).unwrap(),
            json!({ "jobName": "machine-type-updater-abcde", "jobNamespace": "default" })
        );
    }
}
