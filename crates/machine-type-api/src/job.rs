//! Job generation for the machine-type-updater.
//!
//! The request values are passed to the job unmodified; validating them is
//! left to the updater itself, which fails the job on bad input.

use crds::UpdateMachineTypeRequest;
use k8s_openapi::api::batch::v1::{Job, JobSpec};
use k8s_openapi::api::core::v1::{
    Capabilities, Container, EnvVar, PodSecurityContext, PodSpec, PodTemplateSpec,
    SeccompProfile, SecurityContext,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

pub const JOB_GENERATE_NAME: &str = "machine-type-updater-";
pub const CONTAINER_NAME: &str = "machine-type-updater";

pub const MACHINE_TYPE_GLOB_ENV: &str = "MACHINE_TYPE_GLOB";
pub const NAMESPACE_ENV: &str = "NAMESPACE";
pub const RESTART_REQUIRED_ENV: &str = "RESTART_REQUIRED";
pub const LABEL_SELECTOR_ENV: &str = "LABEL_SELECTOR";

fn env_var(name: &str, value: impl Into<String>) -> EnvVar {
    EnvVar {
        name: name.to_string(),
        value: Some(value.into()),
        ..Default::default()
    }
}

/// Builds the Job that runs the updater against `namespace`.
pub fn generate_machine_type_updater_job(
    namespace: &str,
    image: &str,
    request: &UpdateMachineTypeRequest,
) -> Job {
    let container = Container {
        name: CONTAINER_NAME.to_string(),
        image: Some(image.to_string()),
        env: Some(vec![
            env_var(MACHINE_TYPE_GLOB_ENV, request.machine_type_glob.as_str()),
            env_var(NAMESPACE_ENV, namespace),
            env_var(RESTART_REQUIRED_ENV, request.restart_required.to_string()),
            env_var(LABEL_SELECTOR_ENV, request.label_selector.as_str()),
        ]),
        security_context: Some(SecurityContext {
            allow_privilege_escalation: Some(false),
            capabilities: Some(Capabilities {
                drop: Some(vec!["ALL".to_string()]),
                ..Default::default()
            }),
            seccomp_profile: Some(SeccompProfile {
                type_: "RuntimeDefault".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    };

    Job {
        metadata: ObjectMeta {
            generate_name: Some(JOB_GENERATE_NAME.to_string()),
            ..Default::default()
        },
        spec: Some(JobSpec {
            template: PodTemplateSpec {
                metadata: None,
                spec: Some(PodSpec {
                    containers: vec![container],
                    security_context: Some(PodSecurityContext {
                        run_as_non_root: Some(true),
                        ..Default::default()
                    }),
                    restart_policy: Some("OnFailure".to_string()),
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        status: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env_of(job: &Job) -> Vec<(String, String)> {
        job.spec.as_ref().unwrap().template.spec.as_ref().unwrap().containers[0]
            .env
            .as_ref()
            .unwrap()
            .iter()
            .map(|e| (e.name.clone(), e.value.clone().unwrap_or_default()))
            .collect()
    }

    #[test]
    fn test_job_env_carries_request_values() {
        let request = UpdateMachineTypeRequest {
            machine_type_glob: "*rhel8.*".to_string(),
            restart_required: true,
            label_selector: "kubevirt.io/schedulable=true".to_string(),
            image: None,
        };
        let job = generate_machine_type_updater_job("vms", "registry.local/machine-type-updater:v1", &request);

        assert_eq!(
            env_of(&job),
            vec![
                ("MACHINE_TYPE_GLOB".to_string(), "*rhel8.*".to_string()),
                ("NAMESPACE".to_string(), "vms".to_string()),
                ("RESTART_REQUIRED".to_string(), "true".to_string()),
                ("LABEL_SELECTOR".to_string(), "kubevirt.io/schedulable=true".to_string()),
            ]
        );
    }

    #[test]
    fn test_job_defaults_render_as_false_and_empty() {
        let job = generate_machine_type_updater_job("default", "img", &UpdateMachineTypeRequest::default());
        let env = env_of(&job);
        assert_eq!(env[2], ("RESTART_REQUIRED".to_string(), "false".to_string()));
        assert_eq!(env[3], ("LABEL_SELECTOR".to_string(), String::new()));
    }

    #[test]
    fn test_job_shape() {
        let job = generate_machine_type_updater_job("default", "img", &UpdateMachineTypeRequest::default());
        let value = serde_json::to_value(&job).unwrap();

        assert_eq!(value["apiVersion"], "batch/v1");
        assert_eq!(value["kind"], "Job");
        assert_eq!(value["metadata"]["generateName"], "machine-type-updater-");

        let pod = &value["spec"]["template"]["spec"];
        assert_eq!(pod["restartPolicy"], "OnFailure");
        assert_eq!(pod["securityContext"], json!({ "runAsNonRoot": true }));
        assert_eq!(pod["containers"][0]["name"], "machine-type-updater");
        assert_eq!(pod["containers"][0]["image"], "img");
        assert_eq!(
            pod["containers"][0]["securityContext"],
            json!({
                "allowPrivilegeEscalation": false,
                "capabilities": { "drop": ["ALL"] },
                "seccompProfile": { "type": "RuntimeDefault" }
            })
        );
    }
}
