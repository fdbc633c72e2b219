//! JSON patch construction
//!
//! Builds RFC 6902 documents for `kube::api::Patch::Json`.

use json_patch::jsonptr::Pointer;
use json_patch::{Patch, PatchOperation, RemoveOperation, TestOperation};
use serde_json::Value;

/// Path of the machine type inside a VirtualMachine.
pub const MACHINE_TYPE_PATH: &str = "/spec/template/spec/domain/machine/type";

/// Path of the machine object holding the machine type.
pub const MACHINE_PATH: &str = "/spec/template/spec/domain/machine";

const MACHINE_TYPE_POINTER: &Pointer = Pointer::from_static(MACHINE_TYPE_PATH);
const MACHINE_POINTER: &Pointer = Pointer::from_static(MACHINE_PATH);

/// Patch that clears the machine type, guarded by the observed value.
///
/// Removing `machine` reverts the VM to the default machine type of its
/// architecture. The leading `test` makes the API server reject the whole
/// patch if the type changed since it was observed.
pub fn machine_type_removal_patch(observed: &str) -> Patch {
    Patch(vec![
        PatchOperation::Test(TestOperation {
            path: MACHINE_TYPE_POINTER.to_buf(),
            value: Value::String(observed.to_string()),
        }),
        PatchOperation::Remove(RemoveOperation {
            path: MACHINE_POINTER.to_buf(),
        }),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_machine_type_removal_patch_document() {
        let patch = machine_type_removal_patch("smth-glob8.10.0");
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!([
                { "op": "test", "path": "/spec/template/spec/domain/machine/type", "value": "smth-glob8.10.0" },
                { "op": "remove", "path": "/spec/template/spec/domain/machine" }
            ])
        );
    }

    #[test]
    fn test_removal_patch_applies_and_guards() {
        let patch = machine_type_removal_patch("q35");

        let mut matching = json!({ "spec": { "template": { "spec": { "domain": { "machine": { "type": "q35" }, "cpu": { "cores": 2 } } } } } });
        json_patch::patch(&mut matching, &patch).unwrap();
        assert_eq!(
            matching,
            json!({ "spec": { "template": { "spec": { "domain": { "cpu": { "cores": 2 } } } } } })
        );

        let original = json!({ "spec": { "template": { "spec": { "domain": { "machine": { "type": "pc" } } } } } });
        let mut changed = original.clone();
        assert!(json_patch::patch(&mut changed, &patch).is_err());
        assert_eq!(changed, original);
    }

    #[test]
    fn test_removal_patch_for_empty_machine_type() {
        let patch = machine_type_removal_patch("");

        let mut document = json!({ "spec": { "template": { "spec": { "domain": { "machine": { "type": "" } } } } } });
        json_patch::patch(&mut document, &patch).unwrap();
        assert_eq!(document, json!({ "spec": { "template": { "spec": { "domain": {} } } } }));
    }
}
