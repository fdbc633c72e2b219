//! Machine Type Updater Resource Types
//!
//! Kubernetes resource types shared by the machine-type-updater job and the
//! update-machine-type API.
//!
//! `VirtualMachine` is owned by KubeVirt; only the fields this workspace
//! reads or patches are modelled here.

pub mod virtual_machine;
pub mod machine_type;

pub use virtual_machine::*;
pub use machine_type::*;
