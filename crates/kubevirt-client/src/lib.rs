//! KubeVirt API Client
//!
//! A small client for the parts of the Kubernetes and KubeVirt APIs the
//! machine-type-updater needs: listing and JSON-patching VirtualMachines,
//! restarting them through the `subresources.kubevirt.io` API, and creating
//! Jobs.
//!
//! # Example
//!
//! ```no_run
//! use kubevirt_client::{KubeVirtClient, KubeVirtClientTrait, LabelSelector};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = KubeVirtClient::try_default().await?;
//!
//! let selector = LabelSelector::parse("kubevirt.io/memory=large")?;
//! let vms = client.list_virtual_machines("default", &selector).await?;
//!
//! for vm in &vms {
//!     println!("{:?}", vm.machine_type());
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod patch;
pub mod selector;
pub mod validation;
#[path = "trait.rs"]
pub mod kubevirt_trait;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use client::KubeVirtClient;
pub use error::KubeVirtError;
pub use kubevirt_trait::KubeVirtClientTrait;
pub use patch::{machine_type_removal_patch, MACHINE_PATH, MACHINE_TYPE_PATH};
pub use selector::{LabelSelector, Operator, Requirement, SelectorError};
pub use validation::ValidationError;
#[cfg(any(test, feature = "test-util"))]
pub use mock::MockKubeVirtClient;
