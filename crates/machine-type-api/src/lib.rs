//! Machine Type Update API
//!
//! HTTP front end for the machine-type-updater. A request names a machine
//! type glob, an optional label selector and whether running VMs should be
//! restarted; the server turns it into a `batch/v1` Job that runs the
//! updater in the target namespace.

pub mod api;
pub mod config;
pub mod error;
pub mod job;

pub use api::*;
pub use config::ApiConfig;
pub use error::*;
