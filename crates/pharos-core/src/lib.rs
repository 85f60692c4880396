pub mod deployment;
pub mod error;
pub mod layout;
pub mod store;
pub mod types;

pub use deployment::{normalize_private_key, DeploymentRequest};
pub use error::{Error, Result};
pub use layout::ProjectLayout;
pub use store::ConfigStore;
pub use types::*;
