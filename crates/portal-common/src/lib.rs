//! Common types shared across the portal OGC crates.

pub mod error;

pub use error::{PortalError, PortalResult};
