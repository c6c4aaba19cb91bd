// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service layer: the configuration registry and the loader that feeds it.

pub mod loader;
pub mod registry;

// Re-export commonly used types
pub use loader::{ConfigLoader, ConfigLoaderBuilder};
pub use registry::{ApplyReport, ConfigRegistry};
