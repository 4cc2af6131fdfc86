//! # Stratum Core Kernel
//!
//! Shared foundations for the rest of `stratum-core`:
//!
//! - **Component Lifecycle**: the [`KernelComponent`](component::KernelComponent)
//!   trait (`initialize` / `start` / `stop`) implemented by long-lived services
//!   such as the plugin manager.
//! - **Core Constants**: namespace, manifest and environment variable names in
//!   the `constants` submodule.
//! - **Error Handling**: the crate-level [`Error`](error::Error) and its
//!   `Result` alias in the `error` submodule.
pub mod component;
pub mod constants;
pub mod error;

pub use component::KernelComponent;
pub use error::{Error, Result};
