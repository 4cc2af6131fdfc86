use std::any::Any;
use std::fmt::Debug;
use async_trait::async_trait;
use crate::kernel::error::Result;

/// Core component lifecycle trait for long-lived kernel components
#[async_trait]
pub trait KernelComponent: Any + Send + Sync + Debug {
    fn name(&self) -> &'static str;
    async fn initialize(&self) -> Result<()>;
    async fn start(&self) -> Result<()>;
    /// Tear the component down; it must not serve state from before the call.
    async fn stop(&self) -> Result<()>;
}
