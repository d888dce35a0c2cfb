//! Status Source Trait

use async_trait::async_trait;

use crate::error::TransportError;
use crate::host::HostObservation;

/// Something that can report the current state of every monitored host
///
/// One call is one attempt; retrying is the poller's job.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Fetch all hosts and their current states
    async fn fetch(&self) -> Result<Vec<HostObservation>, TransportError>;
}
