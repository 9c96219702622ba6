//! Processor abstraction driven by the run controller.

use async_trait::async_trait;
use venh_models::{BackendMethod, ProcessingRequest, ProcessingResult};

use crate::client::EnhanceClient;
use crate::error::ClientResult;

/// Something that turns an uploaded video into an enhanced one.
#[async_trait]
pub trait VideoProcessor: Send + Sync {
    async fn process(
        &self,
        request: &ProcessingRequest,
        method: BackendMethod,
    ) -> ClientResult<ProcessingResult>;
}

#[async_trait]
impl VideoProcessor for EnhanceClient {
    async fn process(
        &self,
        request: &ProcessingRequest,
        method: BackendMethod,
    ) -> ClientResult<ProcessingResult> {
        self.process_video(request, method).await
    }
}
