use async_trait::async_trait;

use crate::Result;

/// Port for the remote homework status API.
///
/// The poll loop only needs "give me the raw payload for changes since `from_date`";
/// validation of the payload happens in the response pipeline.
#[async_trait]
pub trait HomeworkSource: Send + Sync {
    async fn fetch(&self, from_date: i64) -> Result<serde_json::Value>;
}
