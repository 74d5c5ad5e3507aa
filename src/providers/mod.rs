//! LLM provider seam

pub mod deepseek;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Error;
use crate::request::{ChatTurn, CompletionOptions};

pub use deepseek::{extract_reply, DeepseekClient};

/// One chat completion round trip against a provider.
///
/// Implementations make exactly one call per `send`; retrying is
/// layered on top by the caller.
#[async_trait]
pub trait ChatProvider: Send + Sync
{   /// Model reported when the response does not name one
    fn default_model(&self) -> &str;

    /// Send the message sequence and return the decoded body as-is
    async fn send(
      &self
    , messages: &[ChatTurn]
    , options: &CompletionOptions
    ) -> Result<Value, Error>;

    /// Pull the reply text out of a raw response
    fn extract_reply(&self, raw: &Value) -> Result<String, Error>
    {   extract_reply(raw)
    }
}
