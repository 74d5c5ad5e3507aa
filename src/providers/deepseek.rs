use std::time::Duration;
use async_trait::async_trait;
use log::{debug, trace, error};
use serde_json::{Map, Value};

use crate::config::ProviderConfig;
use crate::error::Error;
use crate::request::{ChatTurn, CompletionOptions, CompletionRequest};

const COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// DeepSeek (OpenAI-compatible) chat completions client
pub struct DeepseekClient
{   config: ProviderConfig
  , http_client: reqwest::Client
}

impl DeepseekClient
{   /// Create a client; the API key is not checked until a call is made
    pub fn new(config: ProviderConfig) -> Result<Self, Error>
    {   debug!("Creating DeepseekClient for {}", config.api_base);
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs
        {   builder = builder.timeout(Duration::from_secs(secs));
        }
        let http_client = builder.build().map_err(|e| {
          error!("Failed to build HTTP client: {}", e);
          Error::Config(e.to_string())
        })?;

        Ok(DeepseekClient { config, http_client })
    }

    pub fn config(&self) -> &ProviderConfig
    {   &self.config
    }

    fn api_key(&self) -> Result<&str, Error>
    {   match self.config.api_key.as_deref()
        {   Some(key) if !key.is_empty() => Ok(key)
          , _ => {
              error!("No API key configured");
              Err(Error::Config(
                "DEEPSEEK_API_KEY is required in environment variables"
                  .to_string()
              ))
            }
        }
    }

    fn endpoint(&self) -> String
    {   format!(
          "{}{}",
          self.config.api_base.trim_end_matches('/'),
          COMPLETIONS_PATH
        )
    }
}

#[async_trait]
impl super::ChatProvider for DeepseekClient
{   fn default_model(&self) -> &str
    {   &self.config.model
    }

    async fn send(
      &self
    , messages: &[ChatTurn]
    , options: &CompletionOptions
    ) -> Result<Value, Error>
    {   let api_key = self.api_key()?;

        let request = CompletionRequest
        {   model: &self.config.model
          , messages
          , temperature: options.temperature
              .unwrap_or(self.config.temperature)
          , max_tokens: options.max_tokens
              .unwrap_or(self.config.max_tokens)
          , stream: false
        };

        let endpoint = self.endpoint();
        debug!(
          "Calling {} with {} messages",
          endpoint, messages.len()
        );
        trace!("Completion request: {:?}", request);

        let response = self.http_client
          .post(&endpoint)
          .header("Authorization", format!("Bearer {}", api_key))
          .header("Content-Type", "application/json")
          .json(&request)
          .send()
          .await
          .map_err(|e| {
            error!("HTTP error: {}", e);
            Error::from(e)
          })?;

        let status = response.status();
        trace!("Provider response status: {}", status);

        if !status.is_success()
        {   let body: Value = response.json().await
              .unwrap_or_else(|_| Value::Object(Map::new()));
            let message = error_message(&body)
              .unwrap_or_else(|| {
                status.canonical_reason()
                  .unwrap_or("Unknown error")
                  .to_string()
              });
            error!(
              "Provider API error: status={} body={}",
              status, body
            );
            return Err(Error::Provider
            {   status: status.as_u16()
              , message
            });
        }

        let bytes = response.bytes().await.map_err(|e| {
          error!("Failed to read response body: {}", e);
          Error::from(e)
        })?;

        serde_json::from_slice(&bytes).map_err(|e| {
          error!("Parse error: {}", e);
          Error::MalformedResponse(e.to_string())
        })
    }
}

/// `error.message`, else a top-level `message`
fn error_message(body: &Value) -> Option<String>
{   body.pointer("/error/message")
      .and_then(Value::as_str)
      .or_else(|| body.get("message").and_then(Value::as_str))
      .filter(|m| !m.is_empty())
      .map(str::to_string)
}

/// Content of the first completion in a raw response
pub fn extract_reply(raw: &Value) -> Result<String, Error>
{   let first = raw.get("choices")
      .and_then(Value::as_array)
      .and_then(|choices| choices.first())
      .ok_or_else(|| {
        error!("No choices in response");
        Error::MalformedResponse(
          "response contained no choices".to_string()
        )
      })?;

    first.pointer("/message/content")
      .and_then(Value::as_str)
      .map(str::to_string)
      .ok_or_else(|| {
        error!("First choice has no message content");
        Error::MalformedResponse(
          "first choice has no message content".to_string()
        )
      })
}
