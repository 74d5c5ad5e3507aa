use log::{debug, info};
use serde_json::Value;

use crate::backoff::{self, RetryPolicy};
use crate::config::{ChatConfig, Limits};
use crate::error::Error;
use crate::providers::{ChatProvider, DeepseekClient};
use crate::request::{format_messages, ChatReply, ChatTurn, CompletionOptions};

const DEFAULT_FINISH_REASON: &str = "stop";

/// Everything besides the user message that shapes one call
#[derive(Debug, Clone, Default)]
pub struct SendOptions
{   /// System instruction prefixed to the conversation
    pub context: Option<String>
  , /// Prior turns, oldest first
    pub history: Vec<ChatTurn>
  , pub temperature: Option<f32>
  , pub max_tokens: Option<u32>
}

/// Check a user message before anything is sent.
/// `None` stands for a message the caller never supplied.
pub fn validate_message(
  message: Option<&str>
, limits: &Limits
) -> Result<(), Error>
{   let message = match message
    {   Some(m) if !m.is_empty() => m
      , _ => return Err(Error::Validation(
          "Message must be a non-empty string".to_string()
        ))
    };

    if message.trim().is_empty()
    {   return Err(Error::Validation(
          "Message cannot be empty".to_string()
        ));
    }

    let max = limits.max_message_length;
    if message.chars().count() > max
    {   return Err(Error::Validation(format!(
          "Message is too long (max {} characters)",
          max
        )));
    }
    Ok(())
}

/// Check an optional system context; `None` is always accepted
pub fn validate_context(
  context: Option<&str>
, limits: &Limits
) -> Result<(), Error>
{   let max = limits.max_context_length;
    match context
    {   Some(c) if c.chars().count() > max => {
          Err(Error::Validation(format!(
            "Context is too long (max {} characters). \
             Consider splitting it into smaller parts \
             or increase MAX_CONTEXT_LENGTH",
            max
          )))
        }
      , _ => Ok(())
    }
}

/// Validates, formats, and sends chat messages through a provider
/// with retry.
pub struct ChatService<P = DeepseekClient>
{   provider: P
  , limits: Limits
  , retry: RetryPolicy
}

impl ChatService<DeepseekClient>
{   /// Service backed by the DeepSeek client described in `config`
    pub fn from_config(config: &ChatConfig) -> Result<Self, Error>
    {   let provider = DeepseekClient::new(config.provider.clone())?;
        Ok(ChatService::new(provider, config.limits, config.retry.clone()))
    }
}

impl<P: ChatProvider> ChatService<P>
{   pub fn new(
      provider: P
    , limits: Limits
    , retry: RetryPolicy
    ) -> Self
    {   debug!("Creating ChatService with {:?}", retry);
        ChatService { provider, limits, retry }
    }

    pub fn provider(&self) -> &P
    {   &self.provider
    }

    pub fn limits(&self) -> &Limits
    {   &self.limits
    }

    pub fn validate_message(&self, message: Option<&str>)
      -> Result<(), Error>
    {   validate_message(message, &self.limits)
    }

    pub fn validate_context(&self, context: Option<&str>)
      -> Result<(), Error>
    {   validate_context(context, &self.limits)
    }

    /// Send one user message and return the normalized reply
    pub async fn send_message(
      &self
    , message: &str
    , options: SendOptions
    ) -> Result<ChatReply, Error>
    {   self.validate_message(Some(message))?;
        self.validate_context(options.context.as_deref())?;

        let messages = format_messages(
          message,
          options.context.as_deref(),
          &options.history
        );
        let completion = CompletionOptions
        {   temperature: options.temperature
          , max_tokens: options.max_tokens
        };
        debug!(
          "Sending {} messages ({} history turns)",
          messages.len(), options.history.len()
        );

        let raw = backoff::execute_if(
          || self.provider.send(&messages, &completion),
          &self.retry,
          Error::is_retryable
        ).await?;

        let reply_text = self.provider.extract_reply(&raw)?;
        let reply = self.normalize(&raw, reply_text);
        info!(
          "Reply from {} ({})",
          reply.model, reply.finish_reason
        );
        Ok(reply)
    }

    fn normalize(&self, raw: &Value, reply_text: String) -> ChatReply
    {   let usage = raw.get("usage")
          .and_then(Value::as_object)
          .cloned()
          .unwrap_or_default();
        let model = raw.get("model")
          .and_then(Value::as_str)
          .filter(|m| !m.is_empty())
          .unwrap_or_else(|| self.provider.default_model())
          .to_string();
        let finish_reason = raw.pointer("/choices/0/finish_reason")
          .and_then(Value::as_str)
          .filter(|r| !r.is_empty())
          .unwrap_or(DEFAULT_FINISH_REASON)
          .to_string();

        ChatReply { reply_text, usage, model, finish_reason }
    }
}
