//! Request and response types shared by the service and the provider

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Speaker of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role
{   User
  , Assistant
  , System
}

/// One message in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn
{   pub role: Role
  , pub content: String
}

impl ChatTurn
{   pub fn new(role: Role, content: impl Into<String>) -> Self
    {   ChatTurn { role, content: content.into() }
    }

    pub fn system(content: impl Into<String>) -> Self
    {   ChatTurn::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self
    {   ChatTurn::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self
    {   ChatTurn::new(Role::Assistant, content)
    }
}

/// Build the message sequence sent to the provider:
/// system context first, then history in order, then the new user turn.
///
/// Inputs are expected to be validated already.
pub fn format_messages(
  user_message: &str
, context: Option<&str>
, history: &[ChatTurn]
) -> Vec<ChatTurn>
{   let mut messages = Vec::with_capacity(history.len() + 2);

    if let Some(context) = context.filter(|c| !c.is_empty())
    {   messages.push(ChatTurn::system(context));
    }
    messages.extend_from_slice(history);
    messages.push(ChatTurn::user(user_message));

    messages
}

/// Per-request overrides for the provider defaults
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionOptions
{   pub temperature: Option<f32>
  , pub max_tokens: Option<u32>
}

/// Body of a chat completion call
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest<'a>
{   pub model: &'a str
  , pub messages: &'a [ChatTurn]
  , pub temperature: f32
  , pub max_tokens: u32
  , pub stream: bool
}

/// Normalized reply handed back to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply
{   /// Generated text
    #[serde(rename = "message")]
    pub reply_text: String
  , /// Token counts, passed through as the provider sent them
    pub usage: Map<String, Value>
  , /// Model that generated it
    pub model: String
  , pub finish_reason: String
}

/// Error body returned by the HTTP layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse
{   pub success: bool
  , pub error: ErrorDetail
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail
{   pub message: String
}

impl ErrorResponse
{   pub fn new(message: impl Into<String>) -> Self
    {   ErrorResponse
        {   success: false
          , error: ErrorDetail { message: message.into() }
        }
    }
}
