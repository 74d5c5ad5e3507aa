//! Configuration for the provider, input limits and the HTTP server

use std::path::PathBuf;
use std::str::FromStr;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::backoff::RetryPolicy;

pub const DEFAULT_API_BASE: &str = "https://api.deepseek.com";
pub const DEFAULT_MODEL: &str = "deepseek-chat";

/// Provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig
{   /// Bearer token; checked only when a call is made.
    /// Never written out when the config is serialized.
    #[serde(skip_serializing, default)]
    pub api_key: Option<String>
  , /// API base URL, without the `/v1/...` path
    pub api_base: String
  , /// Model name sent with every request
    pub model: String
  , /// Sampling temperature when the request has none
    pub temperature: f32
  , /// Output token cap when the request has none
    pub max_tokens: u32
  , /// Per-request timeout in seconds
    pub timeout_secs: Option<u64>
}

impl Default for ProviderConfig
{   fn default() -> Self
    {   ProviderConfig
        {   api_key: None
          , api_base: DEFAULT_API_BASE.to_string()
          , model: DEFAULT_MODEL.to_string()
          , temperature: 0.7
          , max_tokens: 2000
          , timeout_secs: None
        }
    }
}

/// Input length caps, in characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits
{   pub max_message_length: usize
  , pub max_context_length: usize
}

impl Default for Limits
{   fn default() -> Self
    {   Limits
        {   max_message_length: 10_000
          , max_context_length: 20_000
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig
{   pub port: u16
  , /// Where the shared context blob lives
    pub context_file: PathBuf
}

impl Default for ServerConfig
{   fn default() -> Self
    {   ServerConfig
        {   port: 3001
          , context_file: PathBuf::from("context.txt")
        }
    }
}

/// deepchat configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatConfig
{   pub provider: ProviderConfig
  , pub limits: Limits
  , pub server: ServerConfig
  , pub retry: RetryPolicy
}

impl ChatConfig
{   /// Load from the process environment, after reading `.env`
    /// if one exists. A missing API key is not an error here.
    pub fn from_env() -> Self
    {   match dotenvy::dotenv()
        {   Ok(path) => debug!("Loaded {}", path.display())
          , Err(e) => debug!("No .env loaded: {}", e)
        }
        ChatConfig::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or empty keys keep their
    /// defaults and unparseable numbers fall back with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
      F: Fn(&str) -> Option<String>
    {   let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let defaults = ChatConfig::default();

        let provider = ProviderConfig
        {   api_key: get("DEEPSEEK_API_KEY")
          , api_base: get("DEEPSEEK_API_URL")
              .unwrap_or(defaults.provider.api_base)
          , model: get("DEEPSEEK_MODEL")
              .unwrap_or(defaults.provider.model)
          , temperature: parse_or(
              get("DEEPSEEK_TEMPERATURE"),
              "DEEPSEEK_TEMPERATURE",
              defaults.provider.temperature
            )
          , max_tokens: parse_or(
              get("DEEPSEEK_MAX_TOKENS"),
              "DEEPSEEK_MAX_TOKENS",
              defaults.provider.max_tokens
            )
          , timeout_secs: parse_opt(
              get("DEEPSEEK_TIMEOUT_SECS"),
              "DEEPSEEK_TIMEOUT_SECS"
            )
        };

        let limits = Limits
        {   max_message_length: parse_or(
              get("MAX_MESSAGE_LENGTH"),
              "MAX_MESSAGE_LENGTH",
              defaults.limits.max_message_length
            )
          , max_context_length: parse_or(
              get("MAX_CONTEXT_LENGTH"),
              "MAX_CONTEXT_LENGTH",
              defaults.limits.max_context_length
            )
        };

        let server = ServerConfig
        {   port: parse_or(get("PORT"), "PORT", defaults.server.port)
          , context_file: get("CONTEXT_FILE")
              .map(PathBuf::from)
              .unwrap_or(defaults.server.context_file)
        };

        ChatConfig
        {   provider
          , limits
          , server
          , retry: defaults.retry
        }
    }
}

fn parse_or<T: FromStr>(
  value: Option<String>
, key: &str
, default: T
) -> T
{   match value
    {   Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
          warn!("Ignoring unparseable {}={:?}", key, raw);
          default
        })
      , None => default
    }
}

fn parse_opt<T: FromStr>(
  value: Option<String>
, key: &str
) -> Option<T>
{   let raw = value?;
    match raw.trim().parse()
    {   Ok(parsed) => Some(parsed)
      , Err(_) => {
          warn!("Ignoring unparseable {}={:?}", key, raw);
          None
        }
    }
}
