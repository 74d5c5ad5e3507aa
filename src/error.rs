use std::fmt;

/// Error type for deepchat operations
/// Implements Clone so the last attempt's error can be
/// handed back from the retry loop untouched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// Caller input violates a documented constraint
    Validation(String)
  , /// Required configuration is missing (API key)
    Config(String)
  , /// No HTTP response was obtained
    Transport(String)
  , /// Provider answered with a non-success status
    Provider
    {   status: u16
      , message: String
    }
  , /// Success response without the expected completion shape
    MalformedResponse(String)
  , /// Context file could not be read or written
    Io(String)
}

impl Error
{   /// Whether the backoff executor should try again after this error.
    /// Every provider status is retried, 4xx included.
    pub fn is_retryable(&self) -> bool
    {   matches!(self, Error::Transport(_) | Error::Provider { .. })
    }
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::Validation(msg) => {
              write!(f, "{}", msg)
            }
          , Error::Config(msg) => {
              write!(f, "Configuration error: {}", msg)
            }
          , Error::Transport(msg) => {
              write!(f,
                "Failed to communicate with provider: {}",
                msg
              )
            }
          , Error::Provider { status, message } => {
              write!(f,
                "Provider API error ({}): {}",
                status, message
              )
            }
          , Error::MalformedResponse(msg) => {
              write!(f, "Invalid response format: {}", msg)
            }
          , Error::Io(msg) => {
              write!(f, "I/O error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<reqwest::Error> for Error
{   fn from(e: reqwest::Error) -> Self
    {   Error::Transport(e.to_string())
    }
}

impl From<std::io::Error> for Error
{   fn from(e: std::io::Error) -> Self
    {   Error::Io(e.to_string())
    }
}
