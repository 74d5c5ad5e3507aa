pub mod error;
pub mod config;
pub mod providers;
pub mod request;
pub mod backoff;
pub mod client;
pub mod context;
pub mod server;

/*

deepchat: a small async backend that forwards chat messages to a
DeepSeek-compatible completions API and hands back a normalized reply.
Nothing is stored between calls; the caller sends the history along
with every message.

src/
├── lib.rs          # Re-exports
├── error.rs        # Error kinds and how they print
├── config.rs       # Provider, limits and server settings from env
├── backoff.rs      # Generic retry with exponential backoff
├── request.rs      # Turns, formatting, request/reply types
├── providers/      # ChatProvider trait + DeepSeek client
├── client.rs       # ChatService: validate -> format -> retry -> normalize
├── context.rs      # Context file on disk
├── server.rs       # axum routes and error -> status mapping
└── main.rs         # Binary entry point

*/

pub use backoff::RetryPolicy;
pub use client::{validate_context, validate_message, ChatService, SendOptions};
pub use config::{ChatConfig, Limits, ProviderConfig, ServerConfig};
pub use context::ContextStore;
pub use error::Error;
pub use providers::{ChatProvider, DeepseekClient};
pub use request::{format_messages, ChatReply, ChatTurn, CompletionOptions, Role};
