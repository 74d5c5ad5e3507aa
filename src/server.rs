//! HTTP routes for chat and the shared context file

use std::sync::Arc;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{error, info, warn};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeFile;

use crate::client::{ChatService, SendOptions};
use crate::config::ChatConfig;
use crate::context::ContextStore;
use crate::error::Error;
use crate::providers::ChatProvider;
use crate::request::{ChatTurn, ErrorResponse};

/// Shared application state
pub struct AppState<P>
{   pub chat: Arc<ChatService<P>>
  , pub context: ContextStore
}

impl<P> Clone for AppState<P>
{   fn clone(&self) -> Self
    {   AppState
        {   chat: Arc::clone(&self.chat)
          , context: self.context.clone()
        }
    }
}

pub fn build_app<P>(state: AppState<P>) -> Router
where
  P: ChatProvider + 'static
{   let context_file = ServeFile::new(state.context.path());

    let chat = Router::new()
      .route("/health", get(chat_health))
      .route("/message", post(send_message::<P>));

    Router::new()
      .route("/api/health", get(health))
      .nest("/api/chat", chat)
      .route("/api/context", get(get_context::<P>).post(save_context::<P>))
      .route_service("/context.txt", context_file)
      .layer(
        CorsLayer::new()
          .allow_origin(Any)
          .allow_methods(Any)
          .allow_headers(Any)
      )
      .with_state(state)
}

/// Bind to the configured port and serve until the process exits
pub async fn serve(config: ChatConfig)
  -> Result<(), Box<dyn std::error::Error + Send + Sync>>
{   let chat = ChatService::from_config(&config)?;
    let state = AppState
    {   chat: Arc::new(chat)
      , context: ContextStore::new(config.server.context_file.clone())
    };
    let app = build_app(state);

    let addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

// ===== Handlers =====

async fn health() -> Json<Value>
{   Json(json!({ "status": "ok", "message": "Backend is running" }))
}

async fn chat_health() -> Json<Value>
{   Json(json!({
      "status": "ok",
      "service": "chat",
      "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageBody
{   message: Option<Value>
  , context: Option<Value>
  , conversation_history: Option<Vec<ChatTurn>>
  , temperature: Option<f32>
  , max_tokens: Option<u32>
}

async fn send_message<P>(
  State(state): State<AppState<P>>
, body: Result<Json<MessageBody>, JsonRejection>
) -> Result<Json<Value>, Error>
where
  P: ChatProvider + 'static
{   let Json(body) = body.map_err(|rejection| {
      warn!("Rejected chat body: {}", rejection);
      match rejection
      {   JsonRejection::MissingJsonContentType(_) => Error::Validation(
            "Message must be a non-empty string".to_string()
          )
        , other => Error::Validation(other.body_text())
      }
    })?;

    let message = text_field(
      body.message.as_ref(),
      "Message must be a non-empty string"
    )?;
    state.chat.validate_message(message)?;
    let context = text_field(
      body.context.as_ref(),
      "Context must be a string or null"
    )?;
    state.chat.validate_context(context)?;

    let options = SendOptions
    {   context: context
          .filter(|c| !c.is_empty())
          .map(str::to_string)
      , history: body.conversation_history.unwrap_or_default()
      , temperature: body.temperature
      , max_tokens: body.max_tokens
    };
    let reply = state.chat
      .send_message(message.unwrap_or_default(), options)
      .await?;

    Ok(Json(json!({ "success": true, "data": reply })))
}

#[derive(Debug, Deserialize)]
struct ContextBody
{   context: Option<String>
}

async fn get_context<P>(State(state): State<AppState<P>>) -> Response
{   match state.context.load().await
    {   Ok(context) => Json(json!({ "context": context })).into_response()
      , Err(_) => (
          StatusCode::INTERNAL_SERVER_ERROR,
          Json(json!({ "error": "Failed to read context file" }))
        ).into_response()
    }
}

/// A body that does not parse is rejected before anything is written
async fn save_context<P>(
  State(state): State<AppState<P>>
, body: Result<Json<ContextBody>, JsonRejection>
) -> Response
{   let content = match body
    {   Ok(Json(body)) => body.context.unwrap_or_default()
      , Err(rejection) => {
          warn!("Rejected context body: {}", rejection);
          return Error::Validation(rejection.body_text()).into_response();
        }
    };

    match state.context.save(&content).await
    {   Ok(()) => Json(json!({
          "success": true,
          "message": "Context saved successfully",
        })).into_response()
      , Err(_) => (
          StatusCode::INTERNAL_SERVER_ERROR,
          Json(json!({ "error": "Failed to save context file" }))
        ).into_response()
    }
}

// ===== Error mapping =====

/// A JSON field that must be a string when present.
/// `null` and a missing field both come back as `None`.
pub fn text_field<'a>(
  value: Option<&'a Value>
, type_error: &str
) -> Result<Option<&'a str>, Error>
{   match value
    {   None | Some(Value::Null) => Ok(None)
      , Some(Value::String(s)) => Ok(Some(s.as_str()))
      , Some(_) => Err(Error::Validation(type_error.to_string()))
    }
}

/// HTTP status for each error kind
pub fn status_for(err: &Error) -> StatusCode
{   match err
    {   Error::Validation(_) => StatusCode::BAD_REQUEST
      , Error::Config(_) | Error::Io(_) => {
          StatusCode::INTERNAL_SERVER_ERROR
        }
      , Error::Provider { .. } | Error::MalformedResponse(_) => {
          StatusCode::BAD_GATEWAY
        }
      , Error::Transport(_) => StatusCode::SERVICE_UNAVAILABLE
    }
}

impl IntoResponse for Error
{   fn into_response(self) -> Response
    {   let status = status_for(&self);
        if status.is_server_error()
        {   error!("Request failed ({}): {}", status, self);
        } else
        {   warn!("Request rejected ({}): {}", status, self);
        }
        (status, Json(ErrorResponse::new(self.to_string())))
          .into_response()
    }
}
