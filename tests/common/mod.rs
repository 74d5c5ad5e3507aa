#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use deepchat::{ChatProvider, ChatTurn, CompletionOptions, Error};
use serde_json::Value;

/// Provider fake that replays queued results and records every call
pub struct ScriptedProvider
{   pub model: String
  , replies: Mutex<VecDeque<Result<Value, Error>>>
  , pub calls: Mutex<Vec<(Vec<ChatTurn>, CompletionOptions)>>
}

impl ScriptedProvider
{   pub fn new(replies: Vec<Result<Value, Error>>) -> Self
    {   ScriptedProvider
        {   model: "fake-model".to_string()
          , replies: Mutex::new(replies.into())
          , calls: Mutex::new(Vec::new())
        }
    }

    pub fn call_count(&self) -> usize
    {   self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatProvider for ScriptedProvider
{   fn default_model(&self) -> &str
    {   &self.model
    }

    async fn send(
      &self
    , messages: &[ChatTurn]
    , options: &CompletionOptions
    ) -> Result<Value, Error>
    {   self.calls.lock().unwrap()
          .push((messages.to_vec(), *options));
        self.replies.lock().unwrap()
          .pop_front()
          .unwrap_or_else(|| Err(Error::Transport("script exhausted".into())))
    }
}

/// What the stub provider saw and how it should answer
#[derive(Clone)]
pub struct StubProvider
{   pub status: StatusCode
  , pub body: String
  , pub hits: Arc<AtomicUsize>
  , pub requests: Arc<Mutex<Vec<(HeaderMap, Value)>>>
}

impl StubProvider
{   pub fn new(status: StatusCode, body: impl Into<String>) -> Self
    {   StubProvider
        {   status
          , body: body.into()
          , hits: Arc::new(AtomicUsize::new(0))
          , requests: Arc::new(Mutex::new(Vec::new()))
        }
    }

    pub fn hits(&self) -> usize
    {   self.hits.load(Ordering::SeqCst)
    }

    /// Serve on an ephemeral local port, returning the base URL
    pub async fn spawn(&self) -> String
    {   let app = Router::new()
          .route("/v1/chat/completions", post(completions))
          .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
          .await
          .unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
          axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }
}

async fn completions(
  State(stub): State<StubProvider>
, headers: HeaderMap
, Json(body): Json<Value>
) -> Response
{   stub.hits.fetch_add(1, Ordering::SeqCst);
    stub.requests.lock().unwrap().push((headers, body));
    (
      stub.status,
      [("content-type", "application/json")],
      stub.body.clone()
    ).into_response()
}

/// Base URL nothing is listening on
pub async fn closed_port_url() -> String
{   let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
      .await
      .unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
