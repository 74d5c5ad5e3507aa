use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use deepchat::{ChatConfig, ContextStore};

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String>
{   let map: HashMap<String, String> = pairs
      .iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_config_defaults()
{   let config = ChatConfig::from_lookup(lookup(&[]));

    assert_eq!(config.provider.api_key, None);
    assert_eq!(config.provider.api_base, "https://api.deepseek.com");
    assert_eq!(config.provider.model, "deepseek-chat");
    assert_eq!(config.provider.temperature, 0.7);
    assert_eq!(config.provider.max_tokens, 2000);
    assert_eq!(config.provider.timeout_secs, None);
    assert_eq!(config.limits.max_message_length, 10_000);
    assert_eq!(config.limits.max_context_length, 20_000);
    assert_eq!(config.server.port, 3001);
    assert_eq!(config.server.context_file, PathBuf::from("context.txt"));
    assert_eq!(config.retry.max_retries, 3);
    assert_eq!(config.retry.initial_delay, Duration::from_millis(1000));
    assert_eq!(config.retry.max_delay, Duration::from_millis(10_000));
}

#[test]
fn test_config_from_values()
{   let config = ChatConfig::from_lookup(lookup(&[
      ("DEEPSEEK_API_KEY", "sk-test"),
      ("DEEPSEEK_API_URL", "http://localhost:9000"),
      ("DEEPSEEK_MODEL", "deepseek-reasoner"),
      ("DEEPSEEK_TEMPERATURE", "0.3"),
      ("DEEPSEEK_MAX_TOKENS", "512"),
      ("DEEPSEEK_TIMEOUT_SECS", "30"),
      ("MAX_MESSAGE_LENGTH", "100"),
      ("MAX_CONTEXT_LENGTH", "200"),
      ("PORT", "8080"),
      ("CONTEXT_FILE", "/tmp/ctx.txt"),
    ]));

    assert_eq!(config.provider.api_key.as_deref(), Some("sk-test"));
    assert_eq!(config.provider.api_base, "http://localhost:9000");
    assert_eq!(config.provider.model, "deepseek-reasoner");
    assert_eq!(config.provider.temperature, 0.3);
    assert_eq!(config.provider.max_tokens, 512);
    assert_eq!(config.provider.timeout_secs, Some(30));
    assert_eq!(config.limits.max_message_length, 100);
    assert_eq!(config.limits.max_context_length, 200);
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.server.context_file, PathBuf::from("/tmp/ctx.txt"));
}

#[test]
fn test_config_ignores_bad_numbers_and_empty_key()
{   let config = ChatConfig::from_lookup(lookup(&[
      ("DEEPSEEK_API_KEY", ""),
      ("DEEPSEEK_MAX_TOKENS", "lots"),
      ("PORT", "-1"),
    ]));

    assert_eq!(config.provider.api_key, None);
    assert_eq!(config.provider.max_tokens, 2000);
    assert_eq!(config.server.port, 3001);
}

#[tokio::test]
async fn test_context_store_missing_file_is_empty()
{   let dir = tempfile::tempdir().unwrap();
    let store = ContextStore::new(dir.path().join("context.txt"));

    assert_eq!(store.load().await.unwrap(), "");
}

#[tokio::test]
async fn test_context_store_save_then_load()
{   let dir = tempfile::tempdir().unwrap();
    let store = ContextStore::new(dir.path().join("context.txt"));

    store.save("You are a pirate.").await.unwrap();
    assert_eq!(store.load().await.unwrap(), "You are a pirate.");

    store.save("").await.unwrap();
    assert_eq!(store.load().await.unwrap(), "");
}

#[tokio::test]
async fn test_context_store_unwritable_path()
{   let dir = tempfile::tempdir().unwrap();
    let store = ContextStore::new(dir.path().join("missing").join("ctx.txt"));

    let err = store.save("x").await.unwrap_err();
    assert!(matches!(err, deepchat::Error::Io(_)));
}

#[test]
fn test_config_bad_timeout_is_ignored()
{   let config = ChatConfig::from_lookup(lookup(&[
      ("DEEPSEEK_TIMEOUT_SECS", "soon"),
    ]));
    assert_eq!(config.provider.timeout_secs, None);

    let config = ChatConfig::from_lookup(lookup(&[
      ("DEEPSEEK_TIMEOUT_SECS", " 45 "),
    ]));
    assert_eq!(config.provider.timeout_secs, Some(45));
}

#[test]
fn test_serialized_config_omits_api_key()
{   let config = ChatConfig::from_lookup(lookup(&[
      ("DEEPSEEK_API_KEY", "sk-secret"),
    ]));

    let json = serde_json::to_value(&config).unwrap();
    assert!(json["provider"].get("api_key").is_none());
    assert!(!json.to_string().contains("sk-secret"));
    assert_eq!(json["provider"]["model"], "deepseek-chat");

    let restored: ChatConfig = serde_json::from_value(json).unwrap();
    assert_eq!(restored.provider.api_key, None);
    assert_eq!(restored.retry, config.retry);
    assert_eq!(restored.limits, config.limits);
}
