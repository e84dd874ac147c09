#![allow(dead_code)]

use std::path::Path;

use feedline::config::{Config, ConfigV1};
use feedline::startup::build;
use feedline::state::AppState;
use figment::{
    providers::{Format, Yaml},
    Figment,
};
use serde_json::{json, Value};

pub fn config_from(yaml: &str) -> ConfigV1 {
    let config: Config = Figment::new()
        .merge(Yaml::string(yaml))
        .extract()
        .expect("test config should parse");
    match config {
        Config::ConfigV1(c) => c,
    }
}

/// Config pointing at a mock server, with tokens kept in memory.
pub fn memory_config(base_url: &str) -> ConfigV1 {
    config_from(&format!(
        r#"
version: "1.0.0"
api:
  base_url: "{base_url}"
  timeout_in_ms: 2000
  media_base_url: "https://media.example.com"
storage:
  enabled: true
  type: "memory"
logging:
  level: "debug"
  format: "json"
"#
    ))
}

/// Config persisting tokens to a JSON file.
pub fn file_config(base_url: &str, path: &Path) -> ConfigV1 {
    config_from(&format!(
        r#"
version: "1.0.0"
api:
  base_url: "{base_url}"
storage:
  enabled: true
  type: "file"
  path: "{}"
"#,
        path.display()
    ))
}

pub fn disabled_config(base_url: &str) -> ConfigV1 {
    config_from(&format!(
        r#"
version: "1.0.0"
api:
  base_url: "{base_url}"
storage:
  enabled: false
"#
    ))
}

pub fn build_state(config: ConfigV1) -> AppState {
    build(config).expect("state should build")
}

pub fn user_json(id: u64, username: &str) -> String {
    json!({
        "id": id,
        "username": username,
        "email": format!("{username}@example.com"),
        "date_joined": "2024-01-05T12:00:00Z",
        "profile_pic": "http://minio:9000/media/profile/1.png",
        "cover_pic": null,
        "followers": "3",
        "following": 1,
        "is_following": false
    })
    .to_string()
}

pub fn post_json(id: u64, content: &str) -> Value {
    json!({
        "id": id,
        "creator": {"id": 3, "username": "alice", "email": "alice@example.com", "profile_pic": null},
        "content": content,
        "image": null,
        "created": "2024-03-01T09:30:00Z",
        "likes": 0,
        "is_liked": false,
        "comments": 0,
        "saves": 0,
        "is_saved": false,
        "isEdited": false
    })
}

pub fn page_json(results: Vec<Value>) -> String {
    json!({"count": results.len(), "next": null, "previous": null, "results": results}).to_string()
}
