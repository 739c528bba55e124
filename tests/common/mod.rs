#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const TOKEN: &str = "123:TEST";

pub fn bot_path(method_name: &str) -> String {
    format!("/bot{}/{}", TOKEN, method_name)
}

/// Writes fake APK files into `dir` and returns their paths in the given order.
pub fn write_artifacts(dir: &tempfile::TempDir, names: &[&str]) -> Vec<PathBuf> {
    names
        .iter()
        .map(|name| {
            let p = dir.path().join(name);
            fs::write(&p, format!("PK fake apk {}", name)).unwrap();
            p
        })
        .collect()
}

/// Environment-like lookup over a fixed set of variables.
pub fn env_with(base: &str, extra: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
    let mut vars: HashMap<String, String> = HashMap::new();
    vars.insert("BOT_TOKEN".into(), TOKEN.into());
    vars.insert("CHAT_ID".into(), "-100123".into());
    vars.insert("TELEGRAM_API_BASE_URL".into(), base.into());
    for (k, v) in extra {
        vars.insert(k.to_string(), v.to_string());
    }
    move |k| vars.get(k).cloned()
}

pub async fn mount_get_me(server: &MockServer, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(bot_path("getMe")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": {"id": 123, "is_bot": true, "first_name": "CI", "username": "ci_upload_bot"}
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

pub async fn mount_send_media_group(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path(bot_path("sendMediaGroup")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": [
                {"message_id": 10, "date": 0, "chat": {"id": -100123, "type": "supergroup"}},
                {"message_id": 11, "date": 0, "chat": {"id": -100123, "type": "supergroup"}}
            ]
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

pub async fn mount_send_document(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path(bot_path("sendDocument")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": {"message_id": 20, "date": 0, "chat": {"id": -100123, "type": "supergroup"}}
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

pub async fn mount_telegram_error(server: &MockServer, method_name: &str, code: u16, description: &str) {
    Mock::given(method("POST"))
        .and(path(bot_path(method_name)))
        .respond_with(ResponseTemplate::new(code).set_body_json(json!({
            "ok": false,
            "error_code": code,
            "description": description
        })))
        .expect(1)
        .mount(server)
        .await;
}

/// Any request at all is a failure.
pub async fn forbid_requests(server: &MockServer) {
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
}

pub async fn requests_to(server: &MockServer, method_name: &str) -> Vec<Request> {
    let wanted = bot_path(method_name);
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path() == wanted)
        .collect()
}

pub fn body_text(request: &Request) -> String {
    String::from_utf8_lossy(&request.body).into_owned()
}

/// Value of a text field in a multipart body.
pub fn form_field(body: &str, name: &str) -> Option<String> {
    let marker = format!("name=\"{}\"\r\n\r\n", name);
    let start = body.find(&marker)? + marker.len();
    let end = body[start..].find("\r\n")? + start;
    Some(body[start..end].to_string())
}
