//! Request payloads shared by the cases.

use serde_json::Value;
use serde_json::json;

use crate::client::Payload;

fn payload(value: Value) -> Payload {
    match value {
        Value::Object(map) => map,
        _ => Payload::new(),
    }
}

pub fn sample_post() -> Payload {
    payload(json!({
        "title": "Test Post",
        "body": "This is a test post body",
        "userId": 1
    }))
}

pub fn update_post() -> Payload {
    payload(json!({
        "id": 1,
        "title": "Updated Title",
        "body": "Updated body content",
        "userId": 1
    }))
}

/// Empty title and no `userId`.
pub fn invalid_post() -> Payload {
    payload(json!({
        "title": "",
        "body": "Test body"
    }))
}

pub fn patch_all() -> Payload {
    payload(json!({
        "title": "Patched Title",
        "body": "Patched body content",
        "userId": 1
    }))
}

pub fn patch_multiple_fields() -> Payload {
    payload(json!({
        "title": "New Updated Title",
        "body": "New updated body content"
    }))
}

pub fn patch_single_field() -> Payload {
    payload(json!({ "title": "Updated Only Title" }))
}

pub fn patch_empty() -> Payload {
    Payload::new()
}
