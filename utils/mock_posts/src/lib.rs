//! In-memory stand-in for the JSONPlaceholder `/posts` resource.
//!
//! Mirrors the public service closely enough to run the suite offline: 100
//! seeded posts, writes are echoed back but never stored, and PATCH on an
//! unknown id answers 200 like the real thing does.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use serde_json::Map;
use serde_json::Value;
use tokio::net::TcpListener;

pub const POST_COUNT: i64 = 100;
pub const POSTS_PER_USER: i64 = 10;

/// Id handed out to every created post, as the public service does.
pub const CREATED_ID: i64 = POST_COUNT + 1;

type Post = Map<String, Value>;

/// Deliberate misbehaviour, used to check that failures are reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Fault {
    #[default]
    None,
    /// PUT and PATCH ignore the request body and answer with the stored post.
    StaleWrites,
    /// Every `id` is rendered as a JSON string instead of a number.
    StringIds,
}

#[derive(Clone)]
struct AppState {
    posts: Arc<Vec<Post>>,
    fault: Fault,
}

impl AppState {
    fn find(&self, id: &str) -> Option<&Post> {
        let id: i64 = id.parse().ok()?;
        if !(1..=POST_COUNT).contains(&id) {
            return None;
        }
        self.posts.get((id - 1) as usize)
    }

    fn render(&self, mut post: Post) -> Value {
        if self.fault == Fault::StringIds
            && let Some(id) = post.get("id").cloned()
        {
            post.insert("id".into(), Value::String(id.to_string()));
        }
        Value::Object(post)
    }
}

pub fn seed() -> Vec<Post> {
    (1..=POST_COUNT)
        .map(|id| {
            let mut post = Map::new();
            post.insert("userId".into(), Value::from((id - 1) / POSTS_PER_USER + 1));
            post.insert("id".into(), Value::from(id));
            post.insert("title".into(), Value::from(format!("post {id} title")));
            post.insert(
                "body".into(),
                Value::from(format!("body of post {id}\nwith a second line")),
            );
            post
        })
        .collect()
}

pub fn router(fault: Fault) -> Router {
    let state = AppState {
        posts: Arc::new(seed()),
        fault,
    };

    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route(
            "/posts/{id}",
            get(get_post)
                .put(update_post)
                .patch(patch_post)
                .delete(delete_post),
        )
        .with_state(state)
}

/// Serves the router on an ephemeral local port and returns its base URL.
pub async fn spawn(fault: Fault) -> std::io::Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        let _ = axum::serve(listener, router(fault)).await;
    });

    Ok(format!("http://{addr}"))
}

fn empty() -> Json<Value> {
    Json(Value::Object(Map::new()))
}

fn parse_payload(bytes: &Bytes) -> Result<Post, StatusCode> {
    if bytes.is_empty() {
        return Ok(Map::new());
    }

    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(StatusCode::BAD_REQUEST),
    }
}

fn matches_param(field: &Value, wanted: &str) -> bool {
    match field {
        Value::String(s) => s == wanted,
        other => other.to_string() == wanted,
    }
}

async fn list_posts(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let posts = state
        .posts
        .iter()
        .filter(|post| {
            params.iter().all(|(key, wanted)| {
                post.get(key)
                    .is_some_and(|field| matches_param(field, wanted))
            })
        })
        .map(|post| state.render(post.clone()))
        .collect();

    Json(Value::Array(posts))
}

async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> (StatusCode, Json<Value>) {
    match state.find(&id) {
        Some(post) => (StatusCode::OK, Json(state.render(post.clone()))),
        None => (StatusCode::NOT_FOUND, empty()),
    }
}

async fn create_post(State(state): State<AppState>, bytes: Bytes) -> (StatusCode, Json<Value>) {
    let mut post = match parse_payload(&bytes) {
        Ok(post) => post,
        Err(status) => return (status, empty()),
    };

    post.insert("id".into(), Value::from(CREATED_ID));
    (StatusCode::CREATED, Json(state.render(post)))
}

async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    bytes: Bytes,
) -> (StatusCode, Json<Value>) {
    let Some(stored) = state.find(&id) else {
        return (StatusCode::INTERNAL_SERVER_ERROR, empty());
    };

    if state.fault == Fault::StaleWrites {
        return (StatusCode::OK, Json(state.render(stored.clone())));
    }

    let mut post = match parse_payload(&bytes) {
        Ok(post) => post,
        Err(status) => return (status, empty()),
    };

    post.insert("id".into(), stored.get("id").cloned().unwrap_or(Value::Null));
    (StatusCode::OK, Json(state.render(post)))
}

async fn patch_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    bytes: Bytes,
) -> (StatusCode, Json<Value>) {
    let payload = match parse_payload(&bytes) {
        Ok(post) => post,
        Err(status) => return (status, empty()),
    };

    let post = match state.find(&id) {
        Some(stored) if state.fault == Fault::StaleWrites => stored.clone(),
        Some(stored) => {
            let mut merged = stored.clone();
            merged.extend(payload);
            merged
        }
        // The public service answers 200 and echoes the payload here.
        None => {
            let mut echoed = payload;
            if let Ok(id) = id.parse::<i64>() {
                echoed.insert("id".into(), Value::from(id));
            }
            echoed
        }
    };

    (StatusCode::OK, Json(state.render(post)))
}

async fn delete_post() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, empty())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn seeds_ten_posts_per_user() {
        let posts = seed();

        assert_eq!(posts.len(), POST_COUNT as usize);
        assert_eq!(posts[0]["userId"], Value::from(1));
        assert_eq!(posts[9]["userId"], Value::from(1));
        assert_eq!(posts[10]["userId"], Value::from(2));
        assert_eq!(posts[99]["id"], Value::from(100));
    }

    #[test]
    fn find_rejects_unknown_and_malformed_ids() {
        let state = AppState {
            posts: Arc::new(seed()),
            fault: Fault::None,
        };

        assert!(state.find("1").is_some());
        assert!(state.find("100").is_some());
        assert!(state.find("0").is_none());
        assert!(state.find("99999").is_none());
        assert!(state.find("abc").is_none());
    }

    #[test]
    fn string_ids_fault_renders_ids_as_strings() {
        let state = AppState {
            posts: Arc::new(seed()),
            fault: Fault::StringIds,
        };

        let rendered = state.render(state.posts[0].clone());
        assert_eq!(rendered["id"], Value::String("1".into()));
    }

    #[test]
    fn empty_payload_is_an_empty_object() {
        assert!(parse_payload(&Bytes::new()).unwrap().is_empty());
        assert_eq!(
            parse_payload(&Bytes::from_static(b"[1, 2]")),
            Err(StatusCode::BAD_REQUEST)
        );
    }
}
