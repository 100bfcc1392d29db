use reqwest::Client;
use reqwest::Method;
use reqwest::Response;
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use reqwest::header::CONTENT_TYPE;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

/// Request body: field name to JSON value, built by the caller.
pub type Payload = serde_json::Map<String, Value>;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("failed to build http client: {0}")]
    Build(reqwest::Error),

    #[error("`{0}` is not a valid url: {1}")]
    InvalidUrl(String, url::ParseError),

    #[error("{method} {url} failed: {source}")]
    Transport {
        method: Method,
        url: Url,
        source: reqwest::Error,
    },

    #[error("failed to read response body from {url}: {source}")]
    Body { url: Url, source: reqwest::Error },
}

/// Thin wrapper around one reusable `reqwest::Client` bound to a base url.
///
/// Every call is a single attempt. Non-2xx statuses come back as an
/// [`ApiResponse`] like any other; only transport failures are errors.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self {
            base_url: base_url.to_owned(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get(
        &self,
        path: &str,
        query: Option<&[(&str, &str)]>,
    ) -> Result<ApiResponse, ClientError> {
        let url = self.url(path)?;
        let mut request = self.client.request(Method::GET, url.clone());
        if let Some(query) = query {
            request = request.query(query);
        }

        self.send(Method::GET, url, request).await
    }

    pub async fn post(
        &self,
        path: &str,
        payload: Option<&Payload>,
    ) -> Result<ApiResponse, ClientError> {
        self.with_payload(Method::POST, path, payload).await
    }

    pub async fn put(
        &self,
        path: &str,
        payload: Option<&Payload>,
    ) -> Result<ApiResponse, ClientError> {
        self.with_payload(Method::PUT, path, payload).await
    }

    pub async fn patch(
        &self,
        path: &str,
        payload: Option<&Payload>,
    ) -> Result<ApiResponse, ClientError> {
        self.with_payload(Method::PATCH, path, payload).await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse, ClientError> {
        let url = self.url(path)?;
        let request = self.client.request(Method::DELETE, url.clone());

        self.send(Method::DELETE, url, request).await
    }

    async fn with_payload(
        &self,
        method: Method,
        path: &str,
        payload: Option<&Payload>,
    ) -> Result<ApiResponse, ClientError> {
        let url = self.url(path)?;
        let request = if let Some(payload) = payload {
            self.client.request(method.clone(), url.clone()).json(payload)
        } else {
            self.client.request(method.clone(), url.clone())
        };

        self.send(method, url, request).await
    }

    /// The path is appended verbatim, no normalisation happens here.
    fn url(&self, path: &str) -> Result<Url, ClientError> {
        let raw = format!("{}{}", self.base_url, path);
        Url::parse(&raw).map_err(|e| ClientError::InvalidUrl(raw, e))
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        request: reqwest::RequestBuilder,
    ) -> Result<ApiResponse, ClientError> {
        debug!(%method, %url, "sending request");

        let response = request
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                method: method.clone(),
                url: url.clone(),
                source,
            })?;

        let response = ApiResponse::from_response(response)
            .await
            .map_err(|source| ClientError::Body { url, source })?;

        debug!(%method, status = %response.status, "received response");

        Ok(response)
    }
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body_text: String,
    pub body_json: Option<Value>,
}

impl ApiResponse {
    pub async fn from_response(resp: Response) -> Result<Self, reqwest::Error> {
        let status = resp.status();
        // Consume the body exactly once
        let body_text = resp.text().await?;

        // Not every response is JSON, keep the text either way
        let body_json = serde_json::from_str::<Value>(&body_text).ok();

        Ok(Self {
            status,
            body_text,
            body_json,
        })
    }

    /// Decodes the body into a typed record.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        match &self.body_json {
            Some(json) => T::deserialize(json),
            // Parse again for the syntax error
            None => serde_json::from_str(&self.body_text),
        }
    }
}

#[cfg(test)]
mod test {
    use std::net::TcpListener;

    use mock_posts::Fault;
    use serde_json::json;

    use super::*;
    use crate::post::Post;

    fn payload(value: Value) -> Payload {
        match value {
            Value::Object(map) => map,
            _ => Payload::new(),
        }
    }

    #[tokio::test]
    async fn get_returns_non_2xx_as_a_response() {
        let base_url = mock_posts::spawn(Fault::None).await.unwrap();
        let client = ApiClient::new(&base_url).unwrap();

        let response = client.get("/posts/99999", None).await.unwrap();

        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.body_json, Some(json!({})));
    }

    #[tokio::test]
    async fn get_sends_query_parameters() {
        let base_url = mock_posts::spawn(Fault::None).await.unwrap();
        let client = ApiClient::new(&base_url).unwrap();

        let response = client
            .get("/posts", Some(&[("userId", "2")]))
            .await
            .unwrap();
        let posts: Vec<Post> = response.decode().unwrap();

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(posts.len(), 10);
        assert!(posts.iter().all(|post| post.user_id == Some(2)));
    }

    #[tokio::test]
    async fn post_encodes_payload_as_json() {
        let base_url = mock_posts::spawn(Fault::None).await.unwrap();
        let client = ApiClient::new(&base_url).unwrap();
        let body = payload(json!({ "title": "t", "body": "b", "userId": 3 }));

        let response = client.post("/posts", Some(&body)).await.unwrap();

        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(
            response.body_json,
            Some(json!({ "title": "t", "body": "b", "userId": 3, "id": 101 }))
        );
    }

    #[tokio::test]
    async fn verbs_without_payload_still_reach_the_server() {
        let base_url = mock_posts::spawn(Fault::None).await.unwrap();
        let client = ApiClient::new(&base_url).unwrap();

        assert_eq!(
            client.patch("/posts/1", None).await.unwrap().status,
            StatusCode::OK
        );
        assert_eq!(
            client.put("/posts/1", None).await.unwrap().status,
            StatusCode::OK
        );
        assert_eq!(
            client.delete("/posts/1").await.unwrap().status,
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn connection_refused_is_a_transport_error() {
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        let client = ApiClient::new(&format!("http://{addr}")).unwrap();

        let error = client.get("/posts", None).await.unwrap_err();

        assert!(matches!(error, ClientError::Transport { .. }));
    }

    async fn echo_headers(headers: axum::http::HeaderMap) -> axum::Json<Value> {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned)
        };

        axum::Json(json!({
            "content_type": header("content-type"),
            "accept": header("accept"),
        }))
    }

    #[tokio::test]
    async fn sends_json_content_type_and_accept() {
        let app = axum::Router::new().route(
            "/headers",
            axum::routing::get(echo_headers).post(echo_headers),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await });

        let client = ApiClient::new(&format!("http://{addr}")).unwrap();
        let expected = json!({
            "content_type": "application/json",
            "accept": "application/json",
        });

        let fetched = client.get("/headers", None).await.unwrap();
        assert_eq!(fetched.body_json, Some(expected.clone()));

        let body = payload(json!({ "title": "t" }));
        let posted = client.post("/headers", Some(&body)).await.unwrap();
        assert_eq!(posted.body_json, Some(expected));
    }

    #[test]
    fn path_is_appended_verbatim() {
        let client = ApiClient::new("http://localhost:3000").unwrap();

        assert_eq!(
            client.url("/posts/1").unwrap().as_str(),
            "http://localhost:3000/posts/1"
        );
        assert!(matches!(
            ApiClient::new("not a url").unwrap().url("/posts"),
            Err(ClientError::InvalidUrl(..))
        ));
    }
}
