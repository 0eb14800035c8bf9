use std::time::Duration;

use async_trait::async_trait;
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::trace;
use voyage_types::ErrorBody;

use crate::error::{ApiError, TransportError};

/// A request as the application describes it, before the interceptor runs.
#[derive(Clone, Debug)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the backend base url, or an absolute url.
    pub path: String,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
    /// Send cookies along (`credentials: include`).
    pub with_credentials: bool,
    /// Run the retry/cleanup path on 401. Off for credential checks such as
    /// login, where a 401 only means "wrong password".
    pub recover_unauthorized: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: None,
            with_credentials: true,
            recover_unauthorized: true,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let bytes =
            serde_json::to_vec(body).map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        self.headers.insert(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        self.body = Some(bytes);
        Ok(self)
    }

    pub fn without_recovery(mut self) -> Self {
        self.recover_unauthorized = false;
        self
    }
}

#[derive(Clone, Debug)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_slice(&self.body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Best-effort human message from an error body.
    pub fn error_message(&self) -> Option<String> {
        serde_json::from_slice::<ErrorBody>(&self.body)
            .ok()
            .and_then(|body| body.best_message().map(str::to_string))
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait Transport {
    async fn send(&self, url: &str, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// `reqwest`-backed transport. In the browser this is `fetch` underneath.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }

    pub fn with_client(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_builder() {
        TransportError::InvalidRequest(err.to_string())
    } else {
        TransportError::Network(err.to_string())
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl Transport for ReqwestTransport {
    async fn send(&self, url: &str, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        trace!(
            method = %request.method,
            url = %url,
            timeout_secs = %self.timeout.as_secs(),
            "sending api request"
        );

        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .headers(request.headers.clone());

        #[cfg(not(target_arch = "wasm32"))]
        {
            builder = builder.timeout(self.timeout);
        }
        #[cfg(target_arch = "wasm32")]
        {
            if request.with_credentials {
                builder = builder.fetch_credentials_include();
            }
        }

        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(classify)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(classify)?.to_vec();

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}
