use std::sync::Arc;

use http::header::{HeaderValue, AUTHORIZATION};
use http::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};
use voyage_types::{AuthUser, LoginRequest, LoginResponse, LOGIN_PATH, LOGOUT_PATH, PROFILE_PATH};

use crate::cleanup::CleanupOutcome;
use crate::context::SessionContext;
use crate::error::ApiError;
use crate::resolver::TokenSource;
use crate::transport::{ApiRequest, ApiResponse, ReqwestTransport, Transport};

/// HTTP client wrapper that runs the session interceptor around every call.
///
/// Request side: credentials mode, shared default headers, and a bearer
/// token unless the caller already set `Authorization`. Response side: a 401
/// is retried once with the cookie token when that differs from the token
/// tried; a 401 that survives ends in the cleanup routine.
pub struct ApiClient<T = ReqwestTransport> {
    session: Arc<SessionContext>,
    transport: T,
}

impl ApiClient<ReqwestTransport> {
    pub fn from_session(session: Arc<SessionContext>) -> Self {
        let transport = ReqwestTransport::new(session.config().request_timeout());
        Self::new(session, transport)
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn new(session: Arc<SessionContext>, transport: T) -> Self {
        Self { session, transport }
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = self.session.config().endpoint(&request.path)?;

        let (prepared, triedToken) = self.prepare(&request, None)?;
        let response = self.send(&url, &prepared).await?;

        if response.status != StatusCode::UNAUTHORIZED || !request.recover_unauthorized {
            return finish(response);
        }

        let alternate = self.session.resolver().resolve_from(TokenSource::Cookie);
        let retryToken = alternate.filter(|token| Some(token) != triedToken.as_ref());

        let response = match retryToken {
            Some(token) => {
                debug!(path = %request.path, "401 with a different cookie token, retrying once");
                let (prepared, _) = self.prepare(&request, Some(&token))?;
                let retried = self.send(&url, &prepared).await?;
                if retried.status != StatusCode::UNAUTHORIZED {
                    if let Some(rejected) = &triedToken {
                        self.session.replace_rejected_token(rejected, &token);
                    }
                }
                retried
            }
            None => response,
        };

        if response.status == StatusCode::UNAUTHORIZED {
            warn!(path = %request.path, "request unauthorized, clearing session");
            self.session.cleanup();
        }
        finish(response)
    }

    async fn send(&self, url: &str, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        self.transport.send(url, request).await.map_err(|e| {
            warn!(method = %request.method, url = %url, error = %e, "api request failed");
            ApiError::from(e)
        })
    }

    /// Applies the request-side interceptor. Returns the prepared request and
    /// the bearer token it carries, if any.
    fn prepare(
        &self,
        request: &ApiRequest,
        overrideToken: Option<&str>,
    ) -> Result<(ApiRequest, Option<String>), ApiError> {
        let mut prepared = request.clone();
        prepared.with_credentials = true;

        for (name, value) in self.session.default_headers().iter() {
            if !prepared.headers.contains_key(name) {
                prepared.headers.insert(name.clone(), value.clone());
            }
        }

        let token = match overrideToken {
            Some(token) => Some(token.to_string()),
            None if prepared.headers.contains_key(AUTHORIZATION) => None,
            None => self.session.token(),
        };

        if let Some(token) = &token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| ApiError::InvalidRequest(format!("token is not a valid header: {e}")))?;
            prepared.headers.insert(AUTHORIZATION, value);
        }

        #[cfg(not(target_arch = "wasm32"))]
        attach_cookies(&self.session, &mut prepared);

        let token = token.or_else(|| bearer_token(&prepared));
        Ok((prepared, token))
    }

    pub async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        self.execute(ApiRequest::get(path)).await?.json()
    }

    pub async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.execute(ApiRequest::post(path).json(body)?).await?.json()
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute(ApiRequest::delete(path)).await.map(|_| ())
    }

    pub async fn fetch_profile(&self) -> Result<AuthUser, ApiError> {
        self.get_json(PROFILE_PATH).await
    }

    /// Restores the user snapshot on page load. Without a token no request
    /// is made and the snapshot is cleared.
    pub async fn rehydrate(&self) -> Result<Option<AuthUser>, ApiError> {
        if self.session.token().is_none() {
            self.session.set_user(None);
            return Ok(None);
        }

        match self.fetch_profile().await {
            Ok(user) => {
                info!(user_id = %user.id, "session rehydrated");
                self.session.set_user(Some(user.clone()));
                Ok(Some(user))
            }
            Err(ApiError::Unauthorized { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthUser, ApiError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let request = ApiRequest::post(LOGIN_PATH).json(&body)?.without_recovery();
        let response: LoginResponse = self.execute(request).await?.json()?;

        self.session
            .sign_in(response.token.as_str(), response.user.clone())?;
        Ok(response.user)
    }

    /// Tells the backend (best effort) and clears the client session.
    pub async fn logout(&self) -> CleanupOutcome {
        let request = ApiRequest::post(LOGOUT_PATH).without_recovery();
        if let Err(e) = self.execute(request).await {
            debug!(error = %e, "logout request failed, clearing locally anyway");
        }
        self.session.cleanup()
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn attach_cookies(session: &SessionContext, request: &mut ApiRequest) {
    use http::header::COOKIE;

    if request.headers.contains_key(COOKIE) {
        return;
    }
    match session.storage().cookies.cookie_header() {
        Ok(header) if !header.is_empty() => {
            if let Ok(value) = HeaderValue::from_str(&header) {
                request.headers.insert(COOKIE, value);
            }
        }
        Ok(_) => {}
        Err(e) => warn!(error = %e, "failed to read cookies for request"),
    }
}

fn bearer_token(request: &ApiRequest) -> Option<String> {
    request
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
}

fn finish(response: ApiResponse) -> Result<ApiResponse, ApiError> {
    if response.status.is_success() {
        return Ok(response);
    }
    let err = ApiError::from_status(response.status, response.error_message());
    debug!(status = %response.status, error = %err, "api request rejected");
    Err(err)
}
