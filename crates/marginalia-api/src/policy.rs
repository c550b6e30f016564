//! Per-function request policy.
//!
//! Every comment function runs behind the same wrapper: `OPTIONS` requests
//! are answered immediately, then the optional feature flag and rate limit
//! are checked, and unexpected failures are reported with the function's own
//! message. The fixed CORS headers are added by [`with_cors`].

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    RETRY_AFTER,
};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::Router;
use axum::routing::MethodRouter;
use marginalia_core::error::DomainError;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::error::{ApiError, DEFAULT_ERROR_MESSAGE, UnexpectedFailure, unexpected_response};
use crate::rate_limit::{Decision, FixedWindowLimiter, RateLimit};
use crate::state::AppState;

/// Hash holding the feature flags, one field per flag.
pub const FEATURE_FLAGS_KEY: &str = "feature-flags";

/// Client key used when no address can be determined.
const ANONYMOUS_CLIENT: &str = "anonymous";

/// Policy applied around a single function.
#[derive(Debug)]
pub struct HandlerPolicy {
    name: &'static str,
    feature_flag: Option<&'static str>,
    rate_limiter: Option<FixedWindowLimiter>,
    error_message: &'static str,
}

impl HandlerPolicy {
    /// A policy with no flag, no rate limit and the default error message.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            feature_flag: None,
            rate_limiter: None,
            error_message: DEFAULT_ERROR_MESSAGE,
        }
    }

    /// Requires the named flag in [`FEATURE_FLAGS_KEY`] to be enabled.
    #[must_use]
    pub fn feature_flag(mut self, flag: &'static str) -> Self {
        self.feature_flag = Some(flag);
        self
    }

    /// Limits requests per client IP.
    #[must_use]
    pub fn rate_limit(mut self, limit: RateLimit) -> Self {
        self.rate_limiter = Some(FixedWindowLimiter::new(limit));
        self
    }

    /// Message shown to callers when the function fails unexpectedly.
    #[must_use]
    pub fn error_message(mut self, message: &'static str) -> Self {
        self.error_message = message;
        self
    }

    /// Wraps `handler` in this policy.
    pub fn wrap(self, state: &AppState, handler: MethodRouter<AppState>) -> MethodRouter<AppState> {
        let policy_state = PolicyState {
            app: state.clone(),
            policy: Arc::new(self),
        };
        handler.layer(middleware::from_fn_with_state(policy_state, enforce))
    }

    /// Runs the flag and rate-limit checks. Returns the response to send
    /// instead of calling the handler, if any.
    async fn admit(&self, app: &AppState, client: &str) -> Option<Response> {
        if let Some(flag) = self.feature_flag {
            match app.store.hget(FEATURE_FLAGS_KEY, flag).await {
                Ok(value) if is_enabled(value.as_deref()) => {}
                Ok(_) => {
                    tracing::warn!(function = self.name, flag, "feature disabled");
                    let err = DomainError::forbidden("This feature is currently disabled.");
                    return Some(ApiError(err).into_response_with_message(self.error_message));
                }
                Err(err) => {
                    return Some(ApiError(err).into_response_with_message(self.error_message));
                }
            }
        }

        if let Some(limiter) = &self.rate_limiter {
            if let Decision::Limited { retry_after } = limiter.check(client, app.clock.now()) {
                tracing::warn!(function = self.name, %client, "rate limit exceeded");
                let err = DomainError::too_many_requests("Too many requests, please try again later.");
                let mut response = ApiError(err).into_response_with_message(self.error_message);
                let seconds = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
                response
                    .headers_mut()
                    .insert(RETRY_AFTER, HeaderValue::from(seconds));
                return Some(response);
            }
        }

        None
    }
}

#[derive(Clone)]
struct PolicyState {
    app: AppState,
    policy: Arc<HandlerPolicy>,
}

async fn enforce(State(state): State<PolicyState>, request: Request, next: Next) -> Response {
    if *request.method() == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }

    // Resolved up front: the request body is not `Sync`, so the request
    // cannot be borrowed across the store round trip.
    let client = client_ip(request.headers(), request.extensions().get());
    if let Some(rejection) = state.policy.admit(&state.app, &client).await {
        return rejection;
    }

    let response = next.run(request).await;
    if response.extensions().get::<UnexpectedFailure>().is_some() {
        return unexpected_response(state.policy.error_message);
    }
    response
}

/// Flags are stored as strings; `true` and `1` enable, anything else
/// (including absence) disables.
fn is_enabled(value: Option<&str>) -> bool {
    matches!(value.map(str::trim), Some("true" | "1"))
}

/// Client address used as the rate-limit key.
///
/// Sources a caller cannot choose come first: the hosting platform's
/// connection header, then the socket peer. Behind a plain reverse proxy the
/// last `X-Forwarded-For` hop is used, since that is the one the proxy
/// appended; earlier hops are whatever the client sent.
fn client_ip(headers: &HeaderMap, peer: Option<&ConnectInfo<SocketAddr>>) -> String {
    let header = |name| header_value(headers, name);

    if let Some(ip) = header("x-nf-client-connection-ip") {
        return ip.to_owned();
    }
    if let Some(ConnectInfo(addr)) = peer {
        return addr.ip().to_string();
    }

    let last_hop = header("x-forwarded-for")
        .and_then(|v| v.rsplit(',').map(str::trim).find(|hop| !hop.is_empty()));
    last_hop
        .or_else(|| header("x-real-ip"))
        .map_or_else(|| ANONYMOUS_CLIENT.to_owned(), str::to_owned)
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Adds the fixed CORS headers to every response of `router`.
pub fn with_cors(router: Router<AppState>) -> Router<AppState> {
    router
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
        ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_enabled_accepts_only_truthy_strings() {
        assert!(is_enabled(Some("true")));
        assert!(is_enabled(Some("1")));
        assert!(is_enabled(Some(" true ")));
        assert!(!is_enabled(Some("false")));
        assert!(!is_enabled(Some("yes")));
        assert!(!is_enabled(None));
    }

    #[test]
    fn test_client_ip_uses_last_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("10.9.9.1, 198.51.100.4"),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));

        assert_eq!(client_ip(&headers, None), "198.51.100.4");
    }

    #[test]
    fn test_client_ip_prefers_peer_over_forwarded_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("10.9.9.1"));
        let peer = ConnectInfo(SocketAddr::from(([192, 0, 2, 1], 50_000)));

        assert_eq!(client_ip(&headers, Some(&peer)), "192.0.2.1");
    }

    #[test]
    fn test_client_ip_falls_back_to_real_ip_then_anonymous() {
        let mut headers = HeaderMap::new();
        assert_eq!(client_ip(&headers, None), "anonymous");

        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(client_ip(&headers, None), "10.0.0.2");
    }

    #[test]
    fn test_client_ip_reads_platform_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-nf-client-connection-ip",
            HeaderValue::from_static("203.0.113.9"),
        );
        headers.insert("x-forwarded-for", HeaderValue::from_static("10.9.9.1"));
        let peer = ConnectInfo(SocketAddr::from(([192, 0, 2, 1], 50_000)));

        assert_eq!(client_ip(&headers, Some(&peer)), "203.0.113.9");
    }
}
