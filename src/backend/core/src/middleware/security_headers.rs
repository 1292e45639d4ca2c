//! Security headers middleware.

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    response::Response,
};
use futures::future::BoxFuture;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use uuid::Uuid;

static REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FrameOptions {
    #[default]
    Deny,
    SameOrigin,
}

impl FrameOptions {
    const fn as_str(&self) -> &'static str {
        match self {
            Self::Deny => "DENY",
            Self::SameOrigin => "SAMEORIGIN",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SecurityHeadersConfig {
    pub frame_options: FrameOptions,
    pub referrer_policy: &'static str,
    /// HSTS max-age in seconds; 0 omits the header
    pub hsts_max_age: u64,
    pub content_security_policy: &'static str,
    /// Echo or mint `x-request-id`
    pub enable_request_id: bool,
    /// `Cache-Control: no-store` on `/api` responses
    pub api_no_cache: bool,
}

impl Default for SecurityHeadersConfig {
    fn default() -> Self {
        Self {
            frame_options: FrameOptions::Deny,
            referrer_policy: "no-referrer",
            hsts_max_age: 15_552_000,
            content_security_policy: "default-src 'self'; frame-ancestors 'none'; base-uri 'self'",
            enable_request_id: true,
            api_no_cache: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SecurityHeadersLayer {
    config: SecurityHeadersConfig,
}

impl SecurityHeadersLayer {
    pub fn new(config: SecurityHeadersConfig) -> Self {
        Self { config }
    }
}

impl<S> Layer<S> for SecurityHeadersLayer {
    type Service = SecurityHeadersService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SecurityHeadersService {
            inner,
            config: self.config.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SecurityHeadersService<S> {
    inner: S,
    config: SecurityHeadersConfig,
}

impl<S> Service<Request> for SecurityHeadersService<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let config = self.config.clone();
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        let request_id = config.enable_request_id.then(|| {
            let id = req
                .headers()
                .get(&REQUEST_ID)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
                .unwrap_or_else(|| Uuid::new_v4().to_string());
            if let Ok(value) = HeaderValue::from_str(&id) {
                req.headers_mut().insert(REQUEST_ID.clone(), value);
            }
            id
        });
        let is_api = req.uri().path().starts_with("/api");

        Box::pin(async move {
            let mut response = inner.call(req).await?;
            let headers = response.headers_mut();

            headers.insert(
                HeaderName::from_static("x-content-type-options"),
                HeaderValue::from_static("nosniff"),
            );
            headers.insert(
                HeaderName::from_static("x-frame-options"),
                HeaderValue::from_static(config.frame_options.as_str()),
            );
            headers.insert(
                HeaderName::from_static("x-xss-protection"),
                HeaderValue::from_static("0"),
            );
            headers.insert(
                HeaderName::from_static("referrer-policy"),
                HeaderValue::from_static(config.referrer_policy),
            );
            headers.insert(
                HeaderName::from_static("content-security-policy"),
                HeaderValue::from_static(config.content_security_policy),
            );
            if config.hsts_max_age > 0 {
                let hsts = format!("max-age={}; includeSubDomains", config.hsts_max_age);
                if let Ok(value) = HeaderValue::from_str(&hsts) {
                    headers.insert(HeaderName::from_static("strict-transport-security"), value);
                }
            }
            if let Some(value) = request_id.and_then(|id| HeaderValue::from_str(&id).ok()) {
                headers.insert(REQUEST_ID.clone(), value);
            }
            headers.remove("server");
            headers.remove("x-powered-by");
            if config.api_no_cache && is_api {
                headers.insert(
                    HeaderName::from_static("cache-control"),
                    HeaderValue::from_static("no-store"),
                );
            }

            Ok(response)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::testing::ReadinessTracked;
    use axum::{body::Body, http::StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_forwards_to_readied_service_and_sets_headers() {
        let mut service =
            SecurityHeadersLayer::new(SecurityHeadersConfig::default()).layer(ReadinessTracked::default());
        let response = service
            .ready()
            .await
            .unwrap()
            .call(Request::new(Body::empty()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-frame-options"], "DENY");
        assert!(response.headers().contains_key(&REQUEST_ID));
    }
}
