//! Request body size limiting middleware.
//!
//! Rejects requests whose declared `Content-Length` exceeds the limit before
//! the body is read. Bodies without a declared length are bounded by axum's
//! `DefaultBodyLimit`, set to the same value by the router.

use axum::{
    extract::Request,
    http::header::CONTENT_LENGTH,
    response::{IntoResponse, Response},
};
use futures::future::BoxFuture;
use metrics::counter;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::warn;

use crate::error::{CheatoError, ErrorCode};

/// Default limit: 10 MiB.
pub const DEFAULT_BODY_LIMIT: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct RequestSizeConfig {
    pub limit_bytes: usize,
    /// Path prefixes that are never checked
    pub excluded_paths: Vec<String>,
}

impl Default for RequestSizeConfig {
    fn default() -> Self {
        Self {
            limit_bytes: DEFAULT_BODY_LIMIT,
            excluded_paths: vec!["/health".to_string(), "/metrics".to_string()],
        }
    }
}

impl RequestSizeConfig {
    pub fn with_limit(limit_bytes: usize) -> Self {
        Self {
            limit_bytes,
            ..Default::default()
        }
    }

    fn limit_for_path(&self, path: &str) -> Option<usize> {
        if self.excluded_paths.iter().any(|p| path.starts_with(p.as_str())) {
            return None;
        }
        Some(self.limit_bytes)
    }
}

#[derive(Debug, Clone)]
pub struct RequestSizeLayer {
    config: RequestSizeConfig,
}

impl RequestSizeLayer {
    pub fn new(config: RequestSizeConfig) -> Self {
        Self { config }
    }
}

impl<S> Layer<S> for RequestSizeLayer {
    type Service = RequestSizeService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestSizeService {
            inner,
            config: self.config.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RequestSizeService<S> {
    inner: S,
    config: RequestSizeConfig,
}

impl<S> Service<Request> for RequestSizeService<S>
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

    fn call(&mut self, req: Request) -> Self::Future {
        let limit = self.config.limit_for_path(req.uri().path());
        let declared = req
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<usize>().ok());

        if let (Some(max), Some(length)) = (limit, declared) {
            if length > max {
                counter!("http_request_size_exceeded_total").increment(1);
                warn!(path = %req.uri().path(), length, max, "Body exceeds limit");
                let error = CheatoError::new(ErrorCode::PayloadTooLarge, "Request body too large")
                    .with_context("limit_bytes", max);
                return Box::pin(async move { Ok(error.into_response()) });
            }
        }

        // Call the instance poll_ready readied; leave a fresh clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        Box::pin(async move { inner.call(req).await })
    }
}
