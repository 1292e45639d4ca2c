//! HTTP middleware for the Cheato server.
pub mod request_size;
pub mod security_headers;

pub use request_size::{RequestSizeConfig, RequestSizeLayer, DEFAULT_BODY_LIMIT};
pub use security_headers::{FrameOptions, SecurityHeadersConfig, SecurityHeadersLayer};

#[cfg(test)]
pub(crate) mod testing {
    use axum::{extract::Request, http::StatusCode, response::Response};
    use std::convert::Infallible;
    use std::future::{ready, Ready};
    use std::task::{Context, Poll};
    use tower::Service;

    /// Inner service that only accepts calls on an instance that was polled
    /// ready. Clones start out not ready.
    #[derive(Default)]
    pub struct ReadinessTracked {
        ready: bool,
    }

    impl Clone for ReadinessTracked {
        fn clone(&self) -> Self {
            Self { ready: false }
        }
    }

    impl Service<Request> for ReadinessTracked {
        type Response = Response;
        type Error = Infallible;
        type Future = Ready<Result<Response, Infallible>>;

        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            self.ready = true;
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, _req: Request) -> Self::Future {
            let mut response = Response::default();
            if !std::mem::take(&mut self.ready) {
                *response.status_mut() = StatusCode::SERVICE_UNAVAILABLE;
            }
            ready(Ok(response))
        }
    }
}
