//! Request logging middleware.
//!
//! Emits one structured event per completed request with its id, method,
//! path, status, duration and, when the request carried a valid token, the
//! caller's email. The level follows the status class: 5xx is an error, 4xx a
//! warning, everything else info.

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::Instant,
};

use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
};
use futures::future::{Ready, ok};
use uuid::Uuid;

use crate::token::Claims;

/// Requests slower than this are additionally flagged as slow.
const SLOW_REQUEST_MS: u64 = 2000;

#[derive(Clone, Default)]
pub struct RequestLoggingMiddleware;

impl RequestLoggingMiddleware {
    pub fn new() -> Self {
        Self
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequestLoggingMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestLoggingService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(RequestLoggingService { service })
    }
}

pub struct RequestLoggingService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestLoggingService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start_time = Instant::now();
        let request_id = Uuid::new_v4();
        let method = req.method().to_string();
        let path = req.path().to_string();
        let remote_addr = req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or("unknown")
            .to_string();

        let fut = self.service.call(req);

        Box::pin(async move {
            let response = fut.await?;
            let duration_ms = start_time.elapsed().as_millis() as u64;
            let status = response.status().as_u16();
            // set by the auth extractor while the handler ran
            let caller = response
                .request()
                .extensions()
                .get::<Claims>()
                .map(|c| c.email.clone());

            match status {
                500..=599 => tracing::error!(
                    %request_id, %method, %path, status, duration_ms, ?caller, %remote_addr,
                    "Request failed"
                ),
                400..=499 => tracing::warn!(
                    %request_id, %method, %path, status, duration_ms, ?caller, %remote_addr,
                    "Request rejected"
                ),
                _ => tracing::info!(
                    %request_id, %method, %path, status, duration_ms, ?caller,
                    "Request completed"
                ),
            }

            if duration_ms > SLOW_REQUEST_MS {
                tracing::warn!(
                    %request_id, %method, %path, duration_ms,
                    threshold_ms = SLOW_REQUEST_MS,
                    "Slow request detected"
                );
            }

            Ok(response)
        })
    }
}
