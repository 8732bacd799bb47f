//! Access log for the API.
//!
//! One line when a request arrives and one when it finishes. The session
//! is reported by where it came from (`bearer`, `cookie` or `none`); token
//! values never reach the log.

use std::future::{Ready, ready};
use std::time::Instant;

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::{StatusCode, header};
use futures_util::future::LocalBoxFuture;
use tracing::{Level, error, info, warn};

use crate::config::SESSION_COOKIE;

/// Where the request's session token is carried, if anywhere.
fn session_source(req: &ServiceRequest) -> &'static str {
    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Bearer "));

    if bearer {
        "bearer"
    } else if req.cookie(SESSION_COOKIE).is_some() {
        "cookie"
    } else {
        "none"
    }
}

fn completion_level(status: StatusCode) -> Level {
    if status.is_server_error() {
        Level::ERROR
    } else if status.is_client_error() {
        Level::WARN
    } else {
        Level::INFO
    }
}

/// Wrap the app with `.wrap(RequestLogger)`.
pub struct RequestLogger;

impl<S, B> Transform<S, ServiceRequest> for RequestLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestLoggerService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestLoggerService { service }))
    }
}

pub struct RequestLoggerService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestLoggerService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let started = Instant::now();
        let method = req.method().clone();
        let path = req.path().to_string();
        let session = session_source(&req);
        let peer = req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or("unknown")
            .to_string();

        info!(
            target: "api",
            %method,
            %path,
            query = %req.query_string(),
            %peer,
            session,
            "request received"
        );

        let fut = self.service.call(req);

        Box::pin(async move {
            let res = fut.await?;
            let status = res.status().as_u16();
            let duration_ms = started.elapsed().as_millis() as u64;

            let level = completion_level(res.status());
            if level == Level::ERROR {
                error!(
                    target: "api", %method, %path, status, duration_ms, session,
                    "request failed"
                );
            } else if level == Level::WARN {
                warn!(
                    target: "api", %method, %path, status, duration_ms, session,
                    "request rejected"
                );
            } else {
                info!(
                    target: "api", %method, %path, status, duration_ms, session,
                    "request completed"
                );
            }

            Ok(res)
        })
    }
}
