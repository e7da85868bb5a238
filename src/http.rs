//! actix-web middleware: request logging and panic recovery
//!
//! # Example
//!
//! ```no_run
//! use actix_web::{web, App, HttpResponse, HttpServer};
//! use fslog::http::{Recovery, RequestLogger};
//!
//! # async fn run() -> std::io::Result<()> {
//! HttpServer::new(|| {
//!     App::new()
//!         .wrap(Recovery::new())
//!         .wrap(RequestLogger::new(["/health"]))
//!         .route("/", web::get().to(|| async { HttpResponse::Ok().body("hello") }))
//! })
//! .bind(("127.0.0.1", 8080))?
//! .run()
//! .await
//! # }
//! ```
//!
//! Both middlewares log to the process-wide default logger unless given one
//! through `with_logger`. The default is resolved per request, so a later
//! [`set_logger`](crate::set_logger) is honored.

use crate::core::dispatcher::panic_message;
use crate::core::Logger;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::error::ErrorInternalServerError;
use actix_web::Error;
use futures::future::{ready, LocalBoxFuture, Ready};
use futures::FutureExt;
use std::backtrace::Backtrace;
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

fn resolve(logger: &Option<Arc<Logger>>) -> Arc<Logger> {
    logger.clone().unwrap_or_else(crate::logger)
}

/// Logs one Info line per request once the response is produced:
/// ` 200 | 3ms | GET "/users"`.
///
/// Requests whose path is in `skip_paths` are served but not logged.
#[derive(Debug, Clone, Default)]
pub struct RequestLogger {
    skip_paths: Rc<HashSet<String>>,
    logger: Option<Arc<Logger>>,
}

impl RequestLogger {
    pub fn new<I, P>(skip_paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self {
            skip_paths: Rc::new(skip_paths.into_iter().map(Into::into).collect()),
            logger: None,
        }
    }

    /// Log to `logger` instead of the default logger
    #[must_use]
    pub fn with_logger(mut self, logger: Arc<Logger>) -> Self {
        self.logger = Some(logger);
        self
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequestLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RequestLoggerMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestLoggerMiddleware {
            service,
            skip_paths: Rc::clone(&self.skip_paths),
            logger: self.logger.clone(),
        }))
    }
}

pub struct RequestLoggerMiddleware<S> {
    service: S,
    skip_paths: Rc<HashSet<String>>,
    logger: Option<Arc<Logger>>,
}

impl<S, B> Service<ServiceRequest> for RequestLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let path = req.path().to_owned();
        let method = req.method().to_string();
        let skip = self.skip_paths.contains(&path);
        let logger = self.logger.clone();

        let fut = self.service.call(req);

        async move {
            let result = fut.await;
            if !skip {
                let status = match &result {
                    Ok(res) => res.status(),
                    Err(e) => e.as_response_error().status_code(),
                };
                resolve(&logger).info(format_args!(
                    " {} | {}ms | {} \"{}\"",
                    status.as_u16(),
                    start.elapsed().as_millis(),
                    method,
                    path
                ));
            }
            result
        }
        .boxed_local()
    }
}

/// Turns a panicking handler into a 500 response and logs the panic message
/// with a backtrace at Error level.
///
/// The 500 is returned as an `Err`, so outer middleware such as
/// [`RequestLogger`] see it like any other handler error.
#[derive(Debug, Clone, Default)]
pub struct Recovery {
    logger: Option<Arc<Logger>>,
}

impl Recovery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log to `logger` instead of the default logger
    #[must_use]
    pub fn with_logger(mut self, logger: Arc<Logger>) -> Self {
        self.logger = Some(logger);
        self
    }
}

impl<S, B> Transform<S, ServiceRequest> for Recovery
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RecoveryMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RecoveryMiddleware {
            service,
            logger: self.logger.clone(),
        }))
    }
}

pub struct RecoveryMiddleware<S> {
    service: S,
    logger: Option<Arc<Logger>>,
}

impl<S, B> Service<ServiceRequest> for RecoveryMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // The request moves into the inner service whole; routing needs sole
        // ownership of it to record path parameters
        let logger = self.logger.clone();

        // Handlers may panic while building their future as well as when polled
        let called = panic::catch_unwind(AssertUnwindSafe(|| self.service.call(req)));

        async move {
            let outcome = match called {
                Ok(fut) => AssertUnwindSafe(fut).catch_unwind().await,
                Err(payload) => Err(payload),
            };

            match outcome {
                Ok(result) => result,
                Err(payload) => {
                    let backtrace = Backtrace::force_capture();
                    resolve(&logger).error(format_args!(
                        "panic recovered: {}\n{}",
                        panic_message(payload.as_ref()),
                        backtrace
                    ));
                    Err(ErrorInternalServerError("panic recovered"))
                }
            }
        }
        .boxed_local()
    }
}
