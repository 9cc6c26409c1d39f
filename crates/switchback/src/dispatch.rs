//! Request dispatch.
//!
//! One dispatch walks Matching, then the route's middleware, then its
//! handler. Unmatched requests go to the not-found fallback and every
//! failure along the way goes to the error fallback, so a response is
//! always produced.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, warn};

use crate::config::normalize;
use crate::error::{Result, RouterError};
use crate::middleware::Next;
use crate::request::{Params, Request};
use crate::response::Response;
use crate::route::{Callback, HandlerResult, Route};
use crate::router::Router;

const NOT_FOUND_BODY: &str = "404 Not Found";

pub(crate) struct Dispatcher<'a> {
    router: &'a Router,
    request: &'a Request,
}

impl<'a> Dispatcher<'a> {
    pub(crate) const fn new(router: &'a Router, request: &'a Request) -> Self {
        Self { router, request }
    }

    pub(crate) fn dispatch(&self, response: &mut Response) {
        match self.router.find(self.request) {
            Some((route, values)) => {
                debug!(route = %route.name, path = %self.request.path, "route matched");
                self.run_middleware(route, &Params::new(values), response);
            }
            None => self.run_not_found(response),
        }
    }

    fn run_middleware(&self, route: &Route, params: &Params, response: &mut Response) {
        if route.middleware.is_empty() {
            self.run_callback(&route.callback, params, response);
            return;
        }

        let name = self.router.config().middleware_path(&route.middleware);
        let outcome = guard(|| {
            let middleware = self.router.resolver().middleware(&name)?;
            let next = Next::new(|res: &mut Response| {
                self.run_callback(&route.callback, params, res);
            });
            middleware.handle(self.request, response, next)
        });
        if let Err(err) = outcome {
            self.run_error(err, response);
        }
    }

    fn run_callback(&self, callback: &Callback, params: &Params, response: &mut Response) {
        if let Err(err) = self.invoke(callback, params, response) {
            self.run_error(err, response);
        }
    }

    fn invoke(&self, callback: &Callback, params: &Params, response: &mut Response) -> Result<()> {
        let body = match callback {
            Callback::Closure(handler) => guard(|| handler(self.request, response, params))?,
            Callback::Reference(reference) => {
                let (controller, action) = reference
                    .split_once('@')
                    .ok_or_else(|| RouterError::InvalidCallback(reference.clone()))?;
                let controller = self.router.config().controller_path(controller);
                self.call_controller(&controller, action, params, response)?
            }
            Callback::Pair { controller, action } => {
                self.call_controller(&normalize(controller), action, params, response)?
            }
        };
        response.write(&body);
        Ok(())
    }

    fn call_controller(
        &self,
        name: &str,
        action: &str,
        params: &Params,
        response: &mut Response,
    ) -> HandlerResult {
        guard(|| {
            let mut controller = self.router.resolver().controller(name)?;
            controller
                .call(action, self.request, response, params)
                .unwrap_or_else(|| {
                    Err(RouterError::ActionNotFound {
                        controller: name.to_string(),
                        action: action.to_string(),
                    })
                })
        })
    }

    fn run_not_found(&self, response: &mut Response) {
        debug!(method = %self.request.method, path = %self.request.path, "no route matched");
        response.status = 404;
        match self.router.not_found_handler() {
            Some(callback) => self.run_callback(callback, &Params::default(), response),
            None => response.write(NOT_FOUND_BODY),
        }
    }

    fn run_error(&self, err: RouterError, response: &mut Response) {
        warn!(
            method = %self.request.method,
            path = %self.request.path,
            error = %err,
            "dispatch failed"
        );
        response.status = 500;

        let Some(callback) = self.router.error_handler() else {
            response.write(&format!("Error: {err}"));
            return;
        };

        let description = err.to_string();
        if let Err(secondary) = self.invoke(callback, &Params::from_error(err), response) {
            warn!(error = %secondary, "error handler failed");
            response.write(&format!("Error: {description}"));
        }
    }
}

/// Runs `f`, turning a panic into [`RouterError::Panicked`].
fn guard<T>(f: impl FnOnce() -> Result<T>) -> Result<T> {
    panic::catch_unwind(AssertUnwindSafe(f))
        .unwrap_or_else(|payload| Err(RouterError::Panicked(panic_message(payload.as_ref()))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
