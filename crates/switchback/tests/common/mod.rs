#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use switchback::{
    Callback, Controller, HandlerResult, Middleware, Next, Params, Request, Response, Result,
    RouterError,
};

/// Installs a test-writer subscriber so `tracing` output shows up on failure.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// A shared invocation counter.
#[derive(Clone, Default)]
pub struct Counter(Arc<AtomicUsize>);

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hit(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// A closure callback that counts its calls and echoes the captured params.
pub fn counting(counter: &Counter) -> Callback {
    let counter = counter.clone();
    Callback::closure(move |_, _, params| {
        counter.hit();
        Ok(params.iter().collect::<Vec<_>>().join(","))
    })
}

pub fn text(body: &'static str) -> Callback {
    Callback::closure(move |_, _, _| Ok(body.to_string()))
}

pub fn failing(message: &'static str) -> Callback {
    Callback::closure(move |_, _, _| Err(RouterError::handler(message)))
}

/// Controller with `show` and `edit` actions.
pub struct Users;

impl Controller for Users {
    fn call(
        &mut self,
        action: &str,
        request: &Request,
        response: &mut Response,
        params: &Params,
    ) -> Option<HandlerResult> {
        match action {
            "show" => Some(Ok(format!("show {}", params.get(0).unwrap_or("-")))),
            "edit" => {
                response.set_header("X-Action", "edit");
                Some(Ok(format!("edit {} via {}", params.get(0).unwrap_or("-"), request.method)))
            }
            _ => None,
        }
    }
}

/// Middleware that never proceeds.
pub struct Block;

impl Middleware for Block {
    fn handle(&self, _request: &Request, response: &mut Response, _next: Next<'_>) -> Result<()> {
        response.status = 403;
        response.write("blocked");
        Ok(())
    }
}

/// Middleware that wraps the handler output.
pub struct Wrap;

impl Middleware for Wrap {
    fn handle(&self, _request: &Request, response: &mut Response, next: Next<'_>) -> Result<()> {
        response.write("[");
        next.run(response);
        response.write("]");
        Ok(())
    }
}

/// Middleware that fails before proceeding.
pub struct Broken;

impl Middleware for Broken {
    fn handle(&self, _request: &Request, _response: &mut Response, _next: Next<'_>) -> Result<()> {
        Err(RouterError::handler("middleware exploded"))
    }
}

/// Middleware that panics before proceeding.
pub struct Explode;

impl Middleware for Explode {
    fn handle(&self, _request: &Request, _response: &mut Response, _next: Next<'_>) -> Result<()> {
        panic!("fuse lit");
    }
}
