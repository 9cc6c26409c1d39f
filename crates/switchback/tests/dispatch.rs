//! Tests for request dispatch, middleware and fallbacks.

mod common;
use common::*;

use std::fmt::Write as _;

use switchback::{Callback, Method, Request, Response, Router, RouterConfig, RouterError};

fn app_router() -> Router {
    init_tracing();
    let config = RouterConfig::new()
        .with_controller_namespace("app::controllers")
        .with_middleware_namespace("app::middleware");
    let mut router = Router::with_config(config).unwrap();
    router
        .register_controller("app::controllers::Users", || Users)
        .register_controller("admin::Users", || Users)
        .register_middleware("app::middleware::Block", || Block)
        .register_middleware("app::middleware::Wrap", || Wrap)
        .register_middleware("app::middleware::Broken", || Broken)
        .register_middleware("app::middleware::Explode", || Explode)
        .register_middleware("vendor::Wrap", || Wrap);
    router
}

#[test]
fn captured_params_reach_closure() {
    let hits = Counter::new();
    let mut router = app_router();
    router.get("user", "/users/:id/:slug", counting(&hits)).unwrap();

    let res = router.run(&Request::get("/users/42/jane-doe"));
    assert_eq!(res.status, 200);
    assert_eq!(res.body(), "42,jane-doe");
    assert_eq!(hits.count(), 1);
}

#[test]
fn method_must_match() {
    let hits = Counter::new();
    let mut router = app_router();
    router.post("create", "/users", counting(&hits)).unwrap();

    let res = router.run(&Request::get("/users"));
    assert_eq!(res.status, 404);
    assert_eq!(hits.count(), 0);

    let _ = router.run(&Request::post("/users"));
    assert_eq!(hits.count(), 1);
}

#[test]
fn not_found_default_message() {
    let hits = Counter::new();
    let mut router = app_router();
    router.get("user", "/users/:id", counting(&hits)).unwrap();

    let res = router.run(&Request::get("/users/abc"));
    assert_eq!(res.status, 404);
    assert_eq!(res.body(), "404 Not Found");
    assert_eq!(hits.count(), 0);
}

#[test]
fn custom_not_found_runs_once() {
    let hits = Counter::new();
    let misses = Counter::new();
    let mut router = app_router();
    router.get("home", "/", counting(&hits)).unwrap();
    router.not_found(counting(&misses));

    let res = router.run(&Request::get("/nowhere"));
    assert_eq!(res.status, 404);
    assert_eq!(res.body(), "");
    assert_eq!(misses.count(), 1);
    assert_eq!(hits.count(), 0);
}

#[test]
fn reference_callback_uses_controller_namespace() {
    let mut router = app_router();
    router.get("show", "/users/:id", "Users@show").unwrap();
    router.patch("edit", "/users/:id/edit", "admin/Users@edit").unwrap();

    assert_eq!(router.run(&Request::get("/users/7")).body(), "show 7");

    let res = router.run(&Request::new(Method::Patch, "/users/7/edit"));
    assert_eq!(res.body(), "edit 7 via PATCH");
    assert_eq!(res.headers.get("X-Action"), Some(&"edit".to_string()));
}

#[test]
fn pair_callback_is_not_prefixed() {
    let mut router = app_router();
    router.get("a", "/a", ("app::controllers::Users", "show")).unwrap();
    router.get("b", "/b", ("Users", "show")).unwrap();

    assert_eq!(router.run(&Request::get("/a")).body(), "show -");

    let res = router.run(&Request::get("/b"));
    assert_eq!(res.status, 500);
    assert_eq!(res.body(), "Error: controller Users not found");
}

#[test]
fn missing_action_goes_to_error_path() {
    let mut router = app_router();
    router.get("x", "/x", "Users@destroy").unwrap();

    let res = router.run(&Request::get("/x"));
    assert_eq!(res.status, 500);
    assert_eq!(
        res.body(),
        "Error: method destroy not found in app::controllers::Users"
    );
}

#[test]
fn malformed_reference_goes_to_error_path() {
    let mut router = app_router();
    router.get("x", "/x", "Users").unwrap();

    let res = router.run(&Request::get("/x"));
    assert_eq!(res.body(), "Error: invalid callback reference: Users");
}

#[test]
fn handler_failure_invokes_error_handler_once() {
    let errors = Counter::new();
    let seen = errors.clone();
    let mut router = app_router();
    router.get("boom", "/boom", failing("database down")).unwrap();
    router.error(Callback::closure(move |_, res, params| {
        seen.hit();
        res.status = 503;
        let err = params.error().expect("error handler receives the failure");
        Ok(format!("custom: {err}"))
    }));

    let res = router.run(&Request::get("/boom"));
    assert_eq!(errors.count(), 1);
    assert_eq!(res.status, 503);
    assert_eq!(res.body(), "custom: database down");
}

#[test]
fn panicking_handler_is_answered() {
    let mut router = app_router();
    router
        .get("panic", "/panic", Callback::closure(|_, _, _| panic!("oh no")))
        .unwrap();

    let res = router.run(&Request::get("/panic"));
    assert_eq!(res.status, 500);
    assert_eq!(res.body(), "Error: handler panicked: oh no");
}

#[test]
fn failing_error_handler_falls_back_to_default() {
    let mut router = app_router();
    router.get("boom", "/boom", failing("first")).unwrap();
    router.error(failing("second"));

    let res = router.run(&Request::get("/boom"));
    assert_eq!(res.status, 500);
    assert_eq!(res.body(), "Error: first");
}

#[test]
fn panicking_error_handler_falls_back_to_default() {
    let mut router = app_router();
    router.get("boom", "/boom", failing("first")).unwrap();
    router.error(Callback::closure(|_, _, _| panic!("again")));

    let res = router.run(&Request::get("/boom"));
    assert_eq!(res.status, 500);
    assert_eq!(res.body(), "Error: first");
}

#[test]
fn panicking_middleware_is_answered() {
    let hits = Counter::new();
    let mut router = app_router();
    router
        .route(Method::Get, "fuse", "/fuse", counting(&hits), "Explode")
        .unwrap();

    let res = router.run(&Request::get("/fuse"));
    assert_eq!(hits.count(), 0);
    assert_eq!(res.status, 500);
    assert_eq!(res.body(), "Error: handler panicked: fuse lit");
}

#[test]
fn failing_not_found_handler_goes_to_error_path() {
    let mut router = app_router();
    router.not_found(failing("lost"));

    let res = router.run(&Request::get("/missing"));
    assert_eq!(res.status, 500);
    assert_eq!(res.body(), "Error: lost");
}

#[test]
fn middleware_short_circuit_skips_handler() {
    let hits = Counter::new();
    let mut router = app_router();
    router
        .route(Method::Get, "secret", "/secret", counting(&hits), "Block")
        .unwrap();

    let res = router.run(&Request::get("/secret"));
    assert_eq!(hits.count(), 0);
    assert_eq!(res.status, 403);
    assert_eq!(res.body(), "blocked");
}

#[test]
fn middleware_wraps_handler() {
    let hits = Counter::new();
    let mut router = app_router();
    router
        .route(Method::Any, "wrapped", "/w/:id", counting(&hits), "Wrap")
        .unwrap();
    router
        .route(Method::Get, "vendor", "/v", text("v"), "vendor/Wrap")
        .unwrap();

    let res = router.run(&Request::new(Method::Put, "/w/9"));
    assert_eq!(res.body(), "[9]");
    assert_eq!(hits.count(), 1);

    assert_eq!(router.run(&Request::get("/v")).body(), "[v]");
}

#[test]
fn handler_failure_inside_middleware_reports_once() {
    let errors = Counter::new();
    let mut router = app_router();
    router
        .route(Method::Get, "w", "/w", failing("inner"), "Wrap")
        .unwrap();
    router.error(counting(&errors));

    let res = router.run(&Request::get("/w"));
    assert_eq!(errors.count(), 1);
    assert_eq!(res.status, 500);
    assert_eq!(res.body(), "[]");
}

#[test]
fn middleware_failures_go_to_error_path() {
    let hits = Counter::new();
    let mut router = app_router();
    router
        .route(Method::Get, "broken", "/broken", counting(&hits), "Broken")
        .unwrap();
    router
        .route(Method::Get, "ghost", "/ghost", counting(&hits), "Ghost")
        .unwrap();

    let res = router.run(&Request::get("/broken"));
    assert_eq!(res.body(), "Error: middleware exploded");

    let res = router.run(&Request::get("/ghost"));
    assert_eq!(res.body(), "Error: middleware app::middleware::Ghost not found");
    assert_eq!(hits.count(), 0);
}

#[test]
fn handlers_may_write_to_the_response() {
    let mut router = app_router();
    router
        .get(
            "stream",
            "/stream/:int",
            Callback::closure(|req, res, params| {
                write!(res, "{} {}:", req.method, req.path)
                    .map_err(RouterError::handler)?;
                Ok(format!(" n={}", params.parse::<u32>(0).unwrap_or_default()))
            }),
        )
        .unwrap();

    let res = router.run(&Request::get("/stream/5"));
    assert_eq!(res.body(), "GET /stream/5: n=5");
}

#[test]
fn dispatch_writes_into_supplied_response() {
    let mut router = app_router();
    router.get("home", "/", text("home")).unwrap();

    let mut response = Response::new(200).header("X-Request-Id", "abc");
    router.dispatch(&Request::get(""), &mut response);
    assert_eq!(response.body(), "home");
    assert_eq!(response.headers.get("X-Request-Id"), Some(&"abc".to_string()));
}

#[test]
fn router_is_reusable_across_requests() {
    let hits = Counter::new();
    let mut router = app_router();
    router.get("user", "/users/:id", counting(&hits)).unwrap();

    for id in ["1", "2", "3"] {
        let res = router.run(&Request::get(format!("/users/{id}")));
        assert_eq!(res.body(), id);
    }
    assert_eq!(hits.count(), 3);
}

#[test]
fn group_keeps_controllers_and_middleware_registered_inside() {
    let mut router = Router::new();
    router
        .group("/admin", |admin| {
            admin
                .register_controller("Users", || Users)
                .register_middleware("Wrap", || Wrap);
            admin.get("users", "/users/:id", "Users@show")?;
            admin.route(Method::Get, "wrapped", "/wrapped", text("w"), "Wrap")?;
            Ok(())
        })
        .unwrap();

    let res = router.run(&Request::get("/admin/users/4"));
    assert_eq!(res.status, 200);
    assert_eq!(res.body(), "show 4");
    assert_eq!(router.run(&Request::get("/admin/wrapped")).body(), "[w]");
}

#[test]
fn group_sees_factories_registered_before_it() {
    let mut router = app_router();
    router
        .group("/app", |app| {
            app.route(Method::Get, "user", "/users/:id", "Users@show", "Wrap")?;
            Ok(())
        })
        .unwrap();

    assert_eq!(router.run(&Request::get("/app/users/2")).body(), "[show 2]");
}

#[test]
fn inline_flag_groups_route_and_survive_url_for() {
    let mut router = app_router();
    router
        .get("report", "/(?i:reports)/:id", counting(&Counter::new()))
        .unwrap();

    assert_eq!(router.run(&Request::get("/REPORTS/12")).body(), "12");
    assert_eq!(
        router.url_for("report", &["12"]),
        Some("/(?i:reports)/12".to_string())
    );
}

#[test]
fn custom_tokens_must_be_identifiers() {
    let mut router = app_router();
    let err = router.pattern(":user-id", "([a-z]+)").unwrap_err();
    assert!(matches!(err, RouterError::InvalidToken(_)));

    router.pattern("user_id", "([a-z]+)").unwrap();
    router.get("member", "/members/:user_id", counting(&Counter::new())).unwrap();
    assert_eq!(router.run(&Request::get("/members/bob")).body(), "bob");
    assert_eq!(router.run(&Request::get("/members/b0b")).status, 404);
}
