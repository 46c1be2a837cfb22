//! End-to-end dispatch behaviour of a registered router.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::http::{Method, StatusCode};
use jsongate::{Context, Router, Status};

mod common;

use common::{request, send, scenario_router, TestResponse, TOKEN_HEADER};

#[tokio::test]
async fn test_private_route_without_auth_header() {
    let router = scenario_router();
    let res = send(&router, Method::GET, "/", &[]).await;

    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.header("content-type"), Some("application/json"));
    assert_eq!(res.body, r#"{"Code":403,"Message":"Forbidden"}"#);
}

#[tokio::test]
async fn test_private_route_with_auth_header() {
    let router = scenario_router();
    let res = send(&router, Method::GET, "/", &[TOKEN_HEADER]).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.header("content-type"), Some("application/json"));
    assert_eq!(res.body, r#"{"Code":200,"Message":"OK"}"#);
}

#[tokio::test]
async fn test_custom_body() {
    let router = scenario_router();
    let res = send(&router, Method::GET, "/custom", &[TOKEN_HEADER]).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, r#"{"Foo":"foo","Bar":1}"#);
}

#[tokio::test]
async fn test_public_route_bypasses_gate() {
    let router = scenario_router();
    let res = send(&router, Method::GET, "/public", &[]).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.header("content-type"), Some("application/json"));
    assert_eq!(res.body, r#"{"Foo":"foo","Bar":1}"#);
}

#[tokio::test]
async fn test_unbound_method_is_405() {
    let router = scenario_router();
    for headers in [&[][..], &[TOKEN_HEADER][..]] {
        let res = send(&router, Method::POST, "/", headers).await;
        assert_eq!(res.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(res.body, r#"{"Code":405,"Message":"Method Not Allowed"}"#);
    }
}

#[tokio::test]
async fn test_options_lists_bound_methods() {
    let router = scenario_router();
    for headers in [&[][..], &[TOKEN_HEADER][..]] {
        let res = send(&router, Method::OPTIONS, "/", headers).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.header("content-type"), Some("application/json"));
        assert_eq!(res.header("content-length"), Some("0"));
        assert_eq!(res.header("allow"), Some("GET, OPTIONS"));
        assert_eq!(res.header("access-control-allow-methods"), Some("GET, OPTIONS"));
        assert!(res.body.is_empty());
    }
}

#[tokio::test]
async fn test_options_skips_authorizer_and_handler() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut router = Router::new();

    let authorizer_calls = calls.clone();
    router.set_authorizer(move |_ctx: Context| {
        authorizer_calls.fetch_add(1, Ordering::SeqCst);
        async { None::<Status> }
    });
    let handler_calls = calls.clone();
    router
        .get("/items/:id", move |_ctx: Context| {
            handler_calls.fetch_add(1, Ordering::SeqCst);
            async { None::<Status> }
        })
        .unwrap();
    router
        .put("/items/:id", |_ctx: Context| async { None::<Status> })
        .unwrap();

    let res = send(&router, Method::OPTIONS, "/items/3", &[]).await;
    assert_eq!(res.header("allow"), Some("GET, PUT, OPTIONS"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unknown_path_is_404() {
    let router = scenario_router();
    let res = send(&router, Method::GET, "/404", &[TOKEN_HEADER]).await;

    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.header("content-type"), Some("application/json"));
    assert_eq!(res.body, r#"{"Code":404,"Message":"Not Found"}"#);
}

#[tokio::test]
async fn test_non_json_content_type_is_400() {
    let router = scenario_router();
    for body in ["<xml></xml>", ""] {
        let req = request(
            Method::GET,
            "/",
            &[TOKEN_HEADER, ("content-type", "application/xml")],
            body,
        );
        let res = TestResponse::from_response(router.dispatch(req).await).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.header("content-type"), Some("application/json"));
        assert_eq!(res.body, r#"{"Code":400,"Message":"Bad Request"}"#);
    }
}

#[tokio::test]
async fn test_content_type_checked_before_routing() {
    let router = scenario_router();
    let res = send(&router, Method::GET, "/404", &[("content-type", "text/plain")]).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_json_content_type_is_accepted() {
    let router = scenario_router();
    let res = send(
        &router,
        Method::GET,
        "/",
        &[TOKEN_HEADER, ("content-type", "application/json")],
    )
    .await;
    assert_eq!(res.status, StatusCode::OK);
}

#[tokio::test]
async fn test_private_route_without_authorizer_is_403() {
    let invoked = Arc::new(AtomicUsize::new(0));
    let counter = invoked.clone();
    let mut router = Router::new();
    router
        .get("/", move |_ctx: Context| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { None::<Status> }
        })
        .unwrap();

    for headers in [&[][..], &[TOKEN_HEADER][..]] {
        let res = send(&router, Method::GET, "/", headers).await;
        assert_eq!(res.status, StatusCode::FORBIDDEN);
    }
    assert_eq!(invoked.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_private_route_without_authorizer_ignores_body() {
    let mut router = Router::new();
    router.set_max_body_bytes(1024);
    router
        .get("/", |_ctx: Context| async { None::<Status> })
        .unwrap();

    let oversized = "x".repeat(2 * 1024);
    for body in [r#"{"name":"widget"}"#, oversized.as_str(), "not json"] {
        let res = TestResponse::from_response(
            router.dispatch(request(Method::GET, "/", &[], body)).await,
        )
        .await;
        assert_eq!(res.status, StatusCode::FORBIDDEN);
        assert_eq!(res.body, r#"{"Code":403,"Message":"Forbidden"}"#);
    }
}

#[tokio::test]
async fn test_denying_authorizer_sees_oversized_request_first() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let mut router = Router::new();
    router.set_max_body_bytes(1024);
    router.set_authorizer(move |_ctx: Context| {
        counter.fetch_add(1, Ordering::SeqCst);
        async { Some(Status::FORBIDDEN) }
    });
    router
        .post("/", |_ctx: Context| async { Some(Status::CREATED) })
        .unwrap();

    let oversized = "x".repeat(2 * 1024);
    let res = TestResponse::from_response(
        router
            .dispatch(request(Method::POST, "/", &[], &oversized))
            .await,
    )
    .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_oversized_body_after_gate_is_400() {
    let mut router = Router::new();
    router.set_max_body_bytes(8);
    router.set_authorizer(|_ctx: Context| async { None::<Status> });
    router
        .post("/", |_ctx: Context| async { Some(Status::CREATED) })
        .unwrap();

    let res = TestResponse::from_response(
        router
            .dispatch(request(Method::POST, "/", &[], r#"{"padding":"more than eight"}"#))
            .await,
    )
    .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_authorizer_2xx_proceeds() {
    let mut router = Router::new();
    router.set_authorizer(|_ctx: Context| async { Some(Status::from_code(202)) });
    router
        .get("/", |_ctx: Context| async { Some(Status::CREATED) })
        .unwrap();

    let res = send(&router, Method::GET, "/", &[]).await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body, r#"{"Code":201,"Message":"Created"}"#);
}

#[tokio::test]
async fn test_authorizer_status_is_returned_verbatim() {
    let invoked = Arc::new(AtomicUsize::new(0));
    let counter = invoked.clone();
    let mut router = Router::new();
    router.set_authorizer(|_ctx: Context| async {
        Some(Status::UNAUTHORIZED.with_error("token expired"))
    });
    router
        .get("/", move |_ctx: Context| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { None::<Status> }
        })
        .unwrap();

    let res = send(&router, Method::GET, "/", &[]).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        res.body,
        r#"{"Code":401,"Message":"Unauthorized","Errors":["token expired"]}"#
    );
    assert_eq!(invoked.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_redirect_status_from_authorizer_denies() {
    let mut router = Router::new();
    router.set_authorizer(|_ctx: Context| async { Some(Status::from_code(302)) });
    router
        .get("/", |_ctx: Context| async { None::<Status> })
        .unwrap();

    let res = send(&router, Method::GET, "/", &[]).await;
    assert_eq!(res.status, StatusCode::FOUND);
}

#[tokio::test]
async fn test_last_authorizer_wins() {
    let mut router = Router::new();
    router.set_authorizer(|_ctx: Context| async { Some(Status::FORBIDDEN) });
    router.set_authorizer(|_ctx: Context| async { None::<Status> });
    router
        .get("/", |_ctx: Context| async { None::<Status> })
        .unwrap();

    let res = send(&router, Method::GET, "/", &[]).await;
    assert_eq!(res.status, StatusCode::OK);
}

#[tokio::test]
async fn test_params_reach_handler() {
    let mut router = Router::new();
    router
        .get("/foo/:foo_id/bar/:id", |ctx: Context| async move {
            let body = serde_json::json!({
                "foo_id": ctx.param("foo_id"),
                "id": ctx.param("id"),
            });
            ctx.writer().write_json(&body).ok()?;
            None::<Status>
        })
        .unwrap()
        .mark_public();

    let res = send(&router, Method::GET, "/foo/12/bar/a%2Fb?x=1", &[]).await;
    assert_eq!(res.status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&res.body).unwrap();
    assert_eq!(body["foo_id"], "12");
    assert_eq!(body["id"], "a/b");
}

#[tokio::test]
async fn test_registration_order_is_precedence() {
    async fn by_id(_ctx: Context) -> Option<Status> {
        Some(Status::from_code(200).with_message("by id"))
    }
    async fn me(_ctx: Context) -> Option<Status> {
        Some(Status::from_code(200).with_message("me"))
    }

    let mut router = Router::new();
    router.get("/users/:id", by_id).unwrap().mark_public();
    router.get("/users/me", me).unwrap().mark_public();
    let res = send(&router, Method::GET, "/users/me", &[]).await;
    assert_eq!(res.body, r#"{"Code":200,"Message":"by id"}"#);

    let mut router = Router::new();
    router.get("/users/me", me).unwrap().mark_public();
    router.get("/users/:id", by_id).unwrap().mark_public();
    let res = send(&router, Method::GET, "/users/me", &[]).await;
    assert_eq!(res.body, r#"{"Code":200,"Message":"me"}"#);
}

#[tokio::test]
async fn test_handler_body_wins_over_returned_status() {
    let mut router = Router::new();
    router
        .post("/items", |ctx: Context| async move {
            ctx.writer().write(br#"{"id":1}"#);
            Some(Status::CONFLICT)
        })
        .unwrap()
        .mark_public();

    let res = send(&router, Method::POST, "/items", &[]).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, r#"{"id":1}"#);
}

#[tokio::test]
async fn test_no_content_has_empty_body() {
    let mut router = Router::new();
    router
        .delete("/items/:id", |_ctx: Context| async { Some(Status::NO_CONTENT) })
        .unwrap()
        .mark_public();

    let res = send(&router, Method::DELETE, "/items/1", &[]).await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    assert!(res.body.is_empty());
}

#[tokio::test]
async fn test_json_body_decoding() {
    #[derive(serde::Deserialize)]
    struct NewItem {
        name: String,
    }

    let mut router = Router::new();
    router
        .post("/items", |ctx: Context| async move {
            let item: NewItem = match ctx.json() {
                Ok(item) => item,
                Err(status) => return Some(status),
            };
            if item.name.is_empty() {
                return Some(Status::UNPROCESSABLE_ENTITY.with_error("name is empty"));
            }
            Some(Status::CREATED)
        })
        .unwrap()
        .mark_public();

    let ok = request(
        Method::POST,
        "/items",
        &[("content-type", "application/json")],
        r#"{"name":"widget"}"#,
    );
    let res = TestResponse::from_response(router.dispatch(ok).await).await;
    assert_eq!(res.status, StatusCode::CREATED);

    let empty = request(Method::POST, "/items", &[], r#"{"name":""}"#);
    let res = TestResponse::from_response(router.dispatch(empty).await).await;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);

    let broken = request(Method::POST, "/items", &[], "{");
    let res = TestResponse::from_response(router.dispatch(broken).await).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_str(&res.body).unwrap();
    assert_eq!(body["Errors"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_handler_panic_does_not_affect_next_request() {
    let mut router = Router::new();
    router
        .get("/boom", |_ctx: Context| async {
            if true {
                panic!("boom");
            }
            None::<Status>
        })
        .unwrap()
        .mark_public();
    router
        .get("/fine", |_ctx: Context| async { None::<Status> })
        .unwrap()
        .mark_public();

    let res = send(&router, Method::GET, "/boom", &[]).await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    let res = send(&router, Method::GET, "/fine", &[]).await;
    assert_eq!(res.status, StatusCode::OK);
}
