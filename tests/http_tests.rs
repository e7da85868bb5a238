//! Middleware tests against a full actix-web app
//!
//! Built only with the `actix` feature: `cargo test --all-features`.

use actix_web::{http::StatusCode, test, web, App, HttpResponse};
use fslog::http::{Recovery, RequestLogger};
use fslog::{Logger, SharedBuffer};
use serde_json::Value;
use std::sync::Arc;

fn capture() -> (Arc<Logger>, SharedBuffer) {
    let logger = Logger::new();
    let buffer = SharedBuffer::new();
    logger.new_output(buffer.clone());
    (Arc::new(logger), buffer)
}

fn messages(buffer: &SharedBuffer) -> Vec<String> {
    buffer
        .lines()
        .iter()
        .map(|line| {
            let record: Value = serde_json::from_str(line).unwrap();
            record["msg"].as_str().unwrap().to_owned()
        })
        .collect()
}

async fn user(path: web::Path<u32>) -> HttpResponse {
    HttpResponse::Ok().body(format!("user {}", path.into_inner()))
}

async fn explode() -> HttpResponse {
    panic!("storage offline");
}

/// Handlers that do not panic are served normally behind Recovery,
/// including routes that extract path parameters
#[actix_web::test]
async fn test_recovery_passes_through_healthy_routes() {
    let (logger, buffer) = capture();
    let app = test::init_service(
        App::new()
            .wrap(Recovery::new().with_logger(Arc::clone(&logger)))
            .route("/users/{id}", web::get().to(user))
            .route("/ping", web::get().to(|| async { HttpResponse::Ok().body("pong") })),
    )
    .await;

    for _ in 0..3 {
        let request = test::TestRequest::get().uri("/users/42").to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(test::read_body(response).await, "user 42");
    }

    let request = test::TestRequest::get().uri("/ping").to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    assert!(buffer.is_empty(), "unexpected records: {:?}", buffer.lines());
}

/// The full stack logs the panic, then the 500 access line, and keeps serving
#[actix_web::test]
async fn test_recovery_under_request_logger() {
    let (logger, buffer) = capture();
    let app = test::init_service(
        App::new()
            .wrap(Recovery::new().with_logger(Arc::clone(&logger)))
            .wrap(RequestLogger::new(["/health"]).with_logger(Arc::clone(&logger)))
            .route("/explode", web::get().to(explode))
            .route("/users/{id}", web::get().to(user))
            .route("/health", web::get().to(|| async { HttpResponse::Ok().finish() })),
    )
    .await;

    let request = test::TestRequest::get().uri("/explode").to_request();
    let err = test::try_call_service(&app, request).await.unwrap_err();
    assert_eq!(err.error_response().status(), StatusCode::INTERNAL_SERVER_ERROR);

    let request = test::TestRequest::get().uri("/users/7").to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let request = test::TestRequest::get().uri("/health").to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let messages = messages(&buffer);
    assert_eq!(messages.len(), 3, "unexpected records: {messages:?}");
    assert!(messages[0].starts_with("panic recovered: storage offline\n"));
    assert!(messages[1].starts_with(" 500 | "));
    assert!(messages[1].ends_with("GET \"/explode\""));
    assert!(messages[2].starts_with(" 200 | "));
    assert!(messages[2].ends_with("GET \"/users/7\""));
}
