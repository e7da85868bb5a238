//! HTTP middleware example
//!
//! Serves two routes behind the request logger and panic recovery.
//! `GET /panic` answers 500 and logs the panic; `/health` is not logged.
//!
//! Run with: cargo run --example http_logging --features actix

use actix_web::{web, App, HttpResponse, HttpServer};
use fslog::http::{Recovery, RequestLogger};

async fn hello() -> HttpResponse {
    HttpResponse::Ok().body("hello")
}

async fn explode() -> HttpResponse {
    panic!("handler failed")
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    fslog::info("listening on http://127.0.0.1:8080");

    HttpServer::new(|| {
        App::new()
            .wrap(Recovery::new())
            .wrap(RequestLogger::new(["/health"]))
            .route("/", web::get().to(hello))
            .route("/panic", web::get().to(explode))
            .route("/health", web::get().to(|| async { HttpResponse::Ok().finish() }))
    })
    .bind(("127.0.0.1", 8080))?
    .run()
    .await
}
