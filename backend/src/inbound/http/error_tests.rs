//! Tests for HTTP error mapping.

use actix_web::body::to_bytes;
use actix_web::App;
use actix_web::test::{self};
use rstest::{fixture, rstest};
use serde::Deserialize;
use serde_json::{Value, json};

use super::*;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[derive(Debug, Deserialize)]
struct Envelope {
    success: bool,
    error: Error,
}

#[fixture]
fn internal_error() -> Error {
    Error::internal("connection string leaked")
        .with_trace_id(TRACE_ID)
        .with_details(json!({ "secret": "x" }))
}

async fn decode(response: HttpResponse) -> Envelope {
    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    serde_json::from_slice(&bytes).expect("error envelope deserialises")
}

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("no token"), StatusCode::UNAUTHORIZED)]
#[case(Error::forbidden("denied"), StatusCode::FORBIDDEN)]
#[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
#[case(Error::conflict("stale"), StatusCode::CONFLICT)]
#[case(Error::service_unavailable("down"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] error: Error, #[case] expected: StatusCode) {
    assert_eq!(ResponseError::status_code(&error), expected);
}

#[rstest]
#[actix_web::test]
async fn internal_errors_are_redacted(internal_error: Error) {
    let response = ResponseError::error_response(&internal_error);
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response
            .headers()
            .get(TRACE_ID_HEADER)
            .and_then(|v| v.to_str().ok()),
        Some(TRACE_ID)
    );

    let envelope = decode(response).await;
    assert!(!envelope.success);
    assert_eq!(envelope.error.message(), "Internal server error");
    assert_eq!(envelope.error.trace_id(), Some(TRACE_ID));
    assert!(envelope.error.details().is_none());
}

#[rstest]
#[actix_web::test]
async fn client_errors_keep_details() {
    let error = Error::conflict("insufficient stock")
        .with_details(json!({ "productId": "p-1", "available": 2 }));

    let envelope = decode(ResponseError::error_response(&error)).await;

    assert_eq!(envelope.error.code(), ErrorCode::Conflict);
    assert_eq!(
        envelope.error.details(),
        Some(&json!({ "productId": "p-1", "available": 2 }))
    );
}

#[rstest]
#[actix_web::test]
async fn malformed_json_becomes_invalid_request() {
    let app = test::init_service(App::new().app_data(json_config()).route(
        "/",
        web::post().to(|body: web::Json<Value>| async move { HttpResponse::Ok().json(body.0) }),
    ))
    .await;
    let req = test::TestRequest::post()
        .uri("/")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();

    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body.pointer("/success"), Some(&json!(false)));
    assert_eq!(
        body.pointer("/error/code").and_then(Value::as_str),
        Some("invalid_request")
    );
    assert_eq!(
        body.pointer("/error/details/field").and_then(Value::as_str),
        Some("body")
    );
}

#[rstest]
#[actix_web::test]
async fn malformed_query_becomes_invalid_request() {
    #[derive(Deserialize)]
    struct Paging {
        #[expect(dead_code, reason = "only deserialisation is exercised")]
        page: u32,
    }

    let app = test::init_service(App::new().app_data(query_config()).route(
        "/",
        web::get().to(|_query: web::Query<Paging>| async { HttpResponse::Ok().finish() }),
    ))
    .await;

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/?page=minus-one").to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
