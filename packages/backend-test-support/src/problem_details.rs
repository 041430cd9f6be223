//! Assertions for the backend's `application/problem+json` error contract.
//!
//! Kept free of backend types so both unit and integration tests can use it.

use actix_web::body::MessageBody;
use actix_web::dev::ServiceResponse;
use actix_web::http::header::HeaderMap;
use actix_web::http::StatusCode;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ProblemDetailsLike {
    #[serde(rename = "type")]
    type_: String,
    title: String,
    status: u16,
    detail: String,
    code: String,
    trace_id: String,
}

/// Assert that a service response is a problem+json error with the given
/// code and status, and that its body trace id matches the `x-trace-id` header.
pub async fn assert_problem_details<B>(
    resp: ServiceResponse<B>,
    expected_code: &str,
    expected_status: StatusCode,
    expected_detail_contains: Option<&str>,
) where
    B: MessageBody,
{
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = actix_web::test::read_body(resp).await;

    assert_problem_details_from_parts(
        status,
        &headers,
        &body,
        expected_code,
        expected_status,
        expected_detail_contains,
    );
}

/// Same contract as [`assert_problem_details`], on already-extracted parts.
pub fn assert_problem_details_from_parts(
    status: StatusCode,
    headers: &HeaderMap,
    body_bytes: &[u8],
    expected_code: &str,
    expected_status: StatusCode,
    expected_detail_contains: Option<&str>,
) {
    assert_eq!(status, expected_status);

    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert_eq!(content_type, "application/problem+json");

    let problem: ProblemDetailsLike = serde_json::from_slice(body_bytes)
        .expect("response body should be valid ProblemDetails JSON");

    let trace_id_header = headers
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .expect("x-trace-id header should be present");
    assert_eq!(
        problem.trace_id, trace_id_header,
        "trace_id in body should match x-trace-id header"
    );

    assert_eq!(problem.code, expected_code);
    assert_eq!(problem.status, expected_status.as_u16());
    assert!(problem.type_.ends_with(expected_code));
    assert!(!problem.title.is_empty());

    if let Some(expected_detail) = expected_detail_contains {
        assert!(
            problem.detail.contains(expected_detail),
            "expected detail to contain '{}', got '{}'",
            expected_detail,
            problem.detail
        );
    }
}
