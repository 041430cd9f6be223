use actix_web::test;
use serde_json::Value;

use crate::support::{build_test_state, create_test_app};

#[actix_web::test]
async fn healthy_memory_store() {
    let (state, _) = build_test_state().await;
    let app = create_test_app(state).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"], "memory");
    assert_eq!(body["store_status"], "ok");
    assert_eq!(body["observers"], 0);
    assert!(body.get("store_error").is_none());
    assert!(body["app_version"].is_string());
}

#[actix_web::test]
async fn store_outage_reports_degraded() {
    let (state, store) = build_test_state().await;
    let app = create_test_app(state).await;
    store.set_available(false);

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["store_status"], "error");
    assert!(body["store_error"].is_string());
}
