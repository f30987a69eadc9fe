//! Contract tests for `RestMenuStore` against a wiremock PostgREST stand-in.

use serde_json::json;
use steppe_core::NormalizedMenuItem;
use steppe_db::{replace_all, DbError, MenuStore, RestMenuStore, WriteStage};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SERVICE_KEY: &str = "service-role-key";

fn store(server: &MockServer) -> RestMenuStore {
    RestMenuStore::new(&server.uri(), SERVICE_KEY, 5, "steppe-test/0.1")
        .expect("store construction should not fail")
}

fn cola() -> NormalizedMenuItem {
    NormalizedMenuItem {
        iiko_id: "1".to_string(),
        name: Some("Cola".to_string()),
        description: None,
        price: Some(150.0),
        image_id: None,
        categories: vec!["Drinks".to_string()],
    }
}

#[tokio::test]
async fn delete_all_filters_every_row_with_service_key() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/menu_items"))
        .and(query_param("id", "not.is.null"))
        .and(header("apikey", SERVICE_KEY))
        .and(header("authorization", "Bearer service-role-key"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    store(&server).delete_all().await.expect("delete should succeed");
}

#[tokio::test]
async fn delete_all_error_status_is_rest_error() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/menu_items"))
        .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"message":"Invalid API key"}"#))
        .mount(&server)
        .await;

    let err = store(&server).delete_all().await.unwrap_err();
    assert!(
        matches!(err, DbError::Rest { status: 401, ref body } if body.contains("Invalid API key")),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn insert_batch_posts_rows_and_counts_representation() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/menu_items"))
        .and(header("prefer", "return=representation"))
        .and(body_json(json!([{
            "iiko_id": "1",
            "name": "Cola",
            "description": null,
            "price": 150.0,
            "image_id": null,
            "categories": ["Drinks"]
        }])))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            { "id": 7, "iiko_id": "1", "name": "Cola" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let confirmed = store(&server).insert_batch(&[cola()]).await.unwrap();
    assert_eq!(confirmed, Some(1));
}

#[tokio::test]
async fn insert_batch_empty_body_is_unconfirmed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/menu_items"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let confirmed = store(&server).insert_batch(&[cola()]).await.unwrap();
    assert_eq!(confirmed, None);
}

#[tokio::test]
async fn ping_selects_one_id() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/menu_items"))
        .and(query_param("select", "id"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    store(&server).ping().await.expect("ping should succeed");
}

#[tokio::test]
async fn replace_all_insert_conflict_leaves_table_cleared() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/menu_items"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/menu_items"))
        .respond_with(ResponseTemplate::new(409).set_body_string(
            r#"{"code":"23505","message":"duplicate key value violates unique constraint"}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let err = replace_all(&store(&server), &[cola(), cola()]).await.unwrap_err();
    assert_eq!(err.stage, WriteStage::Insert);
    assert!(matches!(err.source, DbError::Rest { status: 409, .. }));
}

#[tokio::test]
async fn replace_all_with_no_records_only_deletes() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/menu_items"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let written = replace_all(&store(&server), &[]).await.unwrap();
    assert_eq!(written, 0);
}
