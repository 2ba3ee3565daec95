use super::*;
use crate::backends::traits::ObjectStorage;
use crate::models::{ObjectKey, PageCursor};
use crate::utils::errors::RosterError;
use mockito::{Matcher, Server};
use serde_json::json;

const QUERY_PATH: &str = "/v1/projects/test-project/databases/(default)/documents:runQuery";
const COLLECTION_PATH: &str = "/v1/projects/test-project/databases/(default)/documents/players";

fn create_test_store(server: &Server) -> FirestoreStore {
    let api = FirestoreApi::new(
        server.url(),
        "test-project",
        "players",
        Some("test_key".to_string()),
    )
    .unwrap();
    FirestoreStore::with_api(api, Duration::from_millis(20))
}

fn document(id: &str, name: &str, age: i64) -> serde_json::Value {
    json!({
        "name": format!("projects/test-project/databases/(default)/documents/players/{}", id),
        "fields": {
            "name": { "stringValue": name },
            "lastName": { "stringValue": "Test" },
            "age": { "integerValue": age.to_string() }
        },
        "createTime": "2025-01-01T00:00:00Z",
        "updateTime": "2025-01-01T00:00:00Z"
    })
}

fn query_response(docs: &[serde_json::Value]) -> String {
    let items: Vec<_> = docs
        .iter()
        .map(|d| json!({ "document": d, "readTime": "2025-01-01T00:00:00Z" }))
        .collect();
    serde_json::Value::Array(items).to_string()
}

#[tokio::test]
async fn test_fetch_first_page() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("POST", QUERY_PATH)
        .match_query(Matcher::UrlEncoded("key".into(), "test_key".into()))
        .match_body(Matcher::PartialJson(json!({
            "structuredQuery": {
                "from": [{ "collectionId": "players" }],
                "limit": 2
            }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(query_response(&[
            document("a1", "Ayo", 25),
            document("b2", "Coby", 24),
        ]))
        .create_async()
        .await;

    let store = create_test_store(&server);
    let page = store.fetch_page(&PageQuery::first(2)).await.unwrap();

    assert_eq!(page.len(), 2);
    assert_eq!(page[0].id.as_str(), "a1");
    assert_eq!(page[1].record.name, "Coby");
    assert_eq!(page[1].record.age, 24);
}

#[tokio::test]
async fn test_continuation_sends_start_after_cursor() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("POST", QUERY_PATH)
        .match_query(Matcher::Any)
        .match_body(Matcher::PartialJson(json!({
            "structuredQuery": {
                "startAt": {
                    "values": [
                        { "stringValue": "Coby" },
                        { "referenceValue": "projects/test-project/databases/(default)/documents/players/b2" }
                    ],
                    "before": false
                }
            }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(query_response(&[document("c3", "Josh", 23)]))
        .create_async()
        .await;

    let store = create_test_store(&server);
    let last = Player::new(
        "b2",
        PlayerRecord {
            name: "Coby".to_string(),
            ..Default::default()
        },
    );
    let page = store
        .fetch_page(&PageQuery::after(PageCursor::after(&last), 10))
        .await
        .unwrap();

    assert_eq!(page.len(), 1);
    assert_eq!(page[0].record.name, "Josh");
}

#[tokio::test]
async fn test_empty_query_result() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("POST", QUERY_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!([{ "readTime": "2025-01-01T00:00:00Z" }]).to_string())
        .create_async()
        .await;

    let store = create_test_store(&server);
    assert!(store.fetch_page(&PageQuery::first(10)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_query_error_is_backend_error() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("POST", QUERY_PATH)
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("unavailable")
        .create_async()
        .await;

    let store = create_test_store(&server);
    let err = store.fetch_page(&PageQuery::first(10)).await.unwrap_err();
    assert!(matches!(err, RosterError::Backend(_)));
}

#[tokio::test]
async fn test_create_returns_assigned_id() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("POST", COLLECTION_PATH)
        .match_query(Matcher::Any)
        .match_body(Matcher::PartialJson(json!({
            "fields": { "name": { "stringValue": "Noa" }, "age": { "integerValue": "19" } }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(document("newid", "Noa", 19).to_string())
        .create_async()
        .await;

    let store = create_test_store(&server);
    let record = PlayerRecord {
        name: "Noa".to_string(),
        age: 19,
        ..Default::default()
    };
    let id = store.create(&record).await.unwrap();
    assert_eq!(id.as_str(), "newid");
}

#[tokio::test]
async fn test_update_requires_existing_document() {
    let mut server = Server::new_async().await;
    // Repeated mask params: match each entry in the raw query string.
    let mock = server
        .mock("PATCH", format!("{}/gone", COLLECTION_PATH).as_str())
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("currentDocument.exists".into(), "true".into()),
            Matcher::Regex(r"(^|&)updateMask\.fieldPaths=name(&|$)".into()),
            Matcher::Regex(r"(^|&)updateMask\.fieldPaths=age(&|$)".into()),
        ]))
        .with_status(404)
        .with_body(json!({ "error": { "code": 404, "status": "NOT_FOUND" } }).to_string())
        .create_async()
        .await;

    let store = create_test_store(&server);
    let err = store
        .update(&PlayerId::new("gone"), &PlayerRecord::default())
        .await
        .unwrap_err();
    assert!(matches!(err, RosterError::NotFound(_)));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_set_media_reference_masks_single_field() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PATCH", format!("{}/a1", COLLECTION_PATH).as_str())
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("updateMask.fieldPaths".into(), "headshot".into()),
            Matcher::UrlEncoded("key".into(), "test_key".into()),
        ]))
        .match_body(Matcher::Json(json!({
            "fields": { "headshot": { "stringValue": "https://cdn/x.jpg" } }
        })))
        .with_status(200)
        .with_body(document("a1", "Ayo", 25).to_string())
        .create_async()
        .await;

    let store = create_test_store(&server);
    store
        .set_media_reference(&PlayerId::new("a1"), MediaKind::Photo, "https://cdn/x.jpg")
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_get_missing_document_is_none() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", format!("{}/nope", COLLECTION_PATH).as_str())
        .match_query(Matcher::Any)
        .with_status(404)
        .create_async()
        .await;

    let store = create_test_store(&server);
    assert!(store.get(&PlayerId::new("nope")).await.unwrap().is_none());
}

#[tokio::test]
async fn test_watch_polls_first_page() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("POST", QUERY_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(query_response(&[document("a1", "Ayo", 25)]))
        .expect_at_least(2)
        .create_async()
        .await;

    let store = create_test_store(&server);
    let mut watch = store.watch_first_page(10).await.unwrap();
    let first = watch.next().await.unwrap().unwrap();
    assert_eq!(first.len(), 1);

    // Unchanged pages are not re-delivered
    let next = tokio::time::timeout(Duration::from_millis(120), watch.next()).await;
    assert!(next.is_err());
    watch.close();
}

#[tokio::test]
async fn test_storage_upload_builds_download_url() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v0/b/test-bucket/o")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("uploadType".into(), "media".into()),
            Matcher::UrlEncoded("name".into(), "players/photos/coby_1.jpg".into()),
        ]))
        .match_header("content-type", "image/jpeg")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "name": "players/photos/coby_1.jpg",
                "bucket": "test-bucket",
                "downloadTokens": "tok-1,tok-2"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let storage = FirebaseStorage::new(server.url(), "test-bucket").unwrap();
    let url = storage
        .upload(&ObjectKey::new("players/photos/coby_1.jpg"), vec![1, 2, 3], "image/jpeg")
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(
        url,
        format!(
            "{}/v0/b/test-bucket/o/players%2Fphotos%2Fcoby_1.jpg?alt=media&token=tok-1",
            server.url()
        )
    );
}

#[tokio::test]
async fn test_storage_permission_error() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("POST", "/v0/b/test-bucket/o")
        .match_query(Matcher::Any)
        .with_status(403)
        .with_body("denied")
        .create_async()
        .await;

    let storage = FirebaseStorage::new(server.url(), "test-bucket").unwrap();
    let err = storage
        .upload(&ObjectKey::new("players/videos/a.mp4"), vec![], "video/mp4")
        .await
        .unwrap_err();
    assert!(matches!(err, RosterError::PermissionDenied(_)));
}

#[test]
fn test_storage_requires_bucket() {
    assert!(matches!(
        FirebaseStorage::new("http://localhost", ""),
        Err(RosterError::Configuration(_))
    ));
}
