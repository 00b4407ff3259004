// Handler behaviour against a mocked document store
// These tests verify:
// 1. Store failures become generic plain-text 500s without leaking details
// 2. Update/delete on a missing document never attempt a write
// 3. A document removed between the existence check and the write yields 404

use async_trait::async_trait;
use axum::http::StatusCode;
use eventos_api::database::{DocumentStore, StoreError};
use eventos_api::models::{Document, Fields};
use mockall::mock;
use serde_json::{json, Value};
use std::sync::Arc;

use test_helpers::*;

mock! {
    pub Store {}

    #[async_trait]
    impl DocumentStore for Store {
        async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError>;
        async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;
        async fn add(&self, collection: &str, fields: Fields) -> Result<String, StoreError>;
        async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError>;
        async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;
    }
}

fn unavailable() -> StoreError {
    StoreError::Status {
        status: 503,
        body: "backend unavailable: secret-internal-detail".to_string(),
    }
}

fn existing(id: &str) -> Document {
    Document {
        id: id.to_string(),
        fields: fields(json!({"title": "Existing"})),
    }
}

#[tokio::test]
async fn test_list_failure_returns_500_text() {
    let mut store = MockStore::new();
    store.expect_list().times(1).returning(|_| Err(unavailable()));
    let server = test_server(Arc::new(store));

    let response = server.get("/content").await;
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.text(), "Erro ao obter eventos");
}

#[tokio::test]
async fn test_list_uses_eventos_collection() {
    let mut store = MockStore::new();
    store
        .expect_list()
        .withf(|collection| collection.to_string() == "eventos")
        .times(1)
        .returning(|_| Ok(vec![existing("a1")]));
    let server = test_server(Arc::new(store));

    let response = server.get("/content").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.json::<Value>(),
        json!([{"title": "Existing", "id": "a1"}])
    );
}

#[tokio::test]
async fn test_add_failure_returns_500_text() {
    let mut store = MockStore::new();
    store.expect_add().times(1).returning(|_, _| Err(unavailable()));
    let server = test_server(Arc::new(store));

    let response = server.post("/contents").json(&json!({"title": "x"})).await;
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.text(), "Erro ao adicionar evento");
}

#[tokio::test]
async fn test_update_missing_document_never_writes() {
    let mut store = MockStore::new();
    store.expect_get().times(1).returning(|_, _| Ok(None));
    store.expect_update().never();
    let server = test_server(Arc::new(store));

    let response = server.put("/content/ghost").json(&json!({"title": "x"})).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_without_id_never_touches_store() {
    // No expectations: any store call would panic.
    let server = test_server(Arc::new(MockStore::new()));

    let response = server.put("/content/").json(&json!({"title": "x"})).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_sends_stripped_fields() {
    let mut store = MockStore::new();
    store
        .expect_get()
        .times(1)
        .returning(|_, id| Ok(Some(existing(id))));
    store
        .expect_update()
        .withf(|_, id, fields| {
            id.to_string() == "evt1"
                && !fields.contains_key("id")
                && fields.get("title") == Some(&json!("New"))
        })
        .times(1)
        .returning(|_, _, _| Ok(()));
    let server = test_server(Arc::new(store));

    let response = server
        .put("/content/evt1")
        .json(&json!({"id": "other", "title": "New"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_update_lookup_failure_returns_500_text() {
    let mut store = MockStore::new();
    store.expect_get().times(1).returning(|_, _| Err(unavailable()));
    store.expect_update().never();
    let server = test_server(Arc::new(store));

    let response = server.put("/content/evt1").json(&json!({"title": "x"})).await;
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.text(), "Erro ao atualizar evento");
}

#[tokio::test]
async fn test_update_racing_delete_returns_404() {
    let mut store = MockStore::new();
    store
        .expect_get()
        .times(1)
        .returning(|_, id| Ok(Some(existing(id))));
    store
        .expect_update()
        .times(1)
        .returning(|_, id, _| Err(StoreError::NotFound(id.to_string())));
    let server = test_server(Arc::new(store));

    let response = server.put("/content/evt1").json(&json!({"title": "x"})).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.json::<Value>(),
        json!({"message": "Evento não encontrado."})
    );
}

#[tokio::test]
async fn test_delete_missing_document_never_deletes() {
    let mut store = MockStore::new();
    store.expect_get().times(1).returning(|_, _| Ok(None));
    store.expect_delete().never();
    let server = test_server(Arc::new(store));

    let response = server.delete("/content/ghost").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_failure_returns_500_text() {
    let mut store = MockStore::new();
    store
        .expect_get()
        .times(1)
        .returning(|_, id| Ok(Some(existing(id))));
    store.expect_delete().times(1).returning(|_, _| Err(unavailable()));
    let server = test_server(Arc::new(store));

    let response = server.delete("/content/evt1").await;
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.text(), "Erro ao excluir evento");
}
