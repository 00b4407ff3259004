use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{DocumentStore, StoreError};
use crate::models::{Document, Fields};

const AUTO_ID_LEN: usize = 20;

/// Process-local document store with the same semantics as the remote one.
///
/// Documents are listed in ascending id order, which is also the default
/// ordering of Firestore collection listings.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Fields>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a document under a caller-chosen id. Used to seed fixtures.
    pub async fn insert(&self, collection: &str, id: &str, fields: Fields) {
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields);
    }
}

fn auto_id() -> String {
    Uuid::new_v4().simple().to_string()[..AUTO_ID_LEN].to_string()
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| Document {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| Document {
                id: id.to_string(),
                fields: fields.clone(),
            }))
    }

    async fn add(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        let mut id = auto_id();
        while docs.contains_key(&id) {
            id = auto_id();
        }
        docs.insert(id.clone(), fields);
        Ok(id)
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let existing = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        for (key, value) in fields {
            existing.insert(key, value);
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(id))
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn add_assigns_unique_twenty_char_ids() {
        tokio_test::block_on(async {
            let store = InMemoryStore::new();
            let a = store.add("eventos", fields(json!({"n": 1}))).await.unwrap();
            let b = store.add("eventos", fields(json!({"n": 2}))).await.unwrap();
            assert_eq!(a.len(), 20);
            assert_ne!(a, b);
            assert_eq!(store.list("eventos").await.unwrap().len(), 2);
        });
    }

    #[tokio::test]
    async fn update_merges_fields() {
        let store = InMemoryStore::new();
        store
            .insert("eventos", "e1", fields(json!({"title": "Old", "place": "Hall"})))
            .await;

        store
            .update("eventos", "e1", fields(json!({"title": "New", "extra": true})))
            .await
            .unwrap();

        let doc = store.get("eventos", "e1").await.unwrap().unwrap();
        assert_eq!(
            Value::Object(doc.fields),
            json!({"title": "New", "place": "Hall", "extra": true})
        );
    }

    #[tokio::test]
    async fn update_and_delete_missing_documents_fail() {
        let store = InMemoryStore::new();
        assert!(matches!(
            store.update("eventos", "nope", Fields::new()).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.delete("eventos", "nope").await,
            Err(StoreError::NotFound(_))
        ));
        assert!(store.get("eventos", "nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn collections_are_isolated_and_listed_by_id() {
        let store = InMemoryStore::new();
        store.insert("eventos", "b", Fields::new()).await;
        store.insert("eventos", "a", Fields::new()).await;
        store.insert("other", "c", Fields::new()).await;

        let ids: Vec<String> = store
            .list("eventos")
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(store.list("missing").await.unwrap().is_empty());

        store.delete("eventos", "a").await.unwrap();
        assert_eq!(store.list("eventos").await.unwrap().len(), 1);
    }
}
