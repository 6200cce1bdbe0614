//! In-memory document store for testing and development.

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use async_trait::async_trait;
use serde_json::Value;

use super::{
    CategoryStats, Collection, DeleteResult, Document, DocumentId, Filter, ID_FIELD,
    InsertOneResult, Store, StoreError, UpdateResult, numeric,
};

/// Collections kept as insertion-ordered vectors behind one lock.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<Collection, Vec<Document>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(
        &self,
        f: impl FnOnce(&HashMap<Collection, Vec<Document>>) -> T,
    ) -> Result<T, StoreError> {
        let guard = self
            .collections
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))?;
        Ok(f(&guard))
    }

    fn write<T>(
        &self,
        f: impl FnOnce(&mut HashMap<Collection, Vec<Document>>) -> T,
    ) -> Result<T, StoreError> {
        let mut guard = self
            .collections
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))?;
        Ok(f(&mut guard))
    }
}

fn id_of(doc: &Document) -> Option<&str> {
    doc.get(ID_FIELD).and_then(Value::as_str)
}

#[async_trait]
impl Store for MemoryStore {
    async fn find(&self, collection: Collection, filter: Filter) -> Result<Vec<Document>, StoreError> {
        self.read(|c| {
            c.get(&collection)
                .map(|docs| docs.iter().filter(|d| filter.matches(d)).cloned().collect())
                .unwrap_or_default()
        })
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: Filter,
    ) -> Result<Option<Document>, StoreError> {
        self.read(|c| {
            c.get(&collection)
                .and_then(|docs| docs.iter().find(|d| filter.matches(d)).cloned())
        })
    }

    async fn insert_one(
        &self,
        collection: Collection,
        mut doc: Document,
    ) -> Result<InsertOneResult, StoreError> {
        let id = DocumentId::new();
        doc.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
        self.write(|c| c.entry(collection).or_default().push(doc))?;
        Ok(InsertOneResult {
            acknowledged: true,
            inserted_id: id,
        })
    }

    async fn update_one(
        &self,
        collection: Collection,
        id: DocumentId,
        set: Document,
    ) -> Result<UpdateResult, StoreError> {
        let filter = Filter::Id(id);
        self.write(|c| {
            let Some(doc) = c
                .get_mut(&collection)
                .and_then(|docs| docs.iter_mut().find(|d| filter.matches(d)))
            else {
                return UpdateResult::new(0, 0);
            };

            let mut modified = false;
            for (field, value) in set {
                if field == ID_FIELD {
                    continue;
                }
                if doc.get(&field) != Some(&value) {
                    doc.insert(field, value);
                    modified = true;
                }
            }
            UpdateResult::new(1, u64::from(modified))
        })
    }

    async fn delete_one(&self, collection: Collection, id: DocumentId) -> Result<DeleteResult, StoreError> {
        self.delete_many(collection, &[id]).await.map(|r| DeleteResult::new(r.deleted_count.min(1)))
    }

    async fn delete_many(
        &self,
        collection: Collection,
        ids: &[DocumentId],
    ) -> Result<DeleteResult, StoreError> {
        let ids: Vec<String> = ids.iter().map(DocumentId::to_string).collect();
        self.write(|c| {
            let Some(docs) = c.get_mut(&collection) else {
                return DeleteResult::new(0);
            };
            let before = docs.len();
            docs.retain(|d| !id_of(d).is_some_and(|id| ids.iter().any(|x| x == id)));
            DeleteResult::new((before - docs.len()) as u64)
        })
    }

    async fn estimated_count(&self, collection: Collection) -> Result<u64, StoreError> {
        self.read(|c| c.get(&collection).map_or(0, Vec::len) as u64)
    }

    async fn total_revenue(&self) -> Result<f64, StoreError> {
        self.read(|c| {
            c.get(&Collection::Payments)
                .map(|docs| docs.iter().map(|d| numeric(d.get("price"))).sum())
                .unwrap_or(0.0)
        })
    }

    async fn order_stats(&self) -> Result<Vec<CategoryStats>, StoreError> {
        self.read(|c| {
            let empty = Vec::new();
            let menu = c.get(&Collection::Menu).unwrap_or(&empty);
            let payments = c.get(&Collection::Payments).unwrap_or(&empty);

            let mut rows: Vec<CategoryStats> = Vec::new();
            let menu_ids = payments
                .iter()
                .filter_map(|p| p.get("menuIds").and_then(Value::as_array))
                .flatten()
                .filter_map(Value::as_str);

            for menu_id in menu_ids {
                let Some(item) = menu
                    .iter()
                    .find(|m| id_of(m).is_some_and(|id| id.eq_ignore_ascii_case(menu_id))) else {
                    continue;
                };
                let category = item.get("category").cloned().unwrap_or(Value::Null);
                let price = numeric(item.get("price"));
                match rows.iter_mut().find(|r| r.category == category) {
                    Some(row) => {
                        row.quantity += 1;
                        row.revenue += price;
                    }
                    None => rows.push(CategoryStats {
                        category,
                        quantity: 1,
                        revenue: price,
                    }),
                }
            }

            rows.sort_by_key(|r| r.category.to_string());
            rows
        })
    }

    async fn close(&self) {}
}
