use sqlx::SqlitePool;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

use crate::database::collection::{Collection, Model, RecordStore};
use crate::database::manager::DatabaseError;
use crate::database::models::{Clothes, Food};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Invalid Model: {0}")]
    InvalidModel(String),
}

/// Maps a route-exposed model name to the store backing it.
#[derive(Clone, Default)]
pub struct CollectionRegistry {
    stores: BTreeMap<&'static str, Arc<dyn RecordStore>>,
}

impl CollectionRegistry {
    /// Registry with every collection this service exposes.
    pub fn standard(pool: &SqlitePool) -> Self {
        Self::default()
            .with::<Food>(pool)
            .with::<Clothes>(pool)
    }

    pub fn with<M: Model>(mut self, pool: &SqlitePool) -> Self {
        self.stores
            .insert(M::TABLE, Arc::new(Collection::<M>::new(pool.clone())));
        self
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<dyn RecordStore>, RegistryError> {
        self.stores
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::InvalidModel(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.stores.keys().copied()
    }

    /// Create any missing tables.
    pub async fn sync(&self) -> Result<(), DatabaseError> {
        for store in self.stores.values() {
            store.sync().await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn resolves_registered_names_only() {
        let registry = CollectionRegistry::standard(&memory_pool().await);

        assert_eq!(registry.resolve("food").unwrap().name(), "food");
        assert_eq!(registry.resolve("clothes").unwrap().name(), "clothes");
        assert!(matches!(
            registry.resolve("shoes"),
            Err(RegistryError::InvalidModel(name)) if name == "shoes"
        ));
        assert!(registry.resolve("users").is_err());
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["clothes", "food"]);
    }

    #[tokio::test]
    async fn sync_creates_every_table() {
        let pool = memory_pool().await;
        CollectionRegistry::standard(&pool).sync().await.unwrap();

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('food', 'clothes') ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        assert_eq!(tables, vec!["clothes".to_string(), "food".to_string()]);
    }
}
