use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use sqlx::{sqlite::SqliteRow, FromRow, SqlitePool};
use std::marker::PhantomData;

use crate::database::manager::DatabaseError;

/// A concrete record type persisted in its own table.
///
/// `Input` is the body accepted on create; `Changes` carries the optional
/// fields accepted on update and is merged onto the stored record.
#[async_trait]
pub trait Model: for<'r> FromRow<'r, SqliteRow> + Serialize + Send + Sync + Unpin + 'static {
    const TABLE: &'static str;
    const SCHEMA: &'static str;

    type Input: DeserializeOwned + Send;
    type Changes: DeserializeOwned + Send;

    /// Insert a new row and return its assigned id.
    async fn insert(pool: &SqlitePool, input: Self::Input) -> Result<i64, sqlx::Error>;

    fn merge(&mut self, changes: Self::Changes);

    /// Write every mutable column back to the row with this record's id.
    async fn save(&self, pool: &SqlitePool) -> Result<(), sqlx::Error>;
}

pub struct Collection<M> {
    pool: SqlitePool,
    _phantom: PhantomData<fn() -> M>,
}

impl<M: Model> Collection<M> {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            _phantom: PhantomData,
        }
    }

    pub async fn select_all(&self) -> Result<Vec<M>, DatabaseError> {
        let sql = format!("SELECT * FROM {} ORDER BY id", M::TABLE);
        Ok(sqlx::query_as::<_, M>(&sql).fetch_all(&self.pool).await?)
    }

    pub async fn select_one(&self, id: i64) -> Result<Option<M>, DatabaseError> {
        let sql = format!("SELECT * FROM {} WHERE id = ?", M::TABLE);
        Ok(sqlx::query_as::<_, M>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn select_404(&self, id: i64) -> Result<M, DatabaseError> {
        self.select_one(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("{} {} not found", M::TABLE, id)))
    }

    pub async fn insert(&self, input: M::Input) -> Result<M, DatabaseError> {
        let id = M::insert(&self.pool, input).await?;
        self.select_404(id).await
    }

    /// Returns `None` when no record has this id.
    pub async fn update_one(&self, id: i64, changes: M::Changes) -> Result<Option<M>, DatabaseError> {
        let Some(mut record) = self.select_one(id).await? else {
            tracing::debug!("Skipping update of missing {} {}", M::TABLE, id);
            return Ok(None);
        };

        record.merge(changes);
        record.save(&self.pool).await?;
        Ok(Some(record))
    }

    pub async fn delete_one(&self, id: i64) -> Result<u64, DatabaseError> {
        let sql = format!("DELETE FROM {} WHERE id = ?", M::TABLE);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    pub async fn create_table(&self) -> Result<(), DatabaseError> {
        sqlx::query(M::SCHEMA).execute(&self.pool).await?;
        Ok(())
    }
}

/// Type-erased CRUD capability the model router dispatches to.
///
/// Bodies cross this boundary as JSON so routing stays independent of the
/// concrete record type behind each collection name.
#[async_trait]
pub trait RecordStore: Send + Sync {
    fn name(&self) -> &'static str;

    async fn sync(&self) -> Result<(), DatabaseError>;

    async fn get_all(&self) -> Result<Vec<Value>, DatabaseError>;

    async fn get(&self, id: i64) -> Result<Option<Value>, DatabaseError>;

    async fn create(&self, body: Value) -> Result<Value, DatabaseError>;

    async fn update(&self, id: i64, body: Value) -> Result<Option<Value>, DatabaseError>;

    async fn delete(&self, id: i64) -> Result<u64, DatabaseError>;
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, DatabaseError> {
    serde_json::to_value(value).map_err(|e| DatabaseError::InvalidRecord(e.to_string()))
}

fn from_json<T: DeserializeOwned>(body: Value) -> Result<T, DatabaseError> {
    serde_json::from_value(body).map_err(|e| DatabaseError::InvalidRecord(e.to_string()))
}

#[async_trait]
impl<M: Model> RecordStore for Collection<M> {
    fn name(&self) -> &'static str {
        M::TABLE
    }

    async fn sync(&self) -> Result<(), DatabaseError> {
        self.create_table().await
    }

    async fn get_all(&self) -> Result<Vec<Value>, DatabaseError> {
        self.select_all().await?.iter().map(to_json).collect()
    }

    async fn get(&self, id: i64) -> Result<Option<Value>, DatabaseError> {
        self.select_one(id).await?.as_ref().map(to_json).transpose()
    }

    async fn create(&self, body: Value) -> Result<Value, DatabaseError> {
        let input = from_json::<M::Input>(body)?;
        to_json(&self.insert(input).await?)
    }

    async fn update(&self, id: i64, body: Value) -> Result<Option<Value>, DatabaseError> {
        let changes = from_json::<M::Changes>(body)?;
        self.update_one(id, changes)
            .await?
            .as_ref()
            .map(to_json)
            .transpose()
    }

    async fn delete(&self, id: i64) -> Result<u64, DatabaseError> {
        self.delete_one(id).await
    }
}
