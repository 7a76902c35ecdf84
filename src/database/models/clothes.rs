use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use crate::database::collection::Model;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Clothes {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub size: String,
}

#[derive(Debug, Deserialize)]
pub struct NewClothes {
    pub name: String,
    pub color: String,
    pub size: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClothesChanges {
    pub name: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
}

#[async_trait]
impl Model for Clothes {
    const TABLE: &'static str = "clothes";
    const SCHEMA: &'static str = r#"
        CREATE TABLE IF NOT EXISTS clothes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            color TEXT NOT NULL,
            size TEXT NOT NULL
        )
    "#;

    type Input = NewClothes;
    type Changes = ClothesChanges;

    async fn insert(pool: &SqlitePool, input: NewClothes) -> Result<i64, sqlx::Error> {
        let result = sqlx::query("INSERT INTO clothes (name, color, size) VALUES (?, ?, ?)")
            .bind(input.name)
            .bind(input.color)
            .bind(input.size)
            .execute(pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    fn merge(&mut self, changes: ClothesChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(color) = changes.color {
            self.color = color;
        }
        if let Some(size) = changes.size {
            self.size = size;
        }
    }

    async fn save(&self, pool: &SqlitePool) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE clothes SET name = ?, color = ?, size = ? WHERE id = ?")
            .bind(&self.name)
            .bind(&self.color)
            .bind(&self.size)
            .bind(self.id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
