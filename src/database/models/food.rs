use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use crate::database::collection::Model;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Food {
    pub id: i64,
    pub name: String,
    pub calories: i64,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Deserialize)]
pub struct NewFood {
    pub name: String,
    pub calories: i64,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct FoodChanges {
    pub name: Option<String>,
    pub calories: Option<i64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[async_trait]
impl Model for Food {
    const TABLE: &'static str = "food";
    const SCHEMA: &'static str = r#"
        CREATE TABLE IF NOT EXISTS food (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            calories INTEGER NOT NULL,
            "type" TEXT NOT NULL
        )
    "#;

    type Input = NewFood;
    type Changes = FoodChanges;

    async fn insert(pool: &SqlitePool, input: NewFood) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(r#"INSERT INTO food (name, calories, "type") VALUES (?, ?, ?)"#)
            .bind(input.name)
            .bind(input.calories)
            .bind(input.kind)
            .execute(pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    fn merge(&mut self, changes: FoodChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(calories) = changes.calories {
            self.calories = calories;
        }
        if let Some(kind) = changes.kind {
            self.kind = kind;
        }
    }

    async fn save(&self, pool: &SqlitePool) -> Result<(), sqlx::Error> {
        sqlx::query(r#"UPDATE food SET name = ?, calories = ?, "type" = ? WHERE id = ?"#)
            .bind(&self.name)
            .bind(self.calories)
            .bind(&self.kind)
            .bind(self.id)
            .execute(pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_leaves_unspecified_fields_alone() {
        let mut food = Food {
            id: 1,
            name: "banana".to_string(),
            calories: 100,
            kind: "fruit".to_string(),
        };

        food.merge(FoodChanges {
            calories: Some(90),
            ..Default::default()
        });

        assert_eq!(food.name, "banana");
        assert_eq!(food.calories, 90);
        assert_eq!(food.kind, "fruit");
    }

    #[test]
    fn type_field_uses_wire_name() {
        let food = Food {
            id: 7,
            name: "apple".to_string(),
            calories: 100,
            kind: "fruit".to_string(),
        };
        let value = serde_json::to_value(&food).unwrap();
        assert_eq!(value["type"], "fruit");
        assert!(value.get("kind").is_none());
    }
}
