/*
 * Responsibility
 * - drinks CRUD
 * - recipe is stored as a JSON text column and decoded on the way out
 * - title is UNIQUE: duplicate inserts/updates surface as RepoError::Conflict
 */
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::repos::error::RepoError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DrinkRow {
    pub id: i32,
    pub title: String,
    pub recipe: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub color: String,
    pub parts: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Drink {
    pub id: i32,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

impl TryFrom<DrinkRow> for Drink {
    type Error = RepoError;

    fn try_from(row: DrinkRow) -> Result<Self, Self::Error> {
        let recipe = serde_json::from_str(&row.recipe).map_err(|source| {
            RepoError::CorruptRecipe {
                id: row.id,
                source,
            }
        })?;

        Ok(Self {
            id: row.id,
            title: row.title,
            recipe,
        })
    }
}

fn encode_recipe(recipe: &[Ingredient]) -> Result<String, RepoError> {
    serde_json::to_string(recipe).map_err(RepoError::EncodeRecipe)
}

pub async fn list(pool: &PgPool) -> Result<Vec<Drink>, RepoError> {
    let rows = sqlx::query_as::<_, DrinkRow>(
        r#"
        SELECT id, title, recipe
        FROM drinks
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Drink::try_from).collect()
}

pub async fn create(pool: &PgPool, title: &str, recipe: &[Ingredient]) -> Result<Drink, RepoError> {
    let row = sqlx::query_as::<_, DrinkRow>(
        r#"
        INSERT INTO drinks (title, recipe)
        VALUES ($1, $2)
        RETURNING id, title, recipe
        "#,
    )
    .bind(title)
    .bind(encode_recipe(recipe)?)
    .fetch_one(pool)
    .await
    .map_err(RepoError::from_sqlx)?;

    Drink::try_from(row)
}

/// Update only the supplied fields. `Ok(None)` when the drink does not exist.
pub async fn update(
    pool: &PgPool,
    id: i32,
    title: Option<&str>,
    recipe: Option<&[Ingredient]>,
) -> Result<Option<Drink>, RepoError> {
    let row = sqlx::query_as::<_, DrinkRow>(
        r#"
        UPDATE drinks
        SET
            title = COALESCE($2, title),
            recipe = COALESCE($3, recipe)
        WHERE id = $1
        RETURNING id, title, recipe
        "#,
    )
    .bind(id)
    .bind(title)
    .bind(recipe.map(encode_recipe).transpose()?)
    .fetch_optional(pool)
    .await
    .map_err(RepoError::from_sqlx)?;

    row.map(Drink::try_from).transpose()
}

pub async fn delete(pool: &PgPool, id: i32) -> Result<bool, RepoError> {
    let result = sqlx::query(
        r#"
        DELETE FROM drinks
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
