use std::collections::HashMap;

use crate::domain::attr::{AttrKind, RecipeAttr};
use crate::domain::error::DomainError;
use crate::domain::ingredient::Ingredient;
use crate::domain::recipe::{Recipe, RecipeChanges, RecipeFilter};
use crate::domain::tag::Tag;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{error, info};
use uuid::Uuid;

#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// Persists the recipe together with links to its tags and ingredients.
    async fn create(&self, recipe: Recipe) -> Result<Recipe, DomainError>;
    async fn find_by_id(&self, user_id: Uuid, id: Uuid) -> Result<Option<Recipe>, DomainError>;
    /// Newest first.
    async fn list(&self, user_id: Uuid, filter: RecipeFilter) -> Result<Vec<Recipe>, DomainError>;
    /// `Some` link lists replace the current links; `None` keeps them.
    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        changes: RecipeChanges,
        tag_ids: Option<Vec<Uuid>>,
        ingredient_ids: Option<Vec<Uuid>>,
    ) -> Result<Option<Recipe>, DomainError>;
    async fn set_image(
        &self,
        user_id: Uuid,
        id: Uuid,
        image: String,
    ) -> Result<Option<Recipe>, DomainError>;
    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, DomainError>;
}

#[derive(Clone)]
pub struct PostgresRecipeRepository {
    pool: PgPool,
}

impl PostgresRecipeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn attach<T: RecipeAttr>(
        &self,
        recipes: &[Recipe],
    ) -> Result<HashMap<Uuid, Vec<T>>, DomainError> {
        let ids: Vec<Uuid> = recipes.iter().map(|r| r.id).collect();
        let kind = T::KIND;
        let sql = format!(
            "SELECT l.recipe_id, a.id, a.user_id, a.name FROM {link} l \
             JOIN {table} a ON a.id = l.{col} \
             WHERE l.recipe_id = ANY($1) ORDER BY a.name, a.id",
            link = kind.link_table(),
            table = kind.table(),
            col = kind.link_column(),
        );
        let rows = sqlx::query_as::<_, (Uuid, Uuid, Uuid, String)>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("db error loading {} links: {}", kind.label(), e);
                DomainError::from(e)
            })?;

        let mut by_recipe: HashMap<Uuid, Vec<T>> = HashMap::new();
        for (recipe_id, id, user_id, name) in rows {
            by_recipe
                .entry(recipe_id)
                .or_default()
                .push(T::from_parts(id, user_id, name));
        }
        Ok(by_recipe)
    }

    async fn load_links(&self, mut recipes: Vec<Recipe>) -> Result<Vec<Recipe>, DomainError> {
        if recipes.is_empty() {
            return Ok(recipes);
        }
        let mut tags = self.attach::<Tag>(&recipes).await?;
        let mut ingredients = self.attach::<Ingredient>(&recipes).await?;
        for recipe in &mut recipes {
            recipe.tags = tags.remove(&recipe.id).unwrap_or_default();
            recipe.ingredients = ingredients.remove(&recipe.id).unwrap_or_default();
        }
        Ok(recipes)
    }
}

async fn replace_links(
    tx: &mut Transaction<'_, Postgres>,
    recipe_id: Uuid,
    kind: AttrKind,
    ids: Vec<Uuid>,
) -> Result<(), sqlx::Error> {
    sqlx::query(&format!("DELETE FROM {} WHERE recipe_id = $1", kind.link_table()))
        .bind(recipe_id)
        .execute(&mut **tx)
        .await?;
    insert_links(tx, recipe_id, kind, ids).await
}

async fn insert_links(
    tx: &mut Transaction<'_, Postgres>,
    recipe_id: Uuid,
    kind: AttrKind,
    ids: Vec<Uuid>,
) -> Result<(), sqlx::Error> {
    if ids.is_empty() {
        return Ok(());
    }
    let sql = format!(
        "INSERT INTO {} (recipe_id, {}) SELECT $1, UNNEST($2::uuid[]) ON CONFLICT DO NOTHING",
        kind.link_table(),
        kind.link_column()
    );
    sqlx::query(&sql)
        .bind(recipe_id)
        .bind(ids)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

const RECIPE_COLUMNS: &str =
    "id, user_id, title, time_minutes, price, description, link, image, created_at, updated_at";

#[async_trait]
impl RecipeRepository for PostgresRecipeRepository {
    async fn create(&self, recipe: Recipe) -> Result<Recipe, DomainError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO recipes (id, user_id, title, time_minutes, price, description, link, image, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(recipe.id)
        .bind(recipe.user_id)
        .bind(&recipe.title)
        .bind(recipe.time_minutes)
        .bind(recipe.price)
        .bind(&recipe.description)
        .bind(&recipe.link)
        .bind(&recipe.image)
        .bind(recipe.created_at)
        .bind(recipe.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!("failed to create recipe: {}", e);
            DomainError::from(e)
        })?;

        insert_links(&mut tx, recipe.id, AttrKind::Tag, recipe.tag_ids()).await?;
        insert_links(&mut tx, recipe.id, AttrKind::Ingredient, recipe.ingredient_ids()).await?;
        tx.commit().await?;

        info!(recipe_id = %recipe.id, user_id = %recipe.user_id, "recipe created");
        self.find_by_id(recipe.user_id, recipe.id)
            .await?
            .ok_or(DomainError::RecipeNotFound(recipe.id))
    }

    async fn find_by_id(&self, user_id: Uuid, id: Uuid) -> Result<Option<Recipe>, DomainError> {
        let sql = format!(
            "SELECT {} FROM recipes WHERE id = $1 AND user_id = $2",
            RECIPE_COLUMNS
        );
        let recipe = sqlx::query_as::<_, Recipe>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("db error find_by_id {}: {}", id, e);
                DomainError::from(e)
            })?;

        match recipe {
            Some(recipe) => Ok(self.load_links(vec![recipe]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list(&self, user_id: Uuid, filter: RecipeFilter) -> Result<Vec<Recipe>, DomainError> {
        let sql = format!(
            r#"
            SELECT {} FROM recipes r
            WHERE r.user_id = $1
              AND ($2::uuid[] IS NULL OR EXISTS (
                    SELECT 1 FROM recipe_tags rt
                    WHERE rt.recipe_id = r.id AND rt.tag_id = ANY($2)))
              AND ($3::uuid[] IS NULL OR EXISTS (
                    SELECT 1 FROM recipe_ingredients ri
                    WHERE ri.recipe_id = r.id AND ri.ingredient_id = ANY($3)))
            ORDER BY r.created_at DESC, r.id
            "#,
            RECIPE_COLUMNS
        );
        let recipes = sqlx::query_as::<_, Recipe>(&sql)
            .bind(user_id)
            .bind(filter.tags)
            .bind(filter.ingredients)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("db error while fetching recipes: {}", e);
                DomainError::from(e)
            })?;

        self.load_links(recipes).await
    }

    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        changes: RecipeChanges,
        tag_ids: Option<Vec<Uuid>>,
        ingredient_ids: Option<Vec<Uuid>>,
    ) -> Result<Option<Recipe>, DomainError> {
        let mut tx = self.pool.begin().await?;

        let updated: Option<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE recipes
            SET
                title = COALESCE($1, title),
                time_minutes = COALESCE($2, time_minutes),
                price = COALESCE($3, price),
                description = COALESCE($4, description),
                link = COALESCE($5, link),
                updated_at = $6
            WHERE id = $7 AND user_id = $8
            RETURNING id
            "#,
        )
        .bind(changes.title)
        .bind(changes.time_minutes)
        .bind(changes.price)
        .bind(changes.description)
        .bind(changes.link)
        .bind(Utc::now())
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            error!("failed to update recipe {}: {}", id, e);
            DomainError::from(e)
        })?;

        if updated.is_none() {
            return Ok(None);
        }

        if let Some(ids) = tag_ids {
            replace_links(&mut tx, id, AttrKind::Tag, ids).await?;
        }
        if let Some(ids) = ingredient_ids {
            replace_links(&mut tx, id, AttrKind::Ingredient, ids).await?;
        }
        tx.commit().await?;

        info!(recipe_id = %id, "recipe updated");
        self.find_by_id(user_id, id).await
    }

    async fn set_image(
        &self,
        user_id: Uuid,
        id: Uuid,
        image: String,
    ) -> Result<Option<Recipe>, DomainError> {
        let updated = sqlx::query(
            "UPDATE recipes SET image = $1, updated_at = $2 WHERE id = $3 AND user_id = $4",
        )
        .bind(&image)
        .bind(Utc::now())
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to set image on recipe {}: {}", id, e);
            DomainError::from(e)
        })?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }

        info!(recipe_id = %id, image = %image, "recipe image updated");
        self.find_by_id(user_id, id).await
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, DomainError> {
        let deleted = sqlx::query("DELETE FROM recipes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("failed to delete recipe {}: {}", id, e);
                DomainError::from(e)
            })?;

        let found = deleted.rows_affected() > 0;
        if found {
            info!(recipe_id = %id, "recipe deleted");
        }
        Ok(found)
    }
}
