use std::marker::PhantomData;

use crate::domain::attr::RecipeAttr;
use crate::domain::error::DomainError;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

type AttrRow = (Uuid, Uuid, String);

/// Storage for one kind of recipe attribute. Every query is scoped to the
/// owning user.
#[async_trait]
pub trait AttrRepository<T: RecipeAttr>: Send + Sync {
    async fn create(&self, attr: T) -> Result<T, DomainError>;
    async fn find_by_id(&self, user_id: Uuid, id: Uuid) -> Result<Option<T>, DomainError>;
    async fn find_by_name(&self, user_id: Uuid, name: &str) -> Result<Option<T>, DomainError>;
    /// Ordered by name descending. With `assigned_only`, only items linked to
    /// at least one recipe, each once.
    async fn list(&self, user_id: Uuid, assigned_only: bool) -> Result<Vec<T>, DomainError>;
    async fn rename(&self, user_id: Uuid, id: Uuid, name: String)
    -> Result<Option<T>, DomainError>;
    /// Returns false when nothing matched.
    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, DomainError>;
}

pub struct PostgresAttrRepository<T> {
    pool: PgPool,
    _kind: PhantomData<fn() -> T>,
}

impl<T> Clone for PostgresAttrRepository<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _kind: PhantomData,
        }
    }
}

impl<T: RecipeAttr> PostgresAttrRepository<T> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _kind: PhantomData,
        }
    }

    fn table() -> &'static str {
        T::KIND.table()
    }

    fn into_attr((id, user_id, name): AttrRow) -> T {
        T::from_parts(id, user_id, name)
    }
}

#[async_trait]
impl<T: RecipeAttr> AttrRepository<T> for PostgresAttrRepository<T> {
    async fn create(&self, attr: T) -> Result<T, DomainError> {
        let sql = format!(
            "INSERT INTO {} (id, user_id, name) VALUES ($1, $2, $3)",
            Self::table()
        );
        sqlx::query(&sql)
            .bind(attr.id())
            .bind(attr.user_id())
            .bind(attr.name())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("failed to create {}: {}", T::KIND.label(), e);
                DomainError::from(e)
            })?;

        info!(kind = T::KIND.label(), id = %attr.id(), user_id = %attr.user_id(), "attribute created");
        Ok(attr)
    }

    async fn find_by_id(&self, user_id: Uuid, id: Uuid) -> Result<Option<T>, DomainError> {
        let sql = format!(
            "SELECT id, user_id, name FROM {} WHERE id = $1 AND user_id = $2",
            Self::table()
        );
        let row = sqlx::query_as::<_, AttrRow>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("db error find {} {}: {}", T::KIND.label(), id, e);
                DomainError::from(e)
            })?;
        Ok(row.map(Self::into_attr))
    }

    async fn find_by_name(&self, user_id: Uuid, name: &str) -> Result<Option<T>, DomainError> {
        let sql = format!(
            "SELECT id, user_id, name FROM {} WHERE user_id = $1 AND name = $2 ORDER BY id LIMIT 1",
            Self::table()
        );
        let row = sqlx::query_as::<_, AttrRow>(&sql)
            .bind(user_id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("db error find {} by name: {}", T::KIND.label(), e);
                DomainError::from(e)
            })?;
        Ok(row.map(Self::into_attr))
    }

    async fn list(&self, user_id: Uuid, assigned_only: bool) -> Result<Vec<T>, DomainError> {
        let kind = T::KIND;
        // EXISTS keeps each item once no matter how many recipes use it
        let assigned = if assigned_only {
            format!(
                "AND EXISTS (SELECT 1 FROM {link} l JOIN recipes r ON r.id = l.recipe_id \
                 WHERE l.{col} = a.id AND r.user_id = $1)",
                link = kind.link_table(),
                col = kind.link_column(),
            )
        } else {
            String::new()
        };
        let sql = format!(
            "SELECT a.id, a.user_id, a.name FROM {} a WHERE a.user_id = $1 {} ORDER BY a.name DESC, a.id",
            kind.table(),
            assigned
        );

        let rows = sqlx::query_as::<_, AttrRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("db error while listing {}: {}", kind.table(), e);
                DomainError::from(e)
            })?;
        Ok(rows.into_iter().map(Self::into_attr).collect())
    }

    async fn rename(
        &self,
        user_id: Uuid,
        id: Uuid,
        name: String,
    ) -> Result<Option<T>, DomainError> {
        let sql = format!(
            "UPDATE {} SET name = $1 WHERE id = $2 AND user_id = $3 RETURNING id, user_id, name",
            Self::table()
        );
        let row = sqlx::query_as::<_, AttrRow>(&sql)
            .bind(name)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("failed to update {} {}: {}", T::KIND.label(), id, e);
                DomainError::from(e)
            })?;

        if row.is_some() {
            info!(kind = T::KIND.label(), id = %id, "attribute updated");
        }
        Ok(row.map(Self::into_attr))
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, DomainError> {
        let sql = format!(
            "DELETE FROM {} WHERE id = $1 AND user_id = $2",
            Self::table()
        );
        let deleted = sqlx::query(&sql)
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("failed to delete {} {}: {}", T::KIND.label(), id, e);
                DomainError::from(e)
            })?;

        let found = deleted.rows_affected() > 0;
        if found {
            info!(kind = T::KIND.label(), id = %id, "attribute deleted");
        }
        Ok(found)
    }
}
