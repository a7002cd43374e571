use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::data::attr_repository::AttrRepository;
use crate::domain::attr::{RecipeAttr, validate_name};
use crate::domain::error::DomainError;

/// Business rules shared by tags and ingredients.
pub struct AttrService<T: RecipeAttr> {
    repo: Arc<dyn AttrRepository<T>>,
}

impl<T: RecipeAttr> Clone for AttrService<T> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
        }
    }
}

impl<T: RecipeAttr> AttrService<T> {
    pub fn new(repo: Arc<dyn AttrRepository<T>>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, user_id: Uuid, assigned_only: bool) -> Result<Vec<T>, DomainError> {
        self.repo.list(user_id, assigned_only).await
    }

    pub async fn get(&self, user_id: Uuid, id: Uuid) -> Result<T, DomainError> {
        self.repo
            .find_by_id(user_id, id)
            .await?
            .ok_or_else(|| T::KIND.not_found(id))
    }

    #[instrument(skip(self), fields(kind = T::KIND.label()))]
    pub async fn create(&self, user_id: Uuid, name: &str) -> Result<T, DomainError> {
        let name = validate_name("name", name)?;
        self.repo.create(T::new(user_id, name)).await
    }

    #[instrument(skip(self), fields(kind = T::KIND.label()))]
    pub async fn rename(&self, user_id: Uuid, id: Uuid, name: &str) -> Result<T, DomainError> {
        let name = validate_name("name", name)?;
        self.repo
            .rename(user_id, id, name)
            .await?
            .ok_or_else(|| T::KIND.not_found(id))
    }

    #[instrument(skip(self), fields(kind = T::KIND.label()))]
    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), DomainError> {
        if self.repo.delete(user_id, id).await? {
            Ok(())
        } else {
            Err(T::KIND.not_found(id))
        }
    }

    /// Returns the user's item with this name, creating it when missing.
    pub async fn get_or_create(&self, user_id: Uuid, name: &str) -> Result<T, DomainError> {
        let name = validate_name("name", name)?;
        match self.repo.find_by_name(user_id, &name).await? {
            Some(existing) => Ok(existing),
            None => self.repo.create(T::new(user_id, name)).await,
        }
    }

    /// Resolves names to items, dropping repeats.
    pub async fn resolve_all(&self, user_id: Uuid, names: &[String]) -> Result<Vec<T>, DomainError> {
        let mut resolved: Vec<T> = Vec::with_capacity(names.len());
        for name in names {
            let attr = self.get_or_create(user_id, name).await?;
            if !resolved.iter().any(|r| r.id() == attr.id()) {
                resolved.push(attr);
            }
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::MemoryStore;
    use crate::domain::ingredient::Ingredient;
    use crate::domain::tag::Tag;

    fn tags(store: &Arc<MemoryStore>) -> AttrService<Tag> {
        AttrService::new(store.clone())
    }

    #[tokio::test]
    async fn list_is_scoped_and_ordered_by_name_desc() {
        let store = Arc::new(MemoryStore::new());
        let service = tags(&store);
        let user = Uuid::new_v4();
        let other = Uuid::new_v4();

        service.create(user, "Vegan").await.unwrap();
        service.create(user, "Dessert").await.unwrap();
        service.create(other, "Fruity").await.unwrap();

        let names: Vec<String> = service
            .list(user, false)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["Vegan", "Dessert"]);
    }

    #[tokio::test]
    async fn rename_and_delete_respect_owner() {
        let store = Arc::new(MemoryStore::new());
        let service = tags(&store);
        let user = Uuid::new_v4();
        let tag = service.create(user, "After dinner").await.unwrap();

        let renamed = service.rename(user, tag.id, "Dessert").await.unwrap();
        assert_eq!(renamed.name, "Dessert");

        assert!(matches!(
            service.delete(Uuid::new_v4(), tag.id).await,
            Err(DomainError::TagNotFound(_))
        ));
        service.delete(user, tag.id).await.unwrap();
        assert!(service.list(user, false).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_or_create_reuses_existing() {
        let store = Arc::new(MemoryStore::new());
        let service: AttrService<Ingredient> = AttrService::new(store.clone());
        let user = Uuid::new_v4();

        let first = service.get_or_create(user, "Salt").await.unwrap();
        let second = service.get_or_create(user, " Salt ").await.unwrap();
        assert_eq!(first.id, second.id);

        let resolved = service
            .resolve_all(user, &["Salt".into(), "Pepper".into(), "Salt".into()])
            .await
            .unwrap();
        assert_eq!(resolved.len(), 2);
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let result = tags(&store).create(Uuid::new_v4(), "  ").await;
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }
}
