use std::path::Path;
use std::sync::Arc;

use crate::application::attr_service::AttrService;
use crate::data::recipe_repository::RecipeRepository;
use crate::domain::attr::{RecipeAttr, validate_name};
use crate::domain::error::DomainError;
use crate::domain::ingredient::Ingredient;
use crate::domain::recipe::{
    Recipe, RecipeChanges, RecipeFilter, recipe_image_file_path, validate_price,
    validate_time_minutes,
};
use crate::domain::tag::Tag;
use crate::infrastructure::storage::MediaStorage;
use crate::presentation::dto::{PatchRecipeRequest, RecipeRequest, names};
use tracing::{instrument, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct RecipeService {
    repo: Arc<dyn RecipeRepository>,
    tags: AttrService<Tag>,
    ingredients: AttrService<Ingredient>,
    storage: MediaStorage,
    max_upload_bytes: usize,
}

impl RecipeService {
    pub fn new(
        repo: Arc<dyn RecipeRepository>,
        tags: AttrService<Tag>,
        ingredients: AttrService<Ingredient>,
        storage: MediaStorage,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            repo,
            tags,
            ingredients,
            storage,
            max_upload_bytes,
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    pub fn media_root(&self) -> &Path {
        self.storage.root()
    }

    pub async fn get_recipe(&self, user_id: Uuid, id: Uuid) -> Result<Recipe, DomainError> {
        self.repo
            .find_by_id(user_id, id)
            .await?
            .ok_or(DomainError::RecipeNotFound(id))
    }

    pub async fn list_recipes(
        &self,
        user_id: Uuid,
        filter: RecipeFilter,
    ) -> Result<Vec<Recipe>, DomainError> {
        self.repo.list(user_id, filter).await
    }

    #[instrument(skip(self, request), fields(title = %request.title))]
    pub async fn create_recipe(
        &self,
        user_id: Uuid,
        request: RecipeRequest,
    ) -> Result<Recipe, DomainError> {
        let mut recipe = Recipe::new(
            user_id,
            validate_name("title", &request.title)?,
            validate_time_minutes(request.time_minutes)?,
            validate_price(request.price)?,
        );
        recipe.description = request.description;
        recipe.link = request.link.trim().to_string();
        recipe.tags = self
            .tags
            .resolve_all(user_id, &names(request.tags).unwrap_or_default())
            .await?;
        recipe.ingredients = self
            .ingredients
            .resolve_all(user_id, &names(request.ingredients).unwrap_or_default())
            .await?;

        self.repo.create(recipe).await
    }

    /// PUT: every scalar field is replaced.
    #[instrument(skip(self, request))]
    pub async fn replace_recipe(
        &self,
        user_id: Uuid,
        id: Uuid,
        request: RecipeRequest,
    ) -> Result<Recipe, DomainError> {
        let patch = PatchRecipeRequest {
            title: Some(request.title),
            time_minutes: Some(request.time_minutes),
            price: Some(request.price),
            description: Some(request.description),
            link: Some(request.link),
            tags: request.tags,
            ingredients: request.ingredients,
        };
        self.update_recipe(user_id, id, patch).await
    }

    /// PATCH: absent fields keep their value; present tag or ingredient
    /// lists replace the current links.
    #[instrument(skip(self, request))]
    pub async fn update_recipe(
        &self,
        user_id: Uuid,
        id: Uuid,
        request: PatchRecipeRequest,
    ) -> Result<Recipe, DomainError> {
        let changes = RecipeChanges {
            title: request
                .title
                .as_deref()
                .map(|t| validate_name("title", t))
                .transpose()?,
            time_minutes: request.time_minutes.map(validate_time_minutes).transpose()?,
            price: request.price.map(validate_price).transpose()?,
            description: request.description,
            link: request.link.map(|l| l.trim().to_string()),
        };

        // unknown ids must not leave freshly created tags behind
        self.get_recipe(user_id, id).await?;

        let tag_ids = match names(request.tags) {
            Some(names) => Some(ids(&self.tags.resolve_all(user_id, &names).await?)),
            None => None,
        };
        let ingredient_ids = match names(request.ingredients) {
            Some(names) => Some(ids(&self.ingredients.resolve_all(user_id, &names).await?)),
            None => None,
        };

        self.repo
            .update(user_id, id, changes, tag_ids, ingredient_ids)
            .await?
            .ok_or(DomainError::RecipeNotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn delete_recipe(&self, user_id: Uuid, id: Uuid) -> Result<(), DomainError> {
        let recipe = self.get_recipe(user_id, id).await?;
        if !self.repo.delete(user_id, id).await? {
            return Err(DomainError::RecipeNotFound(id));
        }
        if let Some(image) = recipe.image {
            self.discard_file(&image).await;
        }
        Ok(())
    }

    /// Stores the image under a fresh path and points the recipe at it.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload_image(
        &self,
        user_id: Uuid,
        id: Uuid,
        filename: &str,
        bytes: &[u8],
    ) -> Result<Recipe, DomainError> {
        if bytes.is_empty() {
            return Err(DomainError::Validation("image must not be empty".into()));
        }
        if bytes.len() > self.max_upload_bytes {
            return Err(DomainError::Validation(format!(
                "image must be at most {} bytes",
                self.max_upload_bytes
            )));
        }
        let previous = self.get_recipe(user_id, id).await?.image;

        let path = recipe_image_file_path(filename);
        self.storage
            .save(&path, bytes)
            .await
            .map_err(|e| DomainError::Internal(format!("failed to store image: {}", e)))?;

        let Some(recipe) = self.repo.set_image(user_id, id, path.clone()).await? else {
            self.discard_file(&path).await;
            return Err(DomainError::RecipeNotFound(id));
        };

        if let Some(previous) = previous {
            self.discard_file(&previous).await;
        }
        Ok(recipe)
    }

    async fn discard_file(&self, path: &str) {
        if let Err(err) = self.storage.remove(path).await {
            warn!(path = %path, error = %err, "failed to remove media file");
        }
    }
}

fn ids<T: RecipeAttr>(items: &[T]) -> Vec<Uuid> {
    items.iter().map(|i| i.id()).collect()
}
