//! In-memory repositories for tests. Mirrors the scoping, ordering and
//! cascade rules of the PostgreSQL implementations.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::data::attr_repository::AttrRepository;
use crate::data::recipe_repository::RecipeRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::attr::{AttrKind, RecipeAttr};
use crate::domain::error::DomainError;
use crate::domain::recipe::{Recipe, RecipeChanges, RecipeFilter};
use crate::domain::user::User;

struct StoredRecipe {
    recipe: Recipe,
    tag_ids: Vec<Uuid>,
    ingredient_ids: Vec<Uuid>,
}

impl StoredRecipe {
    fn links(&self, kind: AttrKind) -> &Vec<Uuid> {
        match kind {
            AttrKind::Tag => &self.tag_ids,
            AttrKind::Ingredient => &self.ingredient_ids,
        }
    }

    fn links_mut(&mut self, kind: AttrKind) -> &mut Vec<Uuid> {
        match kind {
            AttrKind::Tag => &mut self.tag_ids,
            AttrKind::Ingredient => &mut self.ingredient_ids,
        }
    }
}

#[derive(Default)]
struct State {
    users: Vec<User>,
    attrs: HashMap<AttrKind, Vec<(Uuid, Uuid, String)>>,
    recipes: Vec<StoredRecipe>,
}

impl State {
    fn attrs_of<T: RecipeAttr>(&self, ids: &[Uuid]) -> Vec<T> {
        let mut found: Vec<T> = self
            .attrs
            .get(&T::KIND)
            .map(|rows| {
                rows.iter()
                    .filter(|(id, _, _)| ids.contains(id))
                    .map(|(id, user_id, name)| T::from_parts(*id, *user_id, name.clone()))
                    .collect()
            })
            .unwrap_or_default();
        found.sort_by(|a, b| a.name().cmp(b.name()).then(a.id().cmp(&b.id())));
        found
    }

    fn assemble(&self, stored: &StoredRecipe) -> Recipe {
        let mut recipe = stored.recipe.clone();
        recipe.tags = self.attrs_of(&stored.tag_ids);
        recipe.ingredients = self.attrs_of(&stored.ingredient_ids);
        recipe
    }

    fn recipe(&self, user_id: Uuid, id: Uuid) -> Option<Recipe> {
        self.recipes
            .iter()
            .find(|s| s.recipe.id == id && s.recipe.user_id == user_id)
            .map(|s| self.assemble(s))
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: User) -> Result<User, DomainError> {
        let mut state = self.state.lock().unwrap();
        if state.users.iter().any(|u| u.email == user.email) {
            return Err(DomainError::UserAlreadyExists(user.email));
        }
        state.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let state = self.state.lock().unwrap();
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        let state = self.state.lock().unwrap();
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        name: Option<String>,
        password_hash: Option<String>,
    ) -> Result<Option<User>, DomainError> {
        let mut state = self.state.lock().unwrap();
        let Some(user) = state.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(name) = name {
            user.name = name;
        }
        if let Some(hash) = password_hash {
            user.password_hash = hash;
        }
        Ok(Some(user.clone()))
    }
}

#[async_trait]
impl<T: RecipeAttr> AttrRepository<T> for MemoryStore {
    async fn create(&self, attr: T) -> Result<T, DomainError> {
        let mut state = self.state.lock().unwrap();
        state.attrs.entry(T::KIND).or_default().push((
            attr.id(),
            attr.user_id(),
            attr.name().to_string(),
        ));
        Ok(attr)
    }

    async fn find_by_id(&self, user_id: Uuid, id: Uuid) -> Result<Option<T>, DomainError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .attrs_of::<T>(&[id])
            .into_iter()
            .find(|a| a.user_id() == user_id))
    }

    async fn find_by_name(&self, user_id: Uuid, name: &str) -> Result<Option<T>, DomainError> {
        let state = self.state.lock().unwrap();
        Ok(state.attrs.get(&T::KIND).and_then(|rows| {
            rows.iter()
                .find(|(_, owner, n)| *owner == user_id && n == name)
                .map(|(id, owner, n)| T::from_parts(*id, *owner, n.clone()))
        }))
    }

    async fn list(&self, user_id: Uuid, assigned_only: bool) -> Result<Vec<T>, DomainError> {
        let state = self.state.lock().unwrap();
        let ids: Vec<Uuid> = state
            .attrs
            .get(&T::KIND)
            .map(|rows| {
                rows.iter()
                    .filter(|(_, owner, _)| *owner == user_id)
                    .map(|(id, _, _)| *id)
                    .filter(|id| {
                        !assigned_only
                            || state.recipes.iter().any(|s| {
                                s.recipe.user_id == user_id && s.links(T::KIND).contains(id)
                            })
                    })
                    .collect()
            })
            .unwrap_or_default();

        let mut found = state.attrs_of::<T>(&ids);
        found.sort_by(|a, b| b.name().cmp(a.name()).then(a.id().cmp(&b.id())));
        Ok(found)
    }

    async fn rename(
        &self,
        user_id: Uuid,
        id: Uuid,
        name: String,
    ) -> Result<Option<T>, DomainError> {
        let mut state = self.state.lock().unwrap();
        let row = state
            .attrs
            .entry(T::KIND)
            .or_default()
            .iter_mut()
            .find(|(rid, owner, _)| *rid == id && *owner == user_id);
        Ok(row.map(|row| {
            row.2 = name;
            T::from_parts(row.0, row.1, row.2.clone())
        }))
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, DomainError> {
        let mut state = self.state.lock().unwrap();
        let rows = state.attrs.entry(T::KIND).or_default();
        let before = rows.len();
        rows.retain(|(rid, owner, _)| !(*rid == id && *owner == user_id));
        let found = rows.len() < before;
        if found {
            for stored in &mut state.recipes {
                stored.links_mut(T::KIND).retain(|linked| *linked != id);
            }
        }
        Ok(found)
    }
}

#[async_trait]
impl RecipeRepository for MemoryStore {
    async fn create(&self, recipe: Recipe) -> Result<Recipe, DomainError> {
        let mut state = self.state.lock().unwrap();
        let stored = StoredRecipe {
            tag_ids: recipe.tag_ids(),
            ingredient_ids: recipe.ingredient_ids(),
            recipe: Recipe {
                tags: Vec::new(),
                ingredients: Vec::new(),
                ..recipe
            },
        };
        let created = state.assemble(&stored);
        state.recipes.push(stored);
        Ok(created)
    }

    async fn find_by_id(&self, user_id: Uuid, id: Uuid) -> Result<Option<Recipe>, DomainError> {
        Ok(self.state.lock().unwrap().recipe(user_id, id))
    }

    async fn list(&self, user_id: Uuid, filter: RecipeFilter) -> Result<Vec<Recipe>, DomainError> {
        let state = self.state.lock().unwrap();
        let matches = |links: &Vec<Uuid>, wanted: &Option<Vec<Uuid>>| match wanted {
            Some(ids) => links.iter().any(|l| ids.contains(l)),
            None => true,
        };
        let mut recipes: Vec<Recipe> = state
            .recipes
            .iter()
            .rev()
            .filter(|s| s.recipe.user_id == user_id)
            .filter(|s| matches(&s.tag_ids, &filter.tags))
            .filter(|s| matches(&s.ingredient_ids, &filter.ingredients))
            .map(|s| state.assemble(s))
            .collect();
        recipes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(recipes)
    }

    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        changes: RecipeChanges,
        tag_ids: Option<Vec<Uuid>>,
        ingredient_ids: Option<Vec<Uuid>>,
    ) -> Result<Option<Recipe>, DomainError> {
        let mut state = self.state.lock().unwrap();
        let Some(stored) = state
            .recipes
            .iter_mut()
            .find(|s| s.recipe.id == id && s.recipe.user_id == user_id)
        else {
            return Ok(None);
        };
        let recipe = &mut stored.recipe;
        if let Some(title) = changes.title {
            recipe.title = title;
        }
        if let Some(minutes) = changes.time_minutes {
            recipe.time_minutes = minutes;
        }
        if let Some(price) = changes.price {
            recipe.price = price;
        }
        if let Some(description) = changes.description {
            recipe.description = description;
        }
        if let Some(link) = changes.link {
            recipe.link = link;
        }
        recipe.updated_at = Utc::now();
        if let Some(ids) = tag_ids {
            stored.tag_ids = ids;
        }
        if let Some(ids) = ingredient_ids {
            stored.ingredient_ids = ids;
        }
        Ok(state.recipe(user_id, id))
    }

    async fn set_image(
        &self,
        user_id: Uuid,
        id: Uuid,
        image: String,
    ) -> Result<Option<Recipe>, DomainError> {
        let mut state = self.state.lock().unwrap();
        let Some(stored) = state
            .recipes
            .iter_mut()
            .find(|s| s.recipe.id == id && s.recipe.user_id == user_id)
        else {
            return Ok(None);
        };
        stored.recipe.image = Some(image);
        Ok(state.recipe(user_id, id))
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, DomainError> {
        let mut state = self.state.lock().unwrap();
        let before = state.recipes.len();
        state
            .recipes
            .retain(|s| !(s.recipe.id == id && s.recipe.user_id == user_id));
        Ok(state.recipes.len() < before)
    }
}
