use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

mod error;
mod http_client;

pub use error::RecipeClientError;
pub use http_client::RecipeClientHttp;

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Recipe {
    pub id: Uuid,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: String,
    pub tags: Vec<Attr>,
    pub ingredients: Vec<Attr>,
    /// Only present on detail responses.
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Fields for creating or patching a recipe. `None` leaves a field out of the
/// request body.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecipeDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_minutes: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "named")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "named")]
    pub ingredients: Option<Vec<String>>,
}

/// Serializes `["a", "b"]` as `[{"name": "a"}, {"name": "b"}]`.
fn named<S: serde::Serializer>(
    names: &Option<Vec<String>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    #[derive(Serialize)]
    struct Named<'a> {
        name: &'a str,
    }

    let items: Vec<Named<'_>> = names
        .iter()
        .flatten()
        .map(|name| Named { name })
        .collect();
    items.serialize(serializer)
}

/// Which attribute collection a call targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrKind {
    Tags,
    Ingredients,
}

impl AttrKind {
    fn path(self) -> &'static str {
        match self {
            AttrKind::Tags => "tags",
            AttrKind::Ingredients => "ingredients",
        }
    }
}

/// A tag or ingredient; both share one wire shape.
#[derive(Debug, Clone, Deserialize)]
pub struct Attr {
    pub id: Uuid,
    pub name: String,
}

#[async_trait(?Send)]
pub trait RecipeClientTrait {
    async fn register(
        &mut self,
        email: String,
        password: String,
        name: String,
    ) -> Result<User, RecipeClientError>;
    async fn login(&mut self, email: String, password: String) -> Result<(), RecipeClientError>;
    async fn me(&mut self) -> Result<User, RecipeClientError>;
    async fn update_me(
        &mut self,
        name: Option<String>,
        password: Option<String>,
    ) -> Result<User, RecipeClientError>;

    async fn list_attrs(
        &mut self,
        kind: AttrKind,
        assigned_only: bool,
    ) -> Result<Vec<Attr>, RecipeClientError>;
    async fn create_attr(&mut self, kind: AttrKind, name: String) -> Result<Attr, RecipeClientError>;
    async fn rename_attr(
        &mut self,
        kind: AttrKind,
        id: Uuid,
        name: String,
    ) -> Result<Attr, RecipeClientError>;
    async fn delete_attr(&mut self, kind: AttrKind, id: Uuid) -> Result<(), RecipeClientError>;

    async fn list_recipes(
        &mut self,
        tags: Vec<Uuid>,
        ingredients: Vec<Uuid>,
    ) -> Result<Vec<Recipe>, RecipeClientError>;
    async fn get_recipe(&mut self, id: Uuid) -> Result<Recipe, RecipeClientError>;
    async fn create_recipe(&mut self, draft: RecipeDraft) -> Result<Recipe, RecipeClientError>;
    async fn update_recipe(
        &mut self,
        id: Uuid,
        draft: RecipeDraft,
    ) -> Result<Recipe, RecipeClientError>;
    async fn delete_recipe(&mut self, id: Uuid) -> Result<(), RecipeClientError>;
    async fn upload_image(
        &mut self,
        id: Uuid,
        path: &std::path::Path,
    ) -> Result<Option<String>, RecipeClientError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn draft_serializes_only_set_fields() {
        let draft = RecipeDraft {
            title: Some("Soup".into()),
            price: Some(Decimal::from_str("3.25").unwrap()),
            tags: Some(vec!["Dinner".into(), "Warm".into()]),
            ..Default::default()
        };
        let json = serde_json::to_value(&draft).unwrap();

        assert_eq!(json["title"], "Soup");
        assert_eq!(json["price"], "3.25");
        assert_eq!(json["tags"][1]["name"], "Warm");
        assert!(json.get("ingredients").is_none());
        assert!(json.get("time_minutes").is_none());
    }

    #[test]
    fn empty_tag_list_is_sent() {
        let draft = RecipeDraft {
            tags: Some(Vec::new()),
            ..Default::default()
        };
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["tags"], serde_json::json!([]));
    }

    #[test]
    fn summary_recipe_has_no_description() {
        let recipe: Recipe = serde_json::from_value(serde_json::json!({
            "id": Uuid::new_v4(),
            "title": "Toast",
            "time_minutes": 2,
            "price": "0.50",
            "link": "",
            "tags": [],
            "ingredients": [],
        }))
        .unwrap();
        assert!(recipe.description.is_none());
        assert_eq!(recipe.price, Decimal::from_str("0.50").unwrap());
    }
}
