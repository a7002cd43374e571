use crate::domain::error::DomainError;
use crate::domain::ingredient::Ingredient;
use crate::domain::recipe::{Recipe, RecipeFilter};
use crate::domain::tag::Tag;
use crate::domain::user::User;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ======================= USERS =======================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMeRequest {
    pub name: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub email: String,
    pub name: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            email: user.email,
            name: user.name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub expires_in: i64,
    #[serde(rename = "token_type")]
    pub token_type: String, // "Bearer"
}

// ======================= TAGS / INGREDIENTS =======================

#[derive(Debug, Deserialize)]
pub struct AttrRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct PatchAttrRequest {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AttrListQuery {
    pub assigned_only: Option<String>,
}

impl AttrListQuery {
    pub fn assigned_only(&self) -> Result<bool, DomainError> {
        parse_flag("assigned_only", self.assigned_only.as_deref())
    }
}

// ======================= RECIPES =======================

/// Body of create (POST) and full update (PUT).
#[derive(Debug, Deserialize)]
pub struct RecipeRequest {
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub link: String,
    pub tags: Option<Vec<AttrRequest>>,
    pub ingredients: Option<Vec<AttrRequest>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PatchRecipeRequest {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub tags: Option<Vec<AttrRequest>>,
    pub ingredients: Option<Vec<AttrRequest>>,
}

#[derive(Debug, Deserialize)]
pub struct RecipeListQuery {
    pub tags: Option<String>,
    pub ingredients: Option<String>,
}

impl RecipeListQuery {
    pub fn filter(&self) -> Result<RecipeFilter, DomainError> {
        Ok(RecipeFilter {
            tags: parse_ids("tags", self.tags.as_deref())?,
            ingredients: parse_ids("ingredients", self.ingredients.as_deref())?,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct RecipeResponse {
    pub id: Uuid,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: String,
    pub tags: Vec<Tag>,
    pub ingredients: Vec<Ingredient>,
}

impl From<Recipe> for RecipeResponse {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.id,
            title: recipe.title,
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            link: recipe.link,
            tags: recipe.tags,
            ingredients: recipe.ingredients,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecipeDetailResponse {
    #[serde(flatten)]
    pub summary: RecipeResponse,
    pub description: String,
    pub image: Option<String>,
}

impl From<Recipe> for RecipeDetailResponse {
    fn from(mut recipe: Recipe) -> Self {
        let description = std::mem::take(&mut recipe.description);
        let image = recipe.image.take();
        Self {
            summary: RecipeResponse::from(recipe),
            description,
            image,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecipeImageResponse {
    pub id: Uuid,
    pub image: Option<String>,
}

// ======================= Utils =======================

pub fn names(items: Option<Vec<AttrRequest>>) -> Option<Vec<String>> {
    items.map(|items| items.into_iter().map(|i| i.name).collect())
}

/// Accepts `1`/`0`/`true`/`false`; absent or empty means false.
fn parse_flag(field: &str, raw: Option<&str>) -> Result<bool, DomainError> {
    match raw.map(str::trim) {
        None | Some("") | Some("0") => Ok(false),
        Some("1") => Ok(true),
        Some(other) if other.eq_ignore_ascii_case("true") => Ok(true),
        Some(other) if other.eq_ignore_ascii_case("false") => Ok(false),
        Some(other) => Err(DomainError::Validation(format!(
            "{} must be 0 or 1, got {:?}",
            field, other
        ))),
    }
}

/// Comma separated ids; absent or empty means no filter.
fn parse_ids(field: &str, raw: Option<&str>) -> Result<Option<Vec<Uuid>>, DomainError> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(None);
    };
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            Uuid::parse_str(s)
                .map_err(|_| DomainError::Validation(format!("{} contains invalid id {:?}", field, s)))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn flag_parsing() {
        assert!(!parse_flag("f", None).unwrap());
        assert!(!parse_flag("f", Some("0")).unwrap());
        assert!(parse_flag("f", Some("1")).unwrap());
        assert!(parse_flag("f", Some("True")).unwrap());
        assert!(!parse_flag("f", Some("false")).unwrap());
        assert!(parse_flag("f", Some("yes please")).is_err());
    }

    #[test]
    fn id_list_parsing() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(parse_ids("tags", None).unwrap(), None);
        assert_eq!(parse_ids("tags", Some("")).unwrap(), None);
        assert_eq!(
            parse_ids("tags", Some(&format!("{}, {}", a, b))).unwrap(),
            Some(vec![a, b])
        );
        assert!(parse_ids("tags", Some("1,2")).is_err());
    }

    #[test]
    fn detail_response_flattens_summary() {
        let mut recipe = Recipe::new(
            Uuid::new_v4(),
            "Pancakes".into(),
            5,
            Decimal::from_str("5.00").unwrap(),
        );
        recipe.description = "Fluffy".into();
        let json = serde_json::to_value(RecipeDetailResponse::from(recipe)).unwrap();

        assert_eq!(json["title"], "Pancakes");
        assert_eq!(json["price"], "5.00");
        assert_eq!(json["description"], "Fluffy");
        assert!(json["image"].is_null());
        assert!(json["tags"].as_array().unwrap().is_empty());
    }

    #[test]
    fn recipe_request_defaults_optional_fields() {
        let req: RecipeRequest = serde_json::from_value(serde_json::json!({
            "title": "Porridge",
            "time_minutes": 30,
            "price": "2.00",
        }))
        .unwrap();
        assert_eq!(req.description, "");
        assert!(req.tags.is_none());
        assert_eq!(req.price, Decimal::from_str("2.00").unwrap());
    }
}
