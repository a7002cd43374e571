use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::ingredient::Ingredient;
use crate::domain::tag::Tag;

pub const IMAGE_UPLOAD_DIR: &str = "uploads/recipe";

/// Price column is NUMERIC(5, 2).
const PRICE_MAX_SCALE: u32 = 2;
const PRICE_MAX_DIGITS: u32 = 5;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Recipe {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub description: String,
    pub link: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub tags: Vec<Tag>,
    #[sqlx(skip)]
    pub ingredients: Vec<Ingredient>,
}

impl Recipe {
    pub fn new(user_id: Uuid, title: String, time_minutes: i32, price: Decimal) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            title,
            time_minutes,
            price,
            description: String::new(),
            link: String::new(),
            image: None,
            created_at: now,
            updated_at: now,
            tags: Vec::new(),
            ingredients: Vec::new(),
        }
    }

    pub fn tag_ids(&self) -> Vec<Uuid> {
        self.tags.iter().map(|t| t.id).collect()
    }

    pub fn ingredient_ids(&self) -> Vec<Uuid> {
        self.ingredients.iter().map(|i| i.id).collect()
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

/// Field changes for a recipe update; `None` keeps the stored value.
#[derive(Debug, Default, Clone)]
pub struct RecipeChanges {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub link: Option<String>,
}

/// Recipe list filter; a recipe matches when it references any listed id.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecipeFilter {
    pub tags: Option<Vec<Uuid>>,
    pub ingredients: Option<Vec<Uuid>>,
}

pub fn validate_price(price: Decimal) -> Result<Decimal, DomainError> {
    if price.is_sign_negative() {
        return Err(DomainError::Validation("price must not be negative".into()));
    }
    if price.scale() > PRICE_MAX_SCALE {
        return Err(DomainError::Validation(format!(
            "price must have at most {} decimal places",
            PRICE_MAX_SCALE
        )));
    }
    let limit = Decimal::from(10_i64.pow(PRICE_MAX_DIGITS - PRICE_MAX_SCALE));
    if price >= limit {
        return Err(DomainError::Validation(format!(
            "price must be less than {}",
            limit
        )));
    }
    let mut price = price;
    price.rescale(PRICE_MAX_SCALE);
    Ok(price)
}

pub fn validate_time_minutes(minutes: i32) -> Result<i32, DomainError> {
    if minutes < 0 {
        return Err(DomainError::Validation(
            "time_minutes must not be negative".into(),
        ));
    }
    Ok(minutes)
}

/// Storage path for a new recipe image, keeping the uploaded file's extension.
pub fn recipe_image_file_path(filename: &str) -> String {
    image_path_for(Uuid::new_v4(), filename)
}

pub fn image_path_for(id: Uuid, filename: &str) -> String {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();
    format!("{}/{}{}", IMAGE_UPLOAD_DIR, id, ext)
}
