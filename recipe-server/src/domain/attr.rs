use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use crate::domain::error::DomainError;

/// The two kinds of per-user labels a recipe can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrKind {
    Tag,
    Ingredient,
}

impl AttrKind {
    pub fn table(self) -> &'static str {
        match self {
            AttrKind::Tag => "tags",
            AttrKind::Ingredient => "ingredients",
        }
    }

    /// Join table linking recipes to this kind.
    pub fn link_table(self) -> &'static str {
        match self {
            AttrKind::Tag => "recipe_tags",
            AttrKind::Ingredient => "recipe_ingredients",
        }
    }

    pub fn link_column(self) -> &'static str {
        match self {
            AttrKind::Tag => "tag_id",
            AttrKind::Ingredient => "ingredient_id",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AttrKind::Tag => "tag",
            AttrKind::Ingredient => "ingredient",
        }
    }

    pub fn not_found(self, id: Uuid) -> DomainError {
        match self {
            AttrKind::Tag => DomainError::TagNotFound(id),
            AttrKind::Ingredient => DomainError::IngredientNotFound(id),
        }
    }
}

/// A named, user-owned item attached to recipes (tags, ingredients).
pub trait RecipeAttr:
    fmt::Debug + Clone + Serialize + fmt::Display + Send + Sync + Unpin + 'static
{
    const KIND: AttrKind;

    fn from_parts(id: Uuid, user_id: Uuid, name: String) -> Self;
    fn id(&self) -> Uuid;
    fn user_id(&self) -> Uuid;
    fn name(&self) -> &str;

    fn new(user_id: Uuid, name: String) -> Self {
        Self::from_parts(Uuid::new_v4(), user_id, name)
    }
}

pub const MAX_NAME_LEN: usize = 255;

/// Trims and checks an attribute or recipe name.
pub fn validate_name(field: &str, value: &str) -> Result<String, DomainError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DomainError::Validation(format!("{} must not be blank", field)));
    }
    if value.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::Validation(format!(
            "{} must be at most {} characters",
            field, MAX_NAME_LEN
        )));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_name_trims() {
        assert_eq!(validate_name("name", "  Vegan ").unwrap(), "Vegan");
    }

    #[test]
    fn validate_name_rejects_blank_and_long() {
        assert!(matches!(
            validate_name("name", "   "),
            Err(DomainError::Validation(_))
        ));
        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert!(matches!(
            validate_name("name", &long),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn kinds_map_to_distinct_tables() {
        assert_eq!(AttrKind::Tag.table(), "tags");
        assert_eq!(AttrKind::Ingredient.link_table(), "recipe_ingredients");
        assert!(matches!(
            AttrKind::Ingredient.not_found(Uuid::nil()),
            DomainError::IngredientNotFound(_)
        ));
    }
}
