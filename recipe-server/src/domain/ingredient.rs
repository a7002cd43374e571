use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use crate::domain::attr::{AttrKind, RecipeAttr};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ingredient {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub name: String,
}

impl RecipeAttr for Ingredient {
    const KIND: AttrKind = AttrKind::Ingredient;

    fn from_parts(id: Uuid, user_id: Uuid, name: String) -> Self {
        Self { id, user_id, name }
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn user_id(&self) -> Uuid {
        self.user_id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_as_name() {
        let ingredient = Ingredient::new(Uuid::new_v4(), "Test Ingredient".into());
        assert_eq!(ingredient.to_string(), ingredient.name);
    }
}
