use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use crate::domain::attr::{AttrKind, RecipeAttr};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub name: String,
}

impl RecipeAttr for Tag {
    const KIND: AttrKind = AttrKind::Tag;

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

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
