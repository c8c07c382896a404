use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::{invalid, require_non_blank, ModelError};
use crate::{business, user};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "business_comments")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub business_id: i32,
    pub user_id: i32,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub rating: Option<i32>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Business,
    User,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Business => Entity::belongs_to(business::Entity).from(Column::BusinessId).to(business::Column::Id).into(),
            Relation::User => Entity::belongs_to(user::Entity).from(Column::UserId).to(user::Column::Id).into(),
        }
    }
}

impl Related<business::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Business.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate(content: &str, rating: Option<i32>) -> Result<(), ModelError> {
    require_non_blank("content", content)?;
    if let Some(r) = rating {
        if !(1..=5).contains(&r) {
            return Err(invalid("rating", "must be between 1 and 5"));
        }
    }
    Ok(())
}
